//! One function per subcommand: read input, call the service, print, annotate.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{DynamicImage, ImageReader};
use tracing::info;

use crate::annotate::{Annotator, OutputKind};
use crate::error::{VisionError, VisionResult};
use crate::report;
use crate::service::face::face_annotations;
use crate::service::{
    AnalysisClient, AnalysisResult, DetectedFace, FaceClient, TrainingSession, VisualFeature,
};

/// Raw bytes for upload plus the decoded pixels for drawing.
pub struct InputImage {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub image: DynamicImage,
}

impl InputImage {
    pub fn load(path: &Path) -> VisionResult<Self> {
        if !path.exists() {
            return Err(VisionError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let decode_err = |source| VisionError::Decode {
            path: path.to_path_buf(),
            source,
        };
        let image = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()?
            .decode()
            .map_err(decode_err)?;

        info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Loaded input image"
        );
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            image,
        })
    }
}

pub async fn detect_faces(
    client: &FaceClient,
    input: &InputImage,
    annotator: &Annotator,
) -> VisionResult<Vec<DetectedFace>> {
    println!("\nAnalyzing {} ...\n", input.path.display());
    let faces = client.detect(input.bytes.clone()).await?;

    print!("{}", report::faces(&faces));
    if !faces.is_empty() {
        annotator.annotate(&input.image, &face_annotations(&faces), OutputKind::Faces)?;
    }
    Ok(faces)
}

pub async fn analyze_image(
    client: &AnalysisClient,
    input: &InputImage,
    annotator: &Annotator,
) -> VisionResult<AnalysisResult> {
    println!("\nAnalyzing {} ...\n", input.path.display());
    let result = client
        .analyze(input.bytes.clone(), &VisualFeature::ALL)
        .await?;

    print!("{}", report::captions(&result));

    if let Some(read) = &result.read_result {
        print!("{}", report::text_lines(read));
        annotator.annotate(&input.image, &read.line_annotations(), OutputKind::Lines)?;

        print!("{}", report::words(read));
        annotator.annotate(&input.image, &read.word_annotations(), OutputKind::Words)?;
    }

    print!("{}", report::tags_and_objects(&result));

    let people = result.people_annotations();
    if !people.is_empty() {
        print!("{}", report::people(&result));
        annotator.annotate(&input.image, &people, OutputKind::People)?;
    }

    Ok(result)
}

/// Upload tagged training images and, when `train` is set, train and wait
/// for the iteration with that poll interval.
pub async fn upload_training_images(
    session: &TrainingSession,
    folder: &Path,
    train: Option<Duration>,
) -> VisionResult<usize> {
    let uploaded = session.upload_images(folder).await?;
    info!(uploaded, project = %session.project.name, "Uploaded training images");

    if let Some(poll_interval) = train {
        session.train_model(poll_interval).await?;
    }
    Ok(uploaded)
}
