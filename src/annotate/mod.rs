//! Render detection outlines over a copy of the source image and save it.
//!
//! One parameterized annotator serves every call site; the differences
//! between faces, words, lines and people live in [`OutputKind::style`].

pub mod draw;
pub mod label;

use std::path::PathBuf;

use image::{DynamicImage, Rgb, RgbImage};
use tracing::info;

use crate::error::{VisionError, VisionResult};
use crate::models::{Annotation, Point, Region};

pub use label::LabelFont;

pub const DEFAULT_RESULTS_DIR: &str = "img/results";

pub const LIGHT_GREEN: Rgb<u8> = Rgb([144, 238, 144]);
pub const CYAN: Rgb<u8> = Rgb([0, 255, 255]);

/// People at or below this confidence are never drawn.
pub const PEOPLE_CONFIDENCE_THRESHOLD: f32 = 0.2;

/// Output canvas sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Canvas {
    /// Same pixel dimensions as the source image.
    Source,
    /// Fixed size; the annotated image is fitted inside, aspect preserved,
    /// on a white background.
    Fixed { width: u32, height: u32 },
}

#[derive(Debug, Clone)]
pub struct Style {
    pub color: Rgb<u8>,
    pub stroke_width: u32,
    pub draw_labels: bool,
    pub min_confidence: Option<f32>,
    pub canvas: Canvas,
}

impl Style {
    pub fn outline(color: Rgb<u8>, stroke_width: u32) -> Self {
        Self {
            color,
            stroke_width,
            draw_labels: false,
            min_confidence: None,
            canvas: Canvas::Source,
        }
    }

    pub fn with_labels(mut self) -> Self {
        self.draw_labels = true;
        self
    }

    pub fn with_min_confidence(mut self, threshold: f32) -> Self {
        self.min_confidence = Some(threshold);
        self
    }

    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }
}

/// The four places an annotated image is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Faces,
    Words,
    Lines,
    People,
}

impl OutputKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputKind::Faces => "detected_faces.jpg",
            OutputKind::Words => "words.jpg",
            OutputKind::Lines => "lines.jpg",
            OutputKind::People => "people.jpg",
        }
    }

    pub fn style(&self) -> Style {
        match self {
            // 8x6 figure at 100 dpi
            OutputKind::Faces => Style::outline(LIGHT_GREEN, 5)
                .with_labels()
                .with_canvas(Canvas::Fixed {
                    width: 800,
                    height: 600,
                }),
            OutputKind::Words | OutputKind::Lines => Style::outline(CYAN, 3),
            OutputKind::People => {
                Style::outline(CYAN, 3).with_min_confidence(PEOPLE_CONFIDENCE_THRESHOLD)
            }
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OutputKind::Faces => "faces",
            OutputKind::Words => "individual words",
            OutputKind::Lines => "lines of text",
            OutputKind::People => "people",
        }
    }
}

/// Whether the confidence filter lets this annotation through.
pub fn is_drawn(annotation: &Annotation, style: &Style) -> bool {
    match (style.min_confidence, annotation.confidence) {
        (Some(threshold), Some(confidence)) => confidence > threshold,
        _ => true,
    }
}

/// Where the source-resolution image landed on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Placement {
    pub const IDENTITY: Placement = Placement {
        scale: 1.0,
        offset_x: 0,
        offset_y: 0,
    };

    /// Map a source-space point onto the output canvas.
    pub fn map(&self, point: Point) -> Point {
        Point::new(
            (point.x as f32 * self.scale).round() as i32 + self.offset_x,
            (point.y as f32 * self.scale).round() as i32 + self.offset_y,
        )
    }
}

/// Draw every passing annotation onto a copy of `image`.
///
/// Outlines are drawn in source pixel space before the copy is fitted to
/// the style's canvas. Labels are drawn afterwards on the output canvas, so
/// their pixel size does not depend on the source resolution.
pub fn render(
    image: &DynamicImage,
    annotations: &[Annotation],
    style: &Style,
    font: &LabelFont,
) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let drawn: Vec<&Annotation> = annotations.iter().filter(|a| is_drawn(a, style)).collect();

    for annotation in &drawn {
        match &annotation.region {
            Region::Rect(rect) => {
                draw::draw_rect_outline(&mut canvas, rect, style.color, style.stroke_width)
            }
            Region::Polygon(points) => {
                draw::draw_polygon_outline(&mut canvas, points, style.color, style.stroke_width)
            }
        }
    }

    let (mut canvas, placement) = match style.canvas {
        Canvas::Source => (canvas, Placement::IDENTITY),
        Canvas::Fixed { width, height } => fit_to_canvas(&canvas, width, height),
    };

    if style.draw_labels {
        for annotation in &drawn {
            let Region::Rect(rect) = &annotation.region else {
                continue;
            };
            if let Some(text) = annotation.label.as_deref() {
                let anchor = placement.map(rect.corners().0);
                font.draw_label(&mut canvas, anchor, text, style.color);
            }
        }
    }

    canvas
}

/// Scale `img` to fit inside `width` x `height`, centred on white.
fn fit_to_canvas(img: &RgbImage, width: u32, height: u32) -> (RgbImage, Placement) {
    let (src_w, src_h) = img.dimensions();
    let mut out = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    if src_w == 0 || src_h == 0 || width == 0 || height == 0 {
        return (out, Placement::IDENTITY);
    }

    let scale = (width as f32 / src_w as f32).min(height as f32 / src_h as f32);
    let scaled_w = ((src_w as f32 * scale) as u32).clamp(1, width);
    let scaled_h = ((src_h as f32 * scale) as u32).clamp(1, height);
    let scaled = image::imageops::resize(
        img,
        scaled_w,
        scaled_h,
        image::imageops::FilterType::CatmullRom,
    );

    let offset_x = (width - scaled_w) / 2;
    let offset_y = (height - scaled_h) / 2;
    image::imageops::overlay(&mut out, &scaled, offset_x.into(), offset_y.into());
    let placement = Placement {
        scale,
        offset_x: offset_x as i32,
        offset_y: offset_y as i32,
    };
    (out, placement)
}

/// Writes annotated copies of images into the results directory.
pub struct Annotator {
    results_dir: PathBuf,
    font: LabelFont,
}

impl Annotator {
    /// Annotator labelling with the bundled font.
    pub fn new(results_dir: impl Into<PathBuf>) -> VisionResult<Self> {
        Ok(Self {
            results_dir: results_dir.into(),
            font: LabelFont::bundled()?,
        })
    }

    /// Like [`Annotator::new`], honouring the `AZVISION_LABEL_FONT` override.
    pub fn from_env(results_dir: impl Into<PathBuf>) -> VisionResult<Self> {
        let annotator = Self::new(results_dir)?;
        Ok(match LabelFont::from_env()? {
            Some(font) => annotator.with_font(font),
            None => annotator,
        })
    }

    pub fn with_font(mut self, font: LabelFont) -> Self {
        self.font = font;
        self
    }

    /// Render with the preset style of `kind` and save under its fixed file name.
    pub fn annotate(
        &self,
        image: &DynamicImage,
        annotations: &[Annotation],
        kind: OutputKind,
    ) -> VisionResult<PathBuf> {
        println!("\nAnnotating {} in image...", kind.description());
        let path = self.annotate_with(image, annotations, &kind.style(), kind.file_name())?;
        println!("  Results saved in {}", path.display());
        Ok(path)
    }

    /// Render with an explicit style. An existing file of the same name is overwritten.
    pub fn annotate_with(
        &self,
        image: &DynamicImage,
        annotations: &[Annotation],
        style: &Style,
        file_name: &str,
    ) -> VisionResult<PathBuf> {
        let rendered = render(image, annotations, style, &self.font);

        std::fs::create_dir_all(&self.results_dir)?;
        let path = self.results_dir.join(file_name);
        rendered
            .save_with_format(&path, image::ImageFormat::Jpeg)
            .map_err(|source| VisionError::Render {
                path: path.clone(),
                source,
            })?;

        let drawn = annotations.iter().filter(|a| is_drawn(a, style)).count();
        info!(
            path = %path.display(),
            drawn,
            skipped = annotations.len() - drawn,
            "Saved annotated image"
        );
        Ok(path)
    }
}
