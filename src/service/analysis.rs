//! Image analysis client: captions, OCR, tags, objects and people.

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::VisionResult;
use crate::models::{Annotation, Point, Rect, Region};
use crate::service::SUBSCRIPTION_KEY_HEADER;
use crate::service::http::{self, OCTET_STREAM};

pub const API_VERSION: &str = "2024-02-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualFeature {
    Caption,
    DenseCaptions,
    Read,
    Tags,
    Objects,
    People,
}

impl VisualFeature {
    pub const ALL: [VisualFeature; 6] = [
        VisualFeature::Caption,
        VisualFeature::DenseCaptions,
        VisualFeature::Read,
        VisualFeature::Tags,
        VisualFeature::Objects,
        VisualFeature::People,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisualFeature::Caption => "caption",
            VisualFeature::DenseCaptions => "denseCaptions",
            VisualFeature::Read => "read",
            VisualFeature::Tags => "tags",
            VisualFeature::Objects => "objects",
            VisualFeature::People => "people",
        }
    }
}

/// Bounding box as returned by the service (`w`/`h` rather than width/height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl From<BoundingBox> for Rect {
    fn from(b: BoundingBox) -> Self {
        Rect::new(b.x, b.y, b.w, b.h)
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{'x': {}, 'y': {}, 'w': {}, 'h': {}}}", self.x, self.y, self.w, self.h)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenseCaption {
    pub text: String,
    pub confidence: f32,
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueList<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub text: String,
    #[serde(default)]
    pub bounding_polygon: Vec<Point>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub text: String,
    #[serde(default)]
    pub bounding_polygon: Vec<Point>,
    #[serde(default)]
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResult {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl ReadResult {
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.lines().flat_map(|l| l.words.iter())
    }

    pub fn line_annotations(&self) -> Vec<Annotation> {
        self.lines()
            .filter_map(|l| polygon_annotation(&l.text, &l.bounding_polygon))
            .collect()
    }

    pub fn word_annotations(&self) -> Vec<Annotation> {
        self.words()
            .filter_map(|w| polygon_annotation(&w.text, &w.bounding_polygon))
            .collect()
    }
}

fn polygon_annotation(text: &str, polygon: &[Point]) -> Option<Annotation> {
    match Region::polygon(polygon) {
        Some(region) => Some(Annotation::new(region)),
        None => {
            warn!(
                "Skipping '{}': expected 4 polygon points, got {}",
                text,
                polygon.len()
            );
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedObject {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedPerson {
    pub bounding_box: BoundingBox,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub model_version: Option<String>,
    pub metadata: Option<ImageMetadata>,
    pub caption_result: Option<Caption>,
    pub dense_captions_result: Option<ValueList<DenseCaption>>,
    pub read_result: Option<ReadResult>,
    pub tags_result: Option<ValueList<Tag>>,
    pub objects_result: Option<ValueList<DetectedObject>>,
    pub people_result: Option<ValueList<DetectedPerson>>,
}

impl AnalysisResult {
    /// People as rectangles carrying their confidence, for threshold filtering.
    pub fn people_annotations(&self) -> Vec<Annotation> {
        self.people_result
            .iter()
            .flat_map(|p| p.values.iter())
            .map(|p| Annotation::new(Region::Rect(p.bounding_box.into())).with_confidence(p.confidence))
            .collect()
    }
}

pub struct AnalysisClient {
    http: Client,
    config: ServiceConfig,
}

impl AnalysisClient {
    pub fn new(config: ServiceConfig) -> VisionResult<Self> {
        let http = http::build_client(config.timeout)?;
        Ok(Self { http, config })
    }

    pub async fn analyze(
        &self,
        image: Vec<u8>,
        features: &[VisualFeature],
    ) -> VisionResult<AnalysisResult> {
        let url = format!(
            "{}/computervision/imageanalysis:analyze",
            self.config.endpoint
        );
        let features = features
            .iter()
            .map(VisualFeature::as_str)
            .collect::<Vec<_>>()
            .join(",");
        debug!("Analyzing {} bytes for [{}]", image.len(), features);

        let request = self
            .http
            .post(&url)
            .query(&[("api-version", API_VERSION), ("features", features.as_str())])
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.key)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(image);

        http::send_json(request).await
    }
}
