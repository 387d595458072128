//! Face detection client.

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::VisionResult;
use crate::models::{Annotation, Rect, Region};
use crate::service::http::{self, OCTET_STREAM};
use crate::service::SUBSCRIPTION_KEY_HEADER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRectangle {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl From<FaceRectangle> for Rect {
    fn from(r: FaceRectangle) -> Self {
        Rect::new(r.left, r.top, r.width, r.height)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeadPose {
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occlusion {
    pub forehead_occluded: bool,
    pub eye_occluded: bool,
    pub mouth_occluded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accessory {
    #[serde(rename = "type")]
    pub kind: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAttributes {
    pub head_pose: Option<HeadPose>,
    pub occlusion: Option<Occlusion>,
    #[serde(default)]
    pub accessories: Vec<Accessory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFace {
    pub face_rectangle: FaceRectangle,
    pub face_attributes: Option<FaceAttributes>,
}

/// Rectangles labelled "Face number N" in detection order, starting at 1.
pub fn face_annotations(faces: &[DetectedFace]) -> Vec<Annotation> {
    faces
        .iter()
        .enumerate()
        .map(|(i, face)| {
            Annotation::new(Region::Rect(face.face_rectangle.into()))
                .with_label(format!("Face number {}", i + 1))
        })
        .collect()
}

pub struct FaceClient {
    http: Client,
    config: ServiceConfig,
}

impl FaceClient {
    pub fn new(config: ServiceConfig) -> VisionResult<Self> {
        let http = http::build_client(config.timeout)?;
        Ok(Self { http, config })
    }

    /// Detect faces with head pose, occlusion and accessory attributes.
    pub async fn detect(&self, image: Vec<u8>) -> VisionResult<Vec<DetectedFace>> {
        let url = format!("{}/face/v1.0/detect", self.config.endpoint);
        debug!("Sending {} bytes to {}", image.len(), url);

        let request = self
            .http
            .post(&url)
            .query(&[
                ("detectionModel", "detection_01"),
                ("recognitionModel", "recognition_01"),
                ("returnFaceId", "false"),
                ("returnFaceAttributes", "headPose,occlusion,accessories"),
            ])
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.key)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(image);

        http::send_json(request).await
    }
}
