//! Clients for the remote vision services.

pub mod analysis;
pub mod face;
pub mod http;
pub mod training;

pub use analysis::{AnalysisClient, AnalysisResult, VisualFeature};
pub use face::{DetectedFace, FaceClient};
pub use training::{TrainingClient, TrainingSession};

/// Key header for the face and image-analysis services.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
