pub mod annotate;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod service;

pub use annotate::{Annotator, Canvas, OutputKind, Style};
pub use config::{ServiceConfig, ServiceKind, TrainingConfig};
pub use error::{VisionError, VisionResult};
pub use models::{Annotation, Point, Rect, Region};
