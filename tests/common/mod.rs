mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from azvision for tests
pub use azvision::annotate::{Annotator, CYAN, LIGHT_GREEN, LabelFont, OutputKind};
pub use azvision::commands::InputImage;
pub use azvision::{Annotation, Point, Rect, Region, ServiceConfig, TrainingConfig, VisionError};
