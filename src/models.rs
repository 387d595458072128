use serde::{Deserialize, Serialize};

/// A pixel coordinate in source-image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle given by its origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Opposite corners `(x, y)` and `(x + width, y + height)`.
    pub fn corners(&self) -> (Point, Point) {
        (
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y + self.height),
        )
    }
}

/// Where a detected item lies in the image.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    Rect(Rect),
    /// Four vertices in the order the service returned them.
    Polygon([Point; 4]),
}

impl Region {
    /// Builds a polygon region; anything other than exactly four vertices is rejected.
    pub fn polygon(points: &[Point]) -> Option<Self> {
        let vertices: [Point; 4] = points.try_into().ok()?;
        Some(Region::Polygon(vertices))
    }
}

/// A region plus the optional label and confidence that travel with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub region: Region,
    pub label: Option<String>,
    pub confidence: Option<f32>,
}

impl Annotation {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            label: None,
            confidence: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}
