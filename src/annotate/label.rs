use std::path::Path;

use ab_glyph::{FontArc, FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use tracing::debug;

use crate::error::{VisionError, VisionResult};
use crate::models::Point;

pub const FONT_ENV_VAR: &str = "AZVISION_LABEL_FONT";

static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Label text height in output pixels, independent of source resolution.
const LABEL_PX: f32 = 16.0;
const LABEL_PADDING: i32 = 2;
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// TrueType font used to render region labels.
pub struct LabelFont {
    font: FontArc,
    scale: PxScale,
}

impl LabelFont {
    fn from_font(font: FontArc) -> Self {
        Self {
            font,
            scale: PxScale::from(LABEL_PX),
        }
    }

    /// The font shipped inside the binary.
    pub fn bundled() -> VisionResult<Self> {
        let font = FontRef::try_from_slice(BUNDLED_FONT)
            .map_err(|e| VisionError::InvalidConfig(format!("bundled label font: {e}")))?;
        Ok(Self::from_font(FontArc::new(font)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> VisionResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| {
            VisionError::InvalidConfig(format!("{} is not a usable font: {}", path.display(), e))
        })?;
        Ok(Self::from_font(font))
    }

    /// Font named by `AZVISION_LABEL_FONT`, if set. An unusable override is an error.
    pub fn from_env() -> VisionResult<Option<Self>> {
        match std::env::var(FONT_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                debug!("Using label font {}", path);
                Self::from_file(path.trim()).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Pixel size of the label box, including padding.
    pub fn label_size(&self, text: &str) -> (u32, u32) {
        let (w, h) = text_size(self.scale, &self.font, text);
        (w + 2 * LABEL_PADDING as u32, h + 2 * LABEL_PADDING as u32)
    }

    /// Top edge of the label box for `anchor`: above it, or below when it
    /// would leave the image.
    pub fn label_top(&self, anchor: Point, text: &str) -> i32 {
        let (_, h) = self.label_size(text);
        if anchor.y - (h as i32) < 0 {
            anchor.y
        } else {
            anchor.y - h as i32
        }
    }

    /// Draw `text` on an opaque `background` box whose lower-left corner sits
    /// on `anchor`.
    pub fn draw_label(
        &self,
        canvas: &mut RgbImage,
        anchor: Point,
        text: &str,
        background: Rgb<u8>,
    ) {
        let (w, h) = self.label_size(text);
        let top = self.label_top(anchor, text);

        draw_filled_rect_mut(
            canvas,
            imageproc::rect::Rect::at(anchor.x, top).of_size(w, h),
            background,
        );
        draw_text_mut(
            canvas,
            TEXT_COLOR,
            anchor.x + LABEL_PADDING,
            top + LABEL_PADDING,
            self.scale,
            &self.font,
            text,
        );
    }
}
