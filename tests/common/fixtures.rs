use std::time::Duration;

use azvision::{ServiceConfig, TrainingConfig};
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use tempfile::NamedTempFile;

pub const TEST_KEY: &str = "test-key";

/// Creates a gradient test image of the given size.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128u8])
    });
    DynamicImage::ImageRgb8(img)
}

/// Creates a single-colour test image.
pub fn solid_image(width: u32, height: u32, color: Rgb<u8>) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, color))
}

/// Writes `img` as a PNG temp file that is cleaned up when dropped.
pub fn write_test_image(img: &DynamicImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Writes a gradient PNG to a temp file that is cleaned up when dropped.
pub fn create_test_image(width: u32, height: u32) -> NamedTempFile {
    write_test_image(&gradient_image(width, height))
}

/// Counts clearly green pixels in rows `top..bottom`, columns `left..right`.
/// Tolerant of JPEG colour shifts.
pub fn green_pixels(img: &RgbImage, left: u32, right: u32, top: u32, bottom: u32) -> usize {
    (top..bottom)
        .flat_map(|y| (left..right).map(move |x| (x, y)))
        .filter(|&(x, y)| {
            let [r, g, b] = img.get_pixel(x, y).0;
            g as i32 > r as i32 + 50 && g as i32 > b as i32 + 50
        })
        .count()
}

pub fn service_config(endpoint: &str) -> ServiceConfig {
    ServiceConfig {
        endpoint: endpoint.to_string(),
        key: TEST_KEY.to_string(),
        timeout: Duration::from_secs(5),
    }
}

pub fn training_config(endpoint: &str, project_id: &str) -> TrainingConfig {
    TrainingConfig {
        endpoint: endpoint.to_string(),
        key: TEST_KEY.to_string(),
        project_id: project_id.to_string(),
        timeout: Duration::from_secs(5),
    }
}
