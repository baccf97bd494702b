// ============================================================
// Layer 4 — Image Preprocessor
// ============================================================
// Turns any decodable image into the 784 values the network
// expects, the same way for training files and for drawings
// posted by the browser:
//
//   1. Resize to 28x28 (skipped when already that size)
//   2. Convert to 8-bit grayscale, compositing alpha over black
//   3. Scale 0..=255 down to 0.0..=1.0
//
// Browser canvases send "data:image/png;base64,...." strings,
// sometimes wrapped in JSON quotes. decode_data_url() strips
// that wrapping before base64 decoding.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops::FilterType, DynamicImage};

use crate::domain::digit::{IMG_HEIGHT, IMG_WIDTH};

#[derive(Debug, Clone)]
pub struct Preprocessor {
    height: u32,
    width:  u32,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self {
            height: IMG_HEIGHT as u32,
            width:  IMG_WIDTH as u32,
        }
    }

    /// Load an image file from disk
    pub fn pixels_from_path(&self, path: &Path) -> Result<Vec<f32>> {
        let img = image::open(path)
            .with_context(|| format!("Cannot decode image '{}'", path.display()))?;
        Ok(self.pixels_from_image(&img))
    }

    /// Decode raw encoded image bytes (PNG)
    pub fn pixels_from_bytes(&self, bytes: &[u8]) -> Result<Vec<f32>> {
        let img = image::load_from_memory(bytes).context("Cannot decode image bytes")?;
        Ok(self.pixels_from_image(&img))
    }

    /// Decode a base64 data URL as posted by the drawing page
    pub fn pixels_from_data_url(&self, body: &str) -> Result<Vec<f32>> {
        let bytes = decode_data_url(body)?;
        self.pixels_from_bytes(&bytes)
    }

    pub fn pixels_from_image(&self, img: &DynamicImage) -> Vec<f32> {
        let resized;
        let img = if img.width() == self.width && img.height() == self.height {
            img
        } else {
            resized = img.resize_exact(self.width, self.height, FilterType::Triangle);
            &resized
        };

        img.to_luma_alpha8()
            .pixels()
            .map(|p| {
                let [luma, alpha] = p.0;
                let composited = luma as f32 * alpha as f32 / 255.0;
                composited / 255.0
            })
            .collect()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip quotes and an optional `data:<mime>;base64,` prefix,
/// then base64-decode what is left.
pub fn decode_data_url(body: &str) -> Result<Vec<u8>> {
    let trimmed = body.trim().trim_matches('"').trim();

    let payload = match trimmed.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .ok_or_else(|| anyhow!("Data URL is not base64 encoded"))?,
        None => trimmed,
    };

    if payload.is_empty() {
        return Err(anyhow!("Empty image payload"));
    }

    STANDARD
        .decode(payload.trim())
        .context("Invalid base64 image payload")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma, LumaA, Rgba, RgbaImage};
    use std::io::Cursor;

    /// Encode a grayscale image as PNG bytes
    pub(crate) fn png_bytes(img: DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    pub(crate) fn digit_png(fill: u8) -> Vec<u8> {
        let img = GrayImage::from_pixel(28, 28, Luma([fill]));
        png_bytes(DynamicImage::ImageLuma8(img))
    }

    #[test]
    fn test_scales_to_unit_range() {
        let p = Preprocessor::new();
        let pixels = p.pixels_from_bytes(&digit_png(255)).unwrap();
        assert_eq!(pixels.len(), 784);
        assert!(pixels.iter().all(|&v| (v - 1.0).abs() < 1e-6));

        let pixels = p.pixels_from_bytes(&digit_png(0)).unwrap();
        assert!(pixels.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_resizes_large_canvas() {
        let p = Preprocessor::new();
        let img = GrayImage::from_pixel(280, 280, Luma([128]));
        let bytes = png_bytes(DynamicImage::ImageLuma8(img));
        let pixels = p.pixels_from_bytes(&bytes).unwrap();
        assert_eq!(pixels.len(), 784);
        assert!(pixels.iter().all(|&v| (v - 128.0 / 255.0).abs() < 0.01));
    }

    #[test]
    fn test_transparent_pixels_become_background() {
        let p = Preprocessor::new();
        let img = RgbaImage::from_pixel(28, 28, Rgba([255, 255, 255, 0]));
        let bytes = png_bytes(DynamicImage::ImageRgba8(img));
        let pixels = p.pixels_from_bytes(&bytes).unwrap();
        assert!(pixels.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_half_transparent_ink() {
        let p = Preprocessor::new();
        let img = image::ImageBuffer::from_pixel(28, 28, LumaA([255u8, 51]));
        let pixels = p.pixels_from_image(&DynamicImage::ImageLumaA8(img));
        assert!(pixels.iter().all(|&v| (v - 0.2).abs() < 1e-6));
    }

    #[test]
    fn test_data_url_round_trip() {
        let p = Preprocessor::new();
        let encoded = STANDARD.encode(digit_png(255));
        let body = format!("\"data:image/png;base64,{encoded}\"");
        let pixels = p.pixels_from_data_url(&body).unwrap();
        assert_eq!(pixels.len(), 784);
    }

    #[test]
    fn test_bare_base64_is_accepted() {
        let encoded = STANDARD.encode(b"abc");
        assert_eq!(decode_data_url(&encoded).unwrap(), b"abc");
    }

    #[test]
    fn test_rejects_bad_payloads() {
        assert!(decode_data_url("data:image/png,notbase64").is_err());
        assert!(decode_data_url("\"\"").is_err());
        assert!(decode_data_url("!!!").is_err());

        let p = Preprocessor::new();
        let not_png = STANDARD.encode(b"definitely not an image");
        assert!(p.pixels_from_data_url(&not_png).is_err());
    }
}
