use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use stategen_core::ScaleSettings;

use crate::{PromptError, Result};

/// Upper bounds for a downscaled image. At least one must be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleBounds {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl ScaleBounds {
    pub fn width(max_width: u32) -> Self {
        Self {
            max_width: Some(max_width),
            max_height: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match (self.max_width, self.max_height) {
            (None, None) => Err(PromptError::InvalidArgument(
                "at least one of max_width or max_height must be provided".into(),
            )),
            (Some(0), _) | (_, Some(0)) => Err(PromptError::InvalidArgument(
                "scale bounds must be positive".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Single ratio applied to both axes; `1.0` when the image already fits.
    fn ratio(&self, width: u32, height: u32) -> f64 {
        let mut ratio = 1.0_f64;
        if let Some(max) = self.max_width.filter(|&m| width > m) {
            ratio = ratio.min(f64::from(max) / f64::from(width));
        }
        if let Some(max) = self.max_height.filter(|&m| height > m) {
            ratio = ratio.min(f64::from(max) / f64::from(height));
        }
        ratio
    }
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self::width(800)
    }
}

impl From<ScaleSettings> for ScaleBounds {
    fn from(s: ScaleSettings) -> Self {
        Self {
            max_width: s.max_width,
            max_height: s.max_height,
        }
    }
}

fn scaled(dim: u32, ratio: f64) -> u32 {
    ((f64::from(dim) * ratio).round() as u32).max(1)
}

/// Downscale `image` to fit `bounds`, preserving aspect ratio. Never upscales.
pub fn scale_to_fit(image: DynamicImage, bounds: &ScaleBounds) -> Result<DynamicImage> {
    bounds.validate()?;

    let (width, height) = (image.width(), image.height());
    let ratio = bounds.ratio(width, height);
    if ratio >= 1.0 {
        return Ok(image);
    }

    let (new_width, new_height) = (scaled(width, ratio), scaled(height, ratio));
    tracing::debug!(width, height, new_width, new_height, "downscaling image");
    Ok(image.resize_exact(new_width, new_height, FilterType::Lanczos3))
}

pub fn load_scaled(path: &Path, bounds: &ScaleBounds) -> Result<DynamicImage> {
    bounds.validate()?;
    let image = image::open(path)?;
    scale_to_fit(image, bounds)
}

pub fn encode_png_base64(image: &DynamicImage) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(BASE64.encode(buffer.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn blank(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
    }

    #[test]
    fn no_bounds_is_invalid() {
        let none = ScaleBounds {
            max_width: None,
            max_height: None,
        };
        assert!(matches!(
            scale_to_fit(blank(10, 10), &none),
            Err(PromptError::InvalidArgument(_))
        ));
    }

    #[test]
    fn zero_bound_is_invalid() {
        assert!(matches!(
            scale_to_fit(blank(10, 10), &ScaleBounds::width(0)),
            Err(PromptError::InvalidArgument(_))
        ));
    }

    #[test]
    fn smaller_images_are_untouched() {
        for (w, h) in [(800, 450), (1, 1), (640, 2000)] {
            let out = scale_to_fit(blank(w, h), &ScaleBounds::width(800)).unwrap();
            assert_eq!((out.width(), out.height()), (w, h));
        }
    }

    #[test]
    fn wide_images_match_max_width() {
        let out = scale_to_fit(blank(1600, 900), &ScaleBounds::width(800)).unwrap();
        assert_eq!((out.width(), out.height()), (800, 450));

        let out = scale_to_fit(blank(1234, 567), &ScaleBounds::width(800)).unwrap();
        assert_eq!(out.width(), 800);
        let before = 567.0 / 1234.0;
        let result = f64::from(out.height()) / f64::from(out.width());
        assert!((before - result).abs() < 1.0 / 800.0);
    }

    #[test]
    fn tightest_bound_wins() {
        let bounds = ScaleBounds {
            max_width: Some(800),
            max_height: Some(200),
        };
        let out = scale_to_fit(blank(1600, 900), &bounds).unwrap();
        assert_eq!(out.height(), 200);
        assert_eq!(out.width(), 356);
    }

    #[test]
    fn extreme_ratio_keeps_one_pixel() {
        let out = scale_to_fit(blank(10_000, 1), &ScaleBounds::width(100)).unwrap();
        assert_eq!((out.width(), out.height()), (100, 1));
    }

    #[test]
    fn png_base64_decodes_back() {
        let encoded = encode_png_base64(&blank(3, 2)).unwrap();
        let bytes = BASE64.decode(encoded).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }
}
