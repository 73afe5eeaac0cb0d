//! Patterns: the sub-images selectors search for.

use crate::pixel::AlphaMode;
use image::RgbaImage;

/// A pixel grid to search for inside a frame.
///
/// Sourced from a supplied bitmap, from text rendered through a
/// [`FontFace`](crate::text::FontFace), or from a previous match.
#[derive(Debug, Clone)]
pub struct Pattern {
    image: RgbaImage,
    alpha: AlphaMode,
}

impl Pattern {
    /// Create a pattern from a straight-alpha image
    #[must_use]
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            alpha: AlphaMode::Straight,
        }
    }

    /// Create a pattern with an explicit alpha encoding
    #[must_use]
    pub fn with_alpha(image: RgbaImage, alpha: AlphaMode) -> Self {
        Self { image, alpha }
    }

    /// Pixel data of the pattern
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Alpha encoding of the pixel data
    #[must_use]
    pub const fn alpha(&self) -> AlphaMode {
        self.alpha
    }

    /// Pattern width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Pattern height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether the pattern has no pixels at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl From<RgbaImage> for Pattern {
    fn from(image: RgbaImage) -> Self {
        Self::new(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_detection() {
        assert!(Pattern::new(RgbaImage::new(0, 4)).is_empty());
        assert!(Pattern::new(RgbaImage::new(4, 0)).is_empty());
        assert!(!Pattern::new(RgbaImage::new(1, 1)).is_empty());
    }

    #[test]
    fn test_alpha_default_is_straight() {
        let p: Pattern = RgbaImage::new(2, 2).into();
        assert_eq!(p.alpha(), AlphaMode::Straight);
    }
}
