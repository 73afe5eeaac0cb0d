//! Font/glyph collaborator seam for text selectors.

use crate::pattern::Pattern;
use image::{Rgba, RgbaImage};

/// A font face capable of measuring and rasterizing text.
///
/// Text selectors render the requested string through the configured face
/// into an offscreen pattern, then proceed as an ordinary image match. The
/// rasterizer must draw onto a fully transparent background so that
/// untouched pixels become wildcards, letting anti-aliased glyph edges match
/// regardless of what the application draws behind them.
pub trait FontFace: Send + Sync {
    /// Size in pixels of the rendered string
    fn measure(&self, text: &str) -> (u32, u32);

    /// Rasterize the string in the given color onto a transparent background
    fn render(&self, text: &str, color: Rgba<u8>) -> RgbaImage;
}

/// Render text through a face into a search pattern
#[must_use]
pub fn text_pattern(face: &dyn FontFace, text: &str, color: Rgba<u8>) -> Pattern {
    Pattern::new(face.render(text, color))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Each character becomes a single opaque pixel of the requested color
    struct DotFace;

    impl FontFace for DotFace {
        fn measure(&self, text: &str) -> (u32, u32) {
            (text.chars().count() as u32, 1)
        }

        fn render(&self, text: &str, color: Rgba<u8>) -> RgbaImage {
            let (w, h) = self.measure(text);
            RgbaImage::from_pixel(w, h, color)
        }
    }

    #[test]
    fn test_text_pattern_dimensions_follow_face() {
        let color = Rgba([10, 20, 30, 255]);
        let pattern = text_pattern(&DotFace, "abc", color);
        assert_eq!((pattern.width(), pattern.height()), (3, 1));
        assert_eq!(*pattern.image().get_pixel(0, 0), color);
    }
}
