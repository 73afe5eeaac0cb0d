//! Pixel-level color handling for frame/pattern comparison.
//!
//! All matching happens in straight-alpha space: premultiplied pixels are
//! divided out first, and only then are RGB channels compared. Alpha itself
//! never participates in the comparison; it only decides wildcarding.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// How a buffer encodes semi-transparent color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlphaMode {
    /// RGB channels are stored as-is
    #[default]
    Straight,
    /// RGB channels have alpha baked in and must be divided out
    /// before raw color comparison
    Premultiplied,
}

/// Convert a pixel to straight-alpha encoding.
///
/// A fully transparent premultiplied pixel has no recoverable color and
/// normalizes to transparent black.
#[must_use]
pub fn to_straight(px: Rgba<u8>, mode: AlphaMode) -> Rgba<u8> {
    let [r, g, b, a] = px.0;
    match mode {
        AlphaMode::Straight => px,
        AlphaMode::Premultiplied => {
            if a == 0 {
                return Rgba([0, 0, 0, 0]);
            }
            let a32 = u32::from(a);
            let un = |c: u8| (((u32::from(c) * 255) + a32 / 2) / a32).min(255) as u8;
            Rgba([un(r), un(g), un(b), a])
        }
    }
}

/// Whether a straight-alpha pattern pixel is a wildcard.
///
/// Fully transparent pixels carry no color, and pure-black pixels are
/// treated the same so anti-aliased glyph edges match on any background.
#[must_use]
pub fn is_wildcard(straight: Rgba<u8>) -> bool {
    let [r, g, b, a] = straight.0;
    a == 0 || (r == 0 && g == 0 && b == 0)
}

/// Compare two straight-alpha pixels by RGB only
#[must_use]
pub fn rgb_equal(p1: Rgba<u8>, p2: Rgba<u8>) -> bool {
    p1.0[..3] == p2.0[..3]
}
