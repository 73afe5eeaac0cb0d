//! Deterministic template search over the screen buffer.
//!
//! The scan is the naive one: every origin where the pattern fits is tried,
//! x outer and y inner, at O(W*H*w*h) cost. That is a known scaling limit,
//! accepted because assertion fixtures are small; it is not a defect.

use crate::frame::Frame;
use crate::geometry::Rect;
use crate::pattern::Pattern;
use crate::pixel::{is_wildcard, rgb_equal, to_straight};
use image::Rgba;

/// Find the first origin where `pattern` matches `frame`.
///
/// Origins are visited column by column (x outer, y inner), so the reported
/// match is the smallest origin in that order. Returns `None` when the
/// pattern is empty, larger than the frame, or simply absent.
#[must_use]
pub fn find(frame: &Frame, pattern: &Pattern) -> Option<Rect> {
    scan(frame, pattern, false).into_iter().next()
}

/// Find every origin where `pattern` matches `frame`.
///
/// Overlapping hits are all reported; no deduplication is applied.
#[must_use]
pub fn find_all(frame: &Frame, pattern: &Pattern) -> Vec<Rect> {
    scan(frame, pattern, true)
}

fn scan(frame: &Frame, pattern: &Pattern, all: bool) -> Vec<Rect> {
    let mut matches = Vec::new();
    if pattern.is_empty() || pattern.width() > frame.width() || pattern.height() > frame.height() {
        return matches;
    }

    let template = StraightPattern::new(pattern);
    for x in 0..=(frame.width() - pattern.width()) {
        for y in 0..=(frame.height() - pattern.height()) {
            if matches_at(frame, &template, x, y) {
                matches.push(Rect::new(x, y, pattern.width(), pattern.height()));
                if !all {
                    return matches;
                }
            }
        }
    }
    matches
}

/// Pattern pixels converted to straight alpha once, ahead of the scan
struct StraightPattern {
    width: u32,
    height: u32,
    pixels: Vec<Rgba<u8>>,
}

impl StraightPattern {
    fn new(pattern: &Pattern) -> Self {
        let pixels = pattern
            .image()
            .pixels()
            .map(|px| to_straight(*px, pattern.alpha()))
            .collect();
        Self {
            width: pattern.width(),
            height: pattern.height(),
            pixels,
        }
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        self.pixels[(y * self.width + x) as usize]
    }
}

fn matches_at(frame: &Frame, template: &StraightPattern, ox: u32, oy: u32) -> bool {
    for py in 0..template.height {
        for px in 0..template.width {
            let want = template.pixel(px, py);
            if is_wildcard(want) {
                continue;
            }
            let got = to_straight(*frame.image().get_pixel(ox + px, oy + py), frame.alpha());
            if !rgb_equal(want, got) {
                return false;
            }
        }
    }
    true
}
