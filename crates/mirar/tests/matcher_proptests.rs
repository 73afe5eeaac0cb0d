//! Property-based tests for the pattern comparator.
//!
//! The premultiplied generators stick to alpha values whose encoding round
//! trips exactly (0, 51 with channels in multiples of 5, 255), so both
//! encodings of a pixel denote the same straight color.

use image::{Rgba, RgbaImage};
use mirar::matcher::{find, find_all};
use mirar::{AlphaMode, Pattern, ScreenBuffer};
use proptest::prelude::*;
use std::sync::Arc;

const FRAME_W: u32 = 6;
const FRAME_H: u32 = 6;
const PATTERN_W: u32 = 2;
const PATTERN_H: u32 = 2;

// ===== Strategy definitions =====

/// A straight-alpha pixel that premultiplies without rounding loss
fn roundtrip_pixel_strategy() -> impl Strategy<Value = Rgba<u8>> {
    prop_oneof![
        // Canonical transparent
        Just(Rgba([0, 0, 0, 0])),
        // Opaque, any color
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgba([r, g, b, 255])),
        // Alpha 51: channels in multiples of 5 divide exactly
        (0u8..=51, 0u8..=51, 0u8..=51)
            .prop_map(|(r, g, b)| Rgba([r * 5, g * 5, b * 5, 51])),
    ]
}

fn image_strategy(width: u32, height: u32) -> impl Strategy<Value = RgbaImage> {
    proptest::collection::vec(roundtrip_pixel_strategy(), (width * height) as usize).prop_map(
        move |pixels| {
            let mut image = RgbaImage::new(width, height);
            for (i, px) in pixels.into_iter().enumerate() {
                let i = i as u32;
                image.put_pixel(i % width, i / width, px);
            }
            image
        },
    )
}

/// An opaque pixel guaranteed not to be a wildcard
fn opaque_nonblack_pixel_strategy() -> impl Strategy<Value = Rgba<u8>> {
    (1u8..=255, any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgba([r, g, b, 255]))
}

// ===== Helpers =====

fn premultiply(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        let [r, g, b, a] = px.0;
        let a32 = u32::from(a);
        let mul = |c: u8| ((u32::from(c) * a32) / 255) as u8;
        *px = Rgba([mul(r), mul(g), mul(b), a]);
    }
    out
}

fn frame(image: RgbaImage, alpha: AlphaMode) -> Arc<mirar::Frame> {
    let buffer = ScreenBuffer::new();
    buffer.publish(image, alpha);
    buffer.latest().unwrap()
}

// ===== Properties =====

proptest! {
    /// Supplying the frame premultiplied instead of straight never changes
    /// the comparator's verdict
    #[test]
    fn prop_frame_encoding_invariance(
        screen in image_strategy(FRAME_W, FRAME_H),
        template in image_strategy(PATTERN_W, PATTERN_H),
    ) {
        let pattern = Pattern::new(template);
        let straight = find_all(&frame(screen.clone(), AlphaMode::Straight), &pattern);
        let premul = find_all(
            &frame(premultiply(&screen), AlphaMode::Premultiplied),
            &pattern,
        );
        prop_assert_eq!(straight, premul);
    }

    /// Supplying the pattern premultiplied instead of straight never changes
    /// the comparator's verdict
    #[test]
    fn prop_pattern_encoding_invariance(
        screen in image_strategy(FRAME_W, FRAME_H),
        template in image_strategy(PATTERN_W, PATTERN_H),
    ) {
        let screen = frame(screen, AlphaMode::Straight);
        let straight = find_all(&screen, &Pattern::new(template.clone()));
        let premul = find_all(
            &screen,
            &Pattern::with_alpha(premultiply(&template), AlphaMode::Premultiplied),
        );
        prop_assert_eq!(straight, premul);
    }

    /// A match of a fully opaque, wildcard-free pattern implies exact RGB
    /// equality over the whole matched rectangle
    #[test]
    fn prop_opaque_match_implies_pixel_equality(
        screen in image_strategy(FRAME_W, FRAME_H),
        template in proptest::collection::vec(
            opaque_nonblack_pixel_strategy(),
            (PATTERN_W * PATTERN_H) as usize,
        ),
    ) {
        let mut image = RgbaImage::new(PATTERN_W, PATTERN_H);
        for (i, px) in template.into_iter().enumerate() {
            let i = i as u32;
            image.put_pixel(i % PATTERN_W, i / PATTERN_W, px);
        }
        let pattern = Pattern::new(image);
        let screen = frame(screen, AlphaMode::Straight);

        for rect in find_all(&screen, &pattern) {
            for py in 0..PATTERN_H {
                for px in 0..PATTERN_W {
                    let got = screen.image().get_pixel(rect.x + px, rect.y + py);
                    let want = pattern.image().get_pixel(px, py);
                    prop_assert_eq!(&got.0[..3], &want.0[..3]);
                }
            }
        }
    }

    /// The single-match scan returns exactly the first find-all hit
    #[test]
    fn prop_find_is_first_of_find_all(
        screen in image_strategy(FRAME_W, FRAME_H),
        template in image_strategy(PATTERN_W, PATTERN_H),
    ) {
        let pattern = Pattern::new(template);
        let screen = frame(screen, AlphaMode::Straight);
        let all = find_all(&screen, &pattern);
        prop_assert_eq!(find(&screen, &pattern), all.first().copied());
    }
}
