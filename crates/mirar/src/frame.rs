//! The most recently rendered frame and its thread-safe holder.

use crate::pixel::AlphaMode;
use image::RgbaImage;
use std::sync::{Arc, Mutex};

/// One rendered frame.
///
/// Immutable once published. Readers hold an `Arc` snapshot that stays
/// valid while the render loop publishes newer frames over it.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbaImage,
    alpha: AlphaMode,
    sequence: u64,
}

impl Frame {
    /// Pixel data of the frame
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Alpha encoding of the pixel data
    #[must_use]
    pub const fn alpha(&self) -> AlphaMode {
        self.alpha
    }

    /// Monotonically increasing frame number, starting at 1
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Frame width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[derive(Debug, Default)]
struct Slot {
    frame: Option<Arc<Frame>>,
    next_sequence: u64,
}

/// Thread-safe holder of the latest rendered frame.
///
/// Written once per frame by the render loop's draw phase, read by the test
/// thread. A lock (not an atomic swap) guards the slot because the frame and
/// its sequence counter must change together.
#[derive(Debug, Default)]
pub struct ScreenBuffer {
    slot: Mutex<Slot>,
}

impl ScreenBuffer {
    /// Create an empty screen buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored frame. Returns the sequence number assigned to it.
    pub fn publish(&self, image: RgbaImage, alpha: AlphaMode) -> u64 {
        let mut slot = self.slot.lock().unwrap();
        slot.next_sequence += 1;
        let sequence = slot.next_sequence;
        slot.frame = Some(Arc::new(Frame {
            image,
            alpha,
            sequence,
        }));
        sequence
    }

    /// Most recent frame, or `None` before the first draw.
    ///
    /// The returned snapshot may be superseded by the next frame at any
    /// time; callers must not assume it is still current.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.slot.lock().unwrap().frame.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_before_first_publish() {
        let buf = ScreenBuffer::new();
        assert!(buf.latest().is_none());
    }

    #[test]
    fn test_publish_assigns_increasing_sequence() {
        let buf = ScreenBuffer::new();
        let s1 = buf.publish(RgbaImage::new(2, 2), AlphaMode::Straight);
        let s2 = buf.publish(RgbaImage::new(2, 2), AlphaMode::Straight);
        assert_eq!(s1, 1);
        assert_eq!(s2, 2);
        assert_eq!(buf.latest().unwrap().sequence(), 2);
    }

    #[test]
    fn test_snapshot_survives_overwrite() {
        let buf = ScreenBuffer::new();
        buf.publish(RgbaImage::new(3, 1), AlphaMode::Straight);
        let snapshot = buf.latest().unwrap();
        buf.publish(RgbaImage::new(5, 5), AlphaMode::Premultiplied);
        // The old Arc still points at the old frame
        assert_eq!(snapshot.width(), 3);
        assert_eq!(buf.latest().unwrap().width(), 5);
    }
}
