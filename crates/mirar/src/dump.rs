//! Debug artifacts for failed assertions.
//!
//! One PNG per failure: the screen and the pattern side by side, with the
//! offending match outlined in red when the failure is an unexpected find.
//! A JSON sidecar records what was asserted. Artifact I/O errors indicate an
//! unusable test environment and are surfaced as resource errors, not as
//! assertion outcomes.

use crate::frame::Frame;
use crate::geometry::Rect;
use crate::pattern::Pattern;
use crate::result::{MirarError, MirarResult};
use image::{ImageFormat, Rgba, RgbaImage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const OUTLINE: Rgba<u8> = Rgba([255, 0, 0, 255]);
const OUTLINE_THICKNESS: u32 = 2;

#[derive(Debug, Serialize)]
struct DumpRecord<'a> {
    assertion: &'a str,
    matched: Option<Rect>,
}

/// Writer for per-failure debug artifacts
#[derive(Debug, Clone)]
pub(crate) struct DumpSink {
    dir: PathBuf,
}

impl DumpSink {
    /// Recreate the artifact directory empty.
    ///
    /// Any directory left over from a previous run is removed first, so a
    /// run's artifacts are exactly its own failures.
    pub fn create(dir: &Path) -> MirarResult<Self> {
        match std::fs::remove_dir_all(dir) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Write the artifact pair for one failed assertion.
    ///
    /// Returns the path of the PNG, for inclusion in the failure message.
    pub fn write(
        &self,
        assertion: &str,
        frame: &Frame,
        pattern: &Pattern,
        matched: Option<Rect>,
    ) -> MirarResult<PathBuf> {
        let name = Uuid::new_v4().to_string();
        let png_path = self.dir.join(format!("{name}.png"));
        let json_path = self.dir.join(format!("{name}.json"));

        let composed = compose(frame, pattern, matched);
        composed
            .save_with_format(&png_path, ImageFormat::Png)
            .map_err(|err| MirarError::Image {
                message: format!("failed to encode {}: {err}", png_path.display()),
            })?;

        let record = DumpRecord { assertion, matched };
        std::fs::write(&json_path, serde_json::to_vec_pretty(&record)?)?;

        Ok(png_path)
    }
}

/// Screen on the left, pattern on the right, match outlined
fn compose(frame: &Frame, pattern: &Pattern, matched: Option<Rect>) -> RgbaImage {
    let width = frame.width() + pattern.width();
    let height = frame.height().max(pattern.height()).max(1);
    let mut out = RgbaImage::new(width.max(1), height);

    blit(&mut out, frame.image(), 0, 0);
    blit(&mut out, pattern.image(), frame.width(), 0);
    if let Some(rect) = matched {
        outline(&mut out, rect);
    }
    out
}

fn blit(dst: &mut RgbaImage, src: &RgbaImage, ox: u32, oy: u32) {
    for (x, y, px) in src.enumerate_pixels() {
        if ox + x < dst.width() && oy + y < dst.height() {
            dst.put_pixel(ox + x, oy + y, *px);
        }
    }
}

fn outline(image: &mut RgbaImage, rect: Rect) {
    let mut set = |x: u32, y: u32| {
        if x < image.width() && y < image.height() {
            image.put_pixel(x, y, OUTLINE);
        }
    };
    for t in 0..OUTLINE_THICKNESS {
        for x in rect.x..rect.right() {
            set(x, rect.y + t);
            set(x, rect.bottom().saturating_sub(t + 1));
        }
        for y in rect.y..rect.bottom() {
            set(rect.x + t, y);
            set(rect.right().saturating_sub(t + 1), y);
        }
    }
}
