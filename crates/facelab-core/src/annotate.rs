//! Bounding-box and label-strip annotation.
//!
//! Operates on RGB pixel buffers; the engine converts to the display
//! channel order only after annotation.

use crate::types::FaceMatch;
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;
use thiserror::Error;

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BORDER_PX: u32 = 2;
const LABEL_STRIP_HEIGHT: u32 = 24;
const LABEL_TEXT_SCALE: f32 = 18.0;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("failed to read font file {0}: {1}")]
    Read(String, #[source] std::io::Error),
    #[error("failed to parse font file {0}")]
    Parse(String),
}

/// Loaded TTF/OTF font for label text.
pub struct LabelFont {
    font: FontVec,
}

impl LabelFont {
    /// Load a font from disk. The engine treats a missing font as
    /// strip-only annotation, so callers may downgrade this error to a
    /// warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| FontError::Read(path.display().to_string(), e))?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|_| FontError::Parse(path.display().to_string()))?;
        Ok(Self { font })
    }
}

/// Draw one labeled face: hollow box around the region and a filled strip
/// along its bottom edge carrying the assigned name.
///
/// Coordinates outside the image are clamped; a region degenerate after
/// clamping draws nothing.
pub fn draw_face_label(img: &mut RgbImage, face: &FaceMatch, font: Option<&LabelFont>) {
    let left = face.region.left.min(img.width());
    let top = face.region.top.min(img.height());
    let right = face.region.right.min(img.width());
    let bottom = face.region.bottom.min(img.height());

    let width = right.saturating_sub(left);
    let height = bottom.saturating_sub(top);
    if width == 0 || height == 0 {
        return;
    }

    for inset in 0..BORDER_PX.min(width / 2).min(height / 2).max(1) {
        let w = width - 2 * inset;
        let h = height - 2 * inset;
        if w == 0 || h == 0 {
            break;
        }
        draw_hollow_rect_mut(
            img,
            Rect::at((left + inset) as i32, (top + inset) as i32).of_size(w, h),
            BOX_COLOR,
        );
    }

    // Filled name strip along the bottom edge, inside the box.
    let strip_h = LABEL_STRIP_HEIGHT.min(height);
    let strip_top = bottom - strip_h;
    draw_filled_rect_mut(
        img,
        Rect::at(left as i32, strip_top as i32).of_size(width, strip_h),
        BOX_COLOR,
    );

    if let Some(font) = font {
        draw_text_mut(
            img,
            TEXT_COLOR,
            (left + 4) as i32,
            (strip_top + 2) as i32,
            PxScale::from(LABEL_TEXT_SCALE),
            &font.font,
            &face.name,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Region;

    fn black(w: u32, h: u32) -> RgbImage {
        RgbImage::new(w, h)
    }

    fn face(top: u32, right: u32, bottom: u32, left: u32) -> FaceMatch {
        FaceMatch {
            region: Region { top, right, bottom, left },
            name: "Alice".to_string(),
        }
    }

    #[test]
    fn test_draws_box_border() {
        let mut img = black(100, 100);
        draw_face_label(&mut img, &face(10, 90, 90, 10), None);
        // Top-left corner of the border
        assert_eq!(*img.get_pixel(10, 10), BOX_COLOR);
        // Interior above the strip stays untouched
        assert_eq!(*img.get_pixel(50, 40), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draws_filled_strip_at_bottom() {
        let mut img = black(100, 100);
        draw_face_label(&mut img, &face(10, 90, 90, 10), None);
        // Center of the 24px strip above the bottom edge
        assert_eq!(*img.get_pixel(50, 80), BOX_COLOR);
    }

    #[test]
    fn test_region_outside_image_is_clamped() {
        let mut img = black(50, 50);
        // Region extends past both image edges; must not panic.
        draw_face_label(&mut img, &face(40, 200, 200, 40), None);
        assert_eq!(*img.get_pixel(49, 49), BOX_COLOR);
    }

    #[test]
    fn test_degenerate_region_draws_nothing() {
        let mut img = black(50, 50);
        draw_face_label(&mut img, &face(60, 70, 70, 60), None);
        assert!(img.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
