//! Still-image loading.

use facelab_core::{ChannelOrder, Frame};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("image file not found: {0}")]
    NotFound(String),
    #[error("failed to decode image {0}: {1}")]
    Load(String, #[source] image::ImageError),
}

/// Load and decode an image file into an RGB frame.
///
/// A missing file and an undecodable file are distinct failures; neither
/// is retried.
pub fn load_image(path: impl AsRef<Path>) -> Result<Frame, ImageError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ImageError::NotFound(path.display().to_string()));
    }

    let img = image::open(path)
        .map_err(|e| ImageError::Load(path.display().to_string(), e))?
        .to_rgb8();

    let (width, height) = img.dimensions();
    tracing::debug!(path = %path.display(), width, height, "image loaded");

    Ok(Frame {
        data: img.into_raw(),
        width,
        height,
        order: ChannelOrder::Rgb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image(dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, ImageError::NotFound(_)));
    }

    #[test]
    fn test_undecodable_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.png");
        std::fs::write(&path, b"not an image").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, ImageError::Load(..)));
    }

    #[test]
    fn test_loads_rgb_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");

        let mut img = RgbImage::new(3, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.save(&path).unwrap();

        let frame = load_image(&path).unwrap();
        assert_eq!((frame.width, frame.height), (3, 2));
        assert_eq!(frame.order, ChannelOrder::Rgb);
        assert_eq!(&frame.data[..3], &[255, 0, 0]);
    }
}
