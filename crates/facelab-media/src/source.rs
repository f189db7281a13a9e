//! Directory-of-frames source.
//!
//! Treats an ordered directory of still images as a frame stream, the
//! file-backed stand-in for video input.

use crate::loader;
use facelab_core::{BoxedError, Frame, FrameSource};
use std::path::{Path, PathBuf};

const FRAME_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Frame source over the image files of a directory, in name order.
pub struct FrameDirSource {
    frames: std::vec::IntoIter<PathBuf>,
}

impl FrameDirSource {
    /// List the directory's image files. An unreadable directory fails
    /// here, before any frame is processed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let dir = dir.as_ref();
        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| {
                        FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
                    })
            })
            .collect();
        frames.sort();

        tracing::info!(dir = %dir.display(), frames = frames.len(), "opened frame directory");
        Ok(Self { frames: frames.into_iter() })
    }
}

impl FrameSource for FrameDirSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, BoxedError> {
        match self.frames.next() {
            Some(path) => loader::load_image(&path).map(Some).map_err(Into::into),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_iterates_images_in_name_order_then_ends() {
        let dir = tempfile::tempdir().unwrap();
        // Written out of order; iteration must be name-sorted.
        RgbImage::new(2, 2).save(dir.path().join("b.png")).unwrap();
        RgbImage::new(3, 3).save(dir.path().join("a.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let mut source = FrameDirSource::open(dir.path()).unwrap();
        assert_eq!(source.next_frame().unwrap().unwrap().width, 3);
        assert_eq!(source.next_frame().unwrap().unwrap().width, 2);
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_empty_directory_ends_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FrameDirSource::open(dir.path()).unwrap();
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_missing_directory_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FrameDirSource::open(dir.path().join("absent")).is_err());
    }
}
