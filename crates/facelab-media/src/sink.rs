//! PNG output sink for annotated frames.

use facelab_core::{BoxedError, ChannelOrder, Frame, Presenter};
use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("frame buffer does not match its dimensions")]
    InvalidFrame,
    #[error("failed to write {0}: {1}")]
    Write(String, #[source] image::ImageError),
    #[error("failed to create output directory {0}: {1}")]
    CreateDir(String, #[source] std::io::Error),
}

/// Encode a frame (any channel order) as a PNG file.
///
/// The image crate is RGB-native, so a BGR frame is converted back at
/// this boundary.
pub fn save_frame(frame: &Frame, path: impl AsRef<Path>) -> Result<(), SinkError> {
    let path = path.as_ref();
    let rgb = frame.clone().into_order(ChannelOrder::Rgb);
    let img = RgbImage::from_raw(rgb.width, rgb.height, rgb.data)
        .ok_or(SinkError::InvalidFrame)?;
    img.save(path)
        .map_err(|e| SinkError::Write(path.display().to_string(), e))?;
    tracing::debug!(path = %path.display(), "frame written");
    Ok(())
}

/// Presenter writing numbered PNGs into a directory, with an optional
/// frame cap acting as the cooperative stop signal.
pub struct PngSink {
    dir: PathBuf,
    written: usize,
    max_frames: Option<usize>,
}

impl PngSink {
    pub fn create(dir: impl AsRef<Path>, max_frames: Option<usize>) -> Result<Self, SinkError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| SinkError::CreateDir(dir.display().to_string(), e))?;
        Ok(Self { dir, written: 0, max_frames })
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl Presenter for PngSink {
    fn present(&mut self, frame: &Frame) -> Result<(), BoxedError> {
        let path = self.dir.join(format!("frame_{:05}.png", self.written));
        save_frame(frame, &path)?;
        self.written += 1;
        Ok(())
    }

    fn should_stop(&mut self) -> bool {
        self.max_frames.is_some_and(|cap| self.written >= cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bgr_frame() -> Frame {
        // One blue pixel, already in BGR order: [255, 0, 0]
        Frame::new(vec![255, 0, 0], 1, 1, ChannelOrder::Bgr).unwrap()
    }

    #[test]
    fn test_save_frame_converts_bgr_back_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_frame(&bgr_frame(), &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(*img.get_pixel(0, 0), image::Rgb([0, 0, 255]));
    }

    #[test]
    fn test_png_sink_numbers_frames() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frames");
        let mut sink = PngSink::create(&out, None).unwrap();

        sink.present(&bgr_frame()).unwrap();
        sink.present(&bgr_frame()).unwrap();

        assert!(out.join("frame_00000.png").exists());
        assert!(out.join("frame_00001.png").exists());
        assert_eq!(sink.written(), 2);
    }

    #[test]
    fn test_png_sink_stops_at_cap() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PngSink::create(dir.path().join("frames"), Some(2)).unwrap();

        assert!(!sink.should_stop());
        sink.present(&bgr_frame()).unwrap();
        assert!(!sink.should_stop());
        sink.present(&bgr_frame()).unwrap();
        assert!(sink.should_stop());
    }
}
