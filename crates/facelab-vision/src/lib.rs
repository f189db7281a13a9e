//! facelab-vision — ONNX-backed face location and embedding extraction.
//!
//! Implements the `FaceLocator` and `FaceEncoder` traits from
//! `facelab-core` on top of ONNX Runtime. The detection model is consumed
//! as an opaque capability: any model emitting `(N, 5)` rows of
//! `[x1, y1, x2, y2, score]` works. The embedding model must emit a
//! 128-dimensional vector per face crop.

pub mod detector;
pub mod encoder;
mod resize;

pub use detector::{DetectorError, OnnxFaceLocator};
pub use encoder::{EncoderError, OnnxFaceEncoder};

use std::path::PathBuf;

/// Default directory for ONNX model files.
pub fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("facelab/models")
}
