//! ONNX face encoder.
//!
//! Crops a located region (with margin), resizes to the model input size
//! and extracts a 128-dimensional embedding. Embeddings are compared with
//! Euclidean distance downstream; no post-hoc normalization is applied.

use crate::resize::resize_region_rgb;
use facelab_core::{BoxedError, ChannelOrder, Embedding, FaceEncoder, Frame, Region};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const ENCODE_INPUT_SIZE: usize = 150;
const ENCODE_MEAN: f32 = 127.5;
const ENCODE_STD: f32 = 127.5;
/// Fraction of the region size added on every side before cropping, so
/// the crop carries some context around the tight detection box.
const CROP_MARGIN: f32 = 0.25;
const EMBEDDING_DIM: usize = 128;

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("embedding model not found: {0}")]
    ModelNotFound(String),
    #[error("embedding inference failed: {0}")]
    InferenceFailed(String),
    #[error("region is empty after clamping to the frame")]
    EmptyRegion,
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// ONNX-backed face encoder.
pub struct OnnxFaceEncoder {
    session: Session,
}

impl OnnxFaceEncoder {
    /// Load the embedding model, failing fast when the file is absent.
    pub fn load(model_path: &str) -> Result<Self, EncoderError> {
        if !Path::new(model_path).exists() {
            return Err(EncoderError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| i.name()).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded embedding model"
        );

        Ok(Self { session })
    }

    /// Extract the embedding for one located region of an RGB frame.
    pub fn extract(&mut self, frame: &Frame, region: &Region) -> Result<Embedding, EncoderError> {
        debug_assert_eq!(frame.order, ChannelOrder::Rgb);

        let (x, y, w, h) =
            expand_region(region, frame.width, frame.height).ok_or(EncoderError::EmptyRegion)?;

        let crop = resize_region_rgb(
            frame,
            x,
            y,
            w,
            h,
            ENCODE_INPUT_SIZE as u32,
            ENCODE_INPUT_SIZE as u32,
        );
        let input = preprocess(&crop);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, raw) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EncoderError::InferenceFailed(format!("embedding: {e}")))?;

        if raw.len() != EMBEDDING_DIM {
            return Err(EncoderError::InferenceFailed(format!(
                "expected {EMBEDDING_DIM}-dim embedding, got {}",
                raw.len()
            )));
        }

        Ok(Embedding::new(raw.to_vec()))
    }
}

impl FaceEncoder for OnnxFaceEncoder {
    fn encode(&mut self, frame: &Frame, region: &Region) -> Result<Embedding, BoxedError> {
        self.extract(frame, region).map_err(Into::into)
    }
}

/// Grow the region by [`CROP_MARGIN`] on each side and clamp to the
/// frame. Returns `(x, y, w, h)` of the crop, or `None` when the clamped
/// crop has no area.
fn expand_region(region: &Region, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let margin_x = (region.width() as f32 * CROP_MARGIN) as u32;
    let margin_y = (region.height() as f32 * CROP_MARGIN) as u32;

    let x = region.left.saturating_sub(margin_x).min(width);
    let y = region.top.saturating_sub(margin_y).min(height);
    let right = (region.right + margin_x).min(width);
    let bottom = (region.bottom + margin_y).min(height);

    let w = right.saturating_sub(x);
    let h = bottom.saturating_sub(y);
    if w == 0 || h == 0 {
        return None;
    }
    Some((x, y, w, h))
}

/// Normalize an interleaved RGB crop into an NCHW float tensor.
fn preprocess(crop: &[u8]) -> Array4<f32> {
    let size = ENCODE_INPUT_SIZE;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));

    for y in 0..size {
        for x in 0..size {
            for c in 0..3 {
                let pixel = crop
                    .get((y * size + x) * 3 + c)
                    .copied()
                    .unwrap_or(0) as f32;
                tensor[[0, c, y, x]] = (pixel - ENCODE_MEAN) / ENCODE_STD;
            }
        }
    }

    tensor
}
