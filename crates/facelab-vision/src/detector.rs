//! ONNX face locator.
//!
//! Runs a detection model that emits an `(N, 5)` tensor of
//! `[x1, y1, x2, y2, score]` rows in input-tensor pixel space, then
//! thresholds, de-letterboxes and NMS-filters the rows into `Region`s.

use crate::resize::resize_region_rgb;
use facelab_core::{BoxedError, ChannelOrder, FaceLocator, Frame, Region};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const DETECT_INPUT_SIZE: usize = 320;
const DETECT_MEAN: f32 = 127.5;
const DETECT_STD: f32 = 128.0;
const DETECT_SCORE_THRESHOLD: f32 = 0.5;
const DETECT_NMS_IOU: f32 = 0.4;
/// Floats per output row: x1, y1, x2, y2, score.
const ROW_LEN: usize = 5;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("detection model not found: {0}")]
    ModelNotFound(String),
    #[error("detection inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Coordinate mapping metadata for the letterbox resize.
struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

/// One raw detection in source-frame pixel space.
#[derive(Debug, Clone, Copy)]
struct Detection {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    score: f32,
}

/// ONNX-backed face locator.
pub struct OnnxFaceLocator {
    session: Session,
    input_size: usize,
}

impl OnnxFaceLocator {
    /// Load the detection model, failing fast when the file is absent.
    pub fn load(model_path: &str) -> Result<Self, DetectorError> {
        if !Path::new(model_path).exists() {
            return Err(DetectorError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| i.name()).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded detection model"
        );

        Ok(Self { session, input_size: DETECT_INPUT_SIZE })
    }

    /// Detect faces in an RGB frame, returning regions sorted by
    /// descending score.
    pub fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, DetectorError> {
        debug_assert_eq!(frame.order, ChannelOrder::Rgb);

        let (input, letterbox) = self.preprocess(frame);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, rows) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectorError::InferenceFailed(format!("detections: {e}")))?;

        if rows.len() % ROW_LEN != 0 {
            return Err(DetectorError::InferenceFailed(format!(
                "output length {} is not a multiple of {ROW_LEN}",
                rows.len()
            )));
        }

        let mut detections = Vec::new();
        for row in rows.chunks_exact(ROW_LEN) {
            let score = row[4];
            if score <= DETECT_SCORE_THRESHOLD {
                continue;
            }
            // Map from letterboxed tensor space back to frame space.
            detections.push(Detection {
                x1: (row[0] - letterbox.pad_x) / letterbox.scale,
                y1: (row[1] - letterbox.pad_y) / letterbox.scale,
                x2: (row[2] - letterbox.pad_x) / letterbox.scale,
                y2: (row[3] - letterbox.pad_y) / letterbox.scale,
                score,
            });
        }

        let kept = nms(detections, DETECT_NMS_IOU);
        tracing::debug!(faces = kept.len(), "detection complete");

        Ok(kept
            .into_iter()
            .filter_map(|d| to_region(&d, frame.width, frame.height))
            .collect())
    }

    /// Letterbox-resize the frame into a normalized NCHW tensor, padding
    /// with the mean so padding normalizes to zero.
    fn preprocess(&self, frame: &Frame) -> (Array4<f32>, Letterbox) {
        let size = self.input_size;
        let scale_w = size as f32 / frame.width as f32;
        let scale_h = size as f32 / frame.height as f32;
        let scale = scale_w.min(scale_h);

        let new_w = ((frame.width as f32 * scale).round() as usize).clamp(1, size);
        let new_h = ((frame.height as f32 * scale).round() as usize).clamp(1, size);
        let pad_x = (size - new_w) as f32 / 2.0;
        let pad_y = (size - new_h) as f32 / 2.0;

        let resized = resize_region_rgb(
            frame,
            0,
            0,
            frame.width,
            frame.height,
            new_w as u32,
            new_h as u32,
        );

        let x_start = pad_x.floor() as usize;
        let y_start = pad_y.floor() as usize;

        let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
        for y in 0..size {
            for x in 0..size {
                for c in 0..3 {
                    let pixel = if y >= y_start
                        && y < y_start + new_h
                        && x >= x_start
                        && x < x_start + new_w
                    {
                        resized[((y - y_start) * new_w + (x - x_start)) * 3 + c] as f32
                    } else {
                        DETECT_MEAN
                    };
                    tensor[[0, c, y, x]] = (pixel - DETECT_MEAN) / DETECT_STD;
                }
            }
        }

        (tensor, Letterbox { scale, pad_x, pad_y })
    }
}

impl FaceLocator for OnnxFaceLocator {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<Region>, BoxedError> {
        self.detect(frame).map_err(Into::into)
    }
}

/// Clamp a detection to the frame and convert to an integer `Region`.
/// Detections degenerate after clamping are dropped.
fn to_region(det: &Detection, width: u32, height: u32) -> Option<Region> {
    let left = det.x1.round().clamp(0.0, width as f32) as u32;
    let top = det.y1.round().clamp(0.0, height as f32) as u32;
    let right = det.x2.round().clamp(0.0, width as f32) as u32;
    let bottom = det.y2.round().clamp(0.0, height as f32) as u32;

    if right <= left || bottom <= top {
        return None;
    }
    Some(Region { top, right, bottom, left })
}

/// Non-maximum suppression over raw detections, highest score first.
fn nms(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<Detection> = Vec::new();
    for det in detections {
        if keep.iter().all(|k| iou(k, &det) <= iou_threshold) {
            keep.push(det);
        }
    }
    keep
}

fn iou(a: &Detection, b: &Detection) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let area_a = (a.x2 - a.x1).max(0.0) * (a.y2 - a.y1).max(0.0);
    let area_b = (b.x2 - b.x1).max(0.0) * (b.y2 - b.y1).max(0.0);
    let union = area_a + area_b - inter;

    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}
