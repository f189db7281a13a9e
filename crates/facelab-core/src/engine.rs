//! Recognition engine: locate → encode → match → annotate.
//!
//! The engine owns its locator and encoder instances and the known-face
//! store; all three are injected at construction. No process-global state.

use crate::annotate::{draw_face_label, LabelFont};
use crate::frame::{ChannelOrder, Frame};
use crate::matcher::{FirstMatchMatcher, Matcher, MATCH_THRESHOLD};
use crate::store::{KnownFaceStore, StoreError};
use crate::types::{Embedding, FaceMatch, Region};
use image::RgbImage;
use thiserror::Error;

/// Label assigned when no stored entry matches within threshold.
pub const UNKNOWN_LABEL: &str = "Unknown";

pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Locates face regions in an RGB frame, in detector order.
pub trait FaceLocator {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<Region>, BoxedError>;
}

/// Produces one fixed-length embedding for one located region.
///
/// The convention is pinned: the caller locates first and passes exactly
/// one region per call.
pub trait FaceEncoder {
    fn encode(&mut self, frame: &Frame, region: &Region) -> Result<Embedding, BoxedError>;
}

/// Pull-based frame stream. `Ok(None)` signals end-of-stream. Resource
/// release happens in the implementation's `Drop`, so it runs on every
/// exit path of the consuming loop.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, BoxedError>;
}

/// Consumes annotated BGR frames.
pub trait Presenter {
    fn present(&mut self, frame: &Frame) -> Result<(), BoxedError>;

    /// Cooperative cancellation, polled once per frame after `present`.
    fn should_stop(&mut self) -> bool {
        false
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("no face found in image")]
    NoFaceFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("face locator failed: {0}")]
    Locate(#[source] BoxedError),
    #[error("face encoder failed: {0}")]
    Encode(#[source] BoxedError),
    #[error("frame source failed: {0}")]
    Source(#[source] BoxedError),
    #[error("presenter failed: {0}")]
    Present(#[source] BoxedError),
    #[error("frame buffer does not match its dimensions")]
    InvalidFrame,
}

/// Orchestrates the enrollment and recognition workflows.
pub struct RecognitionEngine<L, E> {
    locator: L,
    encoder: E,
    store: KnownFaceStore,
    threshold: f32,
    font: Option<LabelFont>,
}

impl<L: FaceLocator, E: FaceEncoder> RecognitionEngine<L, E> {
    pub fn new(locator: L, encoder: E, store: KnownFaceStore) -> Self {
        Self { locator, encoder, store, threshold: MATCH_THRESHOLD, font: None }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_font(mut self, font: LabelFont) -> Self {
        self.font = Some(font);
        self
    }

    pub fn store(&self) -> &KnownFaceStore {
        &self.store
    }

    /// Enroll one face from `frame` under `name`.
    ///
    /// Zero located faces fails with [`EngineError::NoFaceFound`] and
    /// leaves the store untouched. With multiple faces the first region
    /// in detector order is taken; that order is deterministic for a
    /// given detector but not guaranteed stable across detector versions.
    pub fn enroll(&mut self, frame: Frame, name: &str) -> Result<(), EngineError> {
        if name.trim().is_empty() {
            return Err(EngineError::EmptyName);
        }

        let frame = frame.into_order(ChannelOrder::Rgb);
        let regions = self.locator.locate(&frame).map_err(EngineError::Locate)?;

        let Some(region) = regions.first() else {
            return Err(EngineError::NoFaceFound);
        };
        if regions.len() > 1 {
            tracing::debug!(faces = regions.len(), "multiple faces; enrolling the first");
        }

        let embedding = self
            .encoder
            .encode(&frame, region)
            .map_err(EngineError::Encode)?;
        self.store.append(name, embedding)?;
        Ok(())
    }

    /// Locate, encode and label every face in `frame`.
    ///
    /// Zero faces is a normal outcome and yields an empty list. Each
    /// located face is matched against the store independently.
    pub fn label_faces(&mut self, frame: &Frame) -> Result<Vec<FaceMatch>, EngineError> {
        debug_assert_eq!(frame.order, ChannelOrder::Rgb);

        let regions = self.locator.locate(frame).map_err(EngineError::Locate)?;
        let mut labeled = Vec::with_capacity(regions.len());

        for region in regions {
            let embedding = self
                .encoder
                .encode(frame, &region)
                .map_err(EngineError::Encode)?;
            let name = match FirstMatchMatcher.first_match(
                &embedding,
                self.store.entries(),
                self.threshold,
            ) {
                Some(idx) => self.store.entries()[idx].name.clone(),
                None => UNKNOWN_LABEL.to_string(),
            };
            labeled.push(FaceMatch { region, name });
        }

        tracing::debug!(faces = labeled.len(), "labeled frame");
        Ok(labeled)
    }

    /// Turn a frame into an annotated frame in display (BGR) order.
    pub fn recognize(&mut self, frame: Frame) -> Result<Frame, EngineError> {
        let frame = frame.into_order(ChannelOrder::Rgb);
        let faces = self.label_faces(&frame)?;

        let (width, height) = (frame.width, frame.height);
        let mut img = RgbImage::from_raw(width, height, frame.data)
            .ok_or(EngineError::InvalidFrame)?;
        for face in &faces {
            draw_face_label(&mut img, face, self.font.as_ref());
        }

        let annotated = Frame {
            data: img.into_raw(),
            width,
            height,
            order: ChannelOrder::Rgb,
        };
        Ok(annotated.into_order(ChannelOrder::Bgr))
    }

    /// Recognize frames from `source` until end-of-stream or until the
    /// presenter signals stop.
    ///
    /// The source handle itself is released by its `Drop`, which the
    /// caller's scope guarantees on every exit path, including errors
    /// propagated from here.
    pub fn run_stream<S: FrameSource, P: Presenter>(
        &mut self,
        source: &mut S,
        presenter: &mut P,
    ) -> Result<(), EngineError> {
        let mut frames = 0usize;
        loop {
            let Some(frame) = source.next_frame().map_err(EngineError::Source)? else {
                tracing::info!(frames, "stream ended");
                return Ok(());
            };

            let annotated = self.recognize(frame)?;
            presenter.present(&annotated).map_err(EngineError::Present)?;
            frames += 1;

            if presenter.should_stop() {
                tracing::info!(frames, "stream cancelled");
                return Ok(());
            }
        }
    }
}
