//! facelab-core — Known-face registry and recognition workflow.
//!
//! Owns the JSON-backed known-face store, the threshold matching policy,
//! and the recognition engine that turns frames into labeled frames.
//! Face location and embedding extraction are consumed through traits;
//! the ONNX-backed implementations live in `facelab-vision`.

pub mod annotate;
pub mod engine;
pub mod frame;
pub mod matcher;
pub mod store;
pub mod types;

pub use annotate::LabelFont;
pub use engine::{
    BoxedError, EngineError, FaceEncoder, FaceLocator, FrameSource, Presenter,
    RecognitionEngine, UNKNOWN_LABEL,
};
pub use frame::{ChannelOrder, Frame};
pub use matcher::{FirstMatchMatcher, Matcher, MATCH_THRESHOLD};
pub use store::{KnownFaceStore, StoreError};
pub use types::{Embedding, FaceMatch, KnownFaceEntry, Region};
