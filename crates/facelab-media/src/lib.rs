//! facelab-media — frame sources and sinks.
//!
//! Still-image loading via the `image` crate, live capture via V4L2, a
//! directory-of-frames source for file-backed streams, and a PNG sink
//! for annotated output.

pub mod camera;
pub mod convert;
pub mod loader;
pub mod sink;
pub mod source;

pub use camera::{CameraError, CameraSource};
pub use loader::{load_image, ImageError};
pub use sink::{save_frame, PngSink, SinkError};
pub use source::FrameDirSource;
