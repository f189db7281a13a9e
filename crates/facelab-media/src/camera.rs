//! V4L2 camera capture via the `v4l` crate.

use crate::convert;
use facelab_core::{BoxedError, ChannelOrder, Frame, FrameSource};
use std::path::Path;
use thiserror::Error;
use v4l::buffer::Type as BufType;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("cannot open camera {0}: device not found")]
    DeviceNotFound(String),
    #[error("cannot open camera {0}: device busy")]
    DeviceBusy(String),
    #[error("cannot open camera {0}: {1}")]
    OpenFailed(String, String),
    #[error("format negotiation failed: {0}")]
    FormatNegotiationFailed(String),
    #[error("capture failed: {0}")]
    CaptureFailed(String),
}

/// Negotiated pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelFormat {
    /// YUYV 4:2:2 packed, 2 bytes/pixel.
    Yuyv,
    /// 8-bit grayscale, 1 byte/pixel (IR cameras).
    Grey,
}

/// Live camera frame source.
///
/// The device handle is released when the source is dropped, so wrapping
/// the streaming loop in a scope guarantees release on every exit path.
pub struct CameraSource {
    device: Device,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
}

impl CameraSource {
    /// Open a V4L2 device by path (e.g., "/dev/video0") and negotiate a
    /// capture format. Fails without any partial processing when the
    /// device is absent, busy, or speaks no supported format.
    pub fn open(device_path: &str) -> Result<Self, CameraError> {
        if !Path::new(device_path).exists() {
            return Err(CameraError::DeviceNotFound(device_path.to_string()));
        }

        let device = Device::with_path(device_path).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("busy") || msg.contains("EBUSY") {
                CameraError::DeviceBusy(device_path.to_string())
            } else {
                CameraError::OpenFailed(device_path.to_string(), msg)
            }
        })?;

        let caps = device
            .query_caps()
            .map_err(|e| CameraError::OpenFailed(device_path.to_string(), e.to_string()))?;
        if !caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE) {
            return Err(CameraError::FormatNegotiationFailed(
                "device does not support video capture".to_string(),
            ));
        }

        tracing::info!(device = device_path, driver = %caps.driver, card = %caps.card, "opened camera");

        let mut fmt = device.format().map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to get format: {e}"))
        })?;
        fmt.fourcc = FourCC::new(b"YUYV");
        fmt.width = 640;
        fmt.height = 480;

        let negotiated = device.set_format(&fmt).map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to set format: {e}"))
        })?;

        let pixel_format = if negotiated.fourcc == FourCC::new(b"YUYV") {
            PixelFormat::Yuyv
        } else if negotiated.fourcc == FourCC::new(b"GREY") {
            PixelFormat::Grey
        } else {
            return Err(CameraError::FormatNegotiationFailed(format!(
                "unsupported pixel format: {:?} (need YUYV or GREY)",
                negotiated.fourcc
            )));
        };

        tracing::info!(
            width = negotiated.width,
            height = negotiated.height,
            fourcc = ?negotiated.fourcc,
            "negotiated format"
        );

        Ok(Self {
            device,
            width: negotiated.width,
            height: negotiated.height,
            pixel_format,
        })
    }

    /// Capture one frame and convert it to RGB.
    pub fn capture(&self) -> Result<Frame, CameraError> {
        let mut stream =
            MmapStream::with_buffers(&self.device, BufType::VideoCapture, 4).map_err(|e| {
                CameraError::CaptureFailed(format!("failed to create mmap stream: {e}"))
            })?;

        let (buf, _meta) = stream
            .next()
            .map_err(|e| CameraError::CaptureFailed(format!("failed to dequeue buffer: {e}")))?;

        let rgb = match self.pixel_format {
            PixelFormat::Yuyv => convert::yuyv_to_rgb(buf, self.width, self.height),
            PixelFormat::Grey => convert::gray_to_rgb(buf, self.width, self.height),
        }
        .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

        Frame::new(rgb, self.width, self.height, ChannelOrder::Rgb)
            .ok_or_else(|| CameraError::CaptureFailed("converted buffer has wrong size".into()))
    }
}

impl FrameSource for CameraSource {
    /// A live camera never signals end-of-stream; the loop ends via the
    /// presenter's cancellation hook.
    fn next_frame(&mut self) -> Result<Option<Frame>, BoxedError> {
        self.capture().map(Some).map_err(Into::into)
    }
}
