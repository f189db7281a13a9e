//! Frame type and the RGB/BGR channel-order boundary.

/// Interleaved channel order of a frame's pixel data.
///
/// The locator and encoder consume RGB; the presentation side consumes
/// BGR. Every crossing between the two goes through [`Frame::into_order`]
/// so the conversion is a single explicit, tested step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// A decoded 8-bit color frame, 3 bytes per pixel.
#[derive(Clone)]
pub struct Frame {
    /// Interleaved pixel data (`width * height * 3` bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub order: ChannelOrder,
}

impl Frame {
    /// Construct a frame, checking the buffer length against the dimensions.
    pub fn new(data: Vec<u8>, width: u32, height: u32, order: ChannelOrder) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) * 3 {
            return None;
        }
        Some(Self { data, width, height, order })
    }

    /// Convert to the requested channel order, swapping the first and
    /// third byte of every pixel when the order actually changes.
    pub fn into_order(mut self, order: ChannelOrder) -> Frame {
        if self.order != order {
            for px in self.data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            self.order = order;
        }
        self
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}
