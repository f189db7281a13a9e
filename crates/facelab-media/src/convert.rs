//! Raw capture buffer conversions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("buffer too short: expected {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },
}

/// Convert packed YUYV (4:2:2) to interleaved RGB using BT.601.
///
/// YUYV packs two pixels per 4 bytes: `[Y0, U, Y1, V]`, with the chroma
/// pair shared between both pixels.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ConvertError> {
    let pixels = (width as usize) * (height as usize);
    let expected = pixels * 2;
    if yuyv.len() < expected {
        return Err(ConvertError::BufferTooShort { expected, actual: yuyv.len() });
    }

    let mut rgb = Vec::with_capacity(pixels * 3);
    for group in yuyv[..expected].chunks_exact(4) {
        let u = group[1] as f32 - 128.0;
        let v = group[3] as f32 - 128.0;
        for &y in &[group[0], group[2]] {
            let y = y as f32;
            let r = y + 1.402 * v;
            let g = y - 0.344136 * u - 0.714136 * v;
            let b = y + 1.772 * u;
            rgb.push(r.round().clamp(0.0, 255.0) as u8);
            rgb.push(g.round().clamp(0.0, 255.0) as u8);
            rgb.push(b.round().clamp(0.0, 255.0) as u8);
        }
    }
    Ok(rgb)
}

/// Expand an 8-bit grayscale buffer into interleaved RGB by channel
/// replication (native output of IR cameras).
pub fn gray_to_rgb(gray: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ConvertError> {
    let pixels = (width as usize) * (height as usize);
    if gray.len() < pixels {
        return Err(ConvertError::BufferTooShort { expected: pixels, actual: gray.len() });
    }

    let mut rgb = Vec::with_capacity(pixels * 3);
    for &y in &gray[..pixels] {
        rgb.extend_from_slice(&[y, y, y]);
    }
    Ok(rgb)
}
