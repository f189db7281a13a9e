//! Bilinear sampling over interleaved RGB buffers.

use facelab_core::Frame;

/// Resize a sub-rectangle of `frame` into a `dst_w x dst_h` interleaved
/// RGB buffer using bilinear interpolation.
///
/// The source rectangle is given in pixel coordinates and must lie within
/// the frame; callers clamp before calling.
pub fn resize_region_rgb(
    frame: &Frame,
    src_x: u32,
    src_y: u32,
    src_w: u32,
    src_h: u32,
    dst_w: u32,
    dst_h: u32,
) -> Vec<u8> {
    let mut out = vec![0u8; (dst_w * dst_h * 3) as usize];
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return out;
    }

    let fw = frame.width as usize;
    let scale_x = src_w as f32 / dst_w as f32;
    let scale_y = src_h as f32 / dst_h as f32;

    for y in 0..dst_h as usize {
        let sy = (y as f32 + 0.5) * scale_y - 0.5 + src_y as f32;
        let y0 = (sy.floor() as i64).clamp(src_y as i64, (src_y + src_h - 1) as i64) as usize;
        let y1 = (y0 + 1).min((src_y + src_h - 1) as usize);
        let fy = (sy - sy.floor()).clamp(0.0, 1.0);

        for x in 0..dst_w as usize {
            let sx = (x as f32 + 0.5) * scale_x - 0.5 + src_x as f32;
            let x0 = (sx.floor() as i64).clamp(src_x as i64, (src_x + src_w - 1) as i64) as usize;
            let x1 = (x0 + 1).min((src_x + src_w - 1) as usize);
            let fx = (sx - sx.floor()).clamp(0.0, 1.0);

            for c in 0..3 {
                let tl = frame.data[(y0 * fw + x0) * 3 + c] as f32;
                let tr = frame.data[(y0 * fw + x1) * 3 + c] as f32;
                let bl = frame.data[(y1 * fw + x0) * 3 + c] as f32;
                let br = frame.data[(y1 * fw + x1) * 3 + c] as f32;

                let val = tl * (1.0 - fx) * (1.0 - fy)
                    + tr * fx * (1.0 - fy)
                    + bl * (1.0 - fx) * fy
                    + br * fx * fy;

                out[(y * dst_w as usize + x) * 3 + c] = val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}
