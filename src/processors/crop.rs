//! Rotated-crop extraction.
//!
//! Maps a rotated rectangle to an axis-aligned output buffer by inverse
//! mapping: every output pixel is rotated back into the source frame through
//! the same rotation convention the rest of the crate uses, and sampled with
//! bilinear interpolation. Samples that fall outside the frame produce white,
//! the color of an empty scanner bed, so boxes that a user has dragged past
//! the frame edge crop cleanly instead of failing.

use crate::core::errors::{SplitError, SplitResult};
use crate::domain::region::PhotoRegion;
use crate::processors::geometry::rotate_offset;
use image::{Rgb, RgbImage};
use rayon::prelude::*;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Upper bound on either output dimension, guarding against boxes whose
/// extents would allocate an absurd buffer.
const MAX_OUTPUT_SIDE: i64 = 65_536;

/// Extracts the content of a rotated rectangle as an axis-aligned image of
/// exactly `round(width) × round(height)` pixels.
///
/// # Errors
///
/// Returns `SplitError::InvalidBox` if either extent is non-positive (or
/// rounds to zero), before any pixel access. Boxes partially or fully outside
/// the frame are not an error; out-of-frame samples are filled with white.
pub fn extract_rotated(frame: &RgbImage, region: &PhotoRegion) -> SplitResult<RgbImage> {
    if region.width <= 0.0 || region.height <= 0.0 {
        return Err(SplitError::invalid_box(format!(
            "region {} has degenerate extent {}x{}",
            region.id, region.width, region.height
        )));
    }

    let out_w = region.width.round() as i64;
    let out_h = region.height.round() as i64;
    if out_w < 1 || out_h < 1 {
        return Err(SplitError::invalid_box(format!(
            "region {} rounds to an empty output ({}x{})",
            region.id, out_w, out_h
        )));
    }
    if out_w > MAX_OUTPUT_SIDE || out_h > MAX_OUTPUT_SIDE {
        return Err(SplitError::invalid_box(format!(
            "region {} output {}x{} exceeds the supported size",
            region.id, out_w, out_h
        )));
    }

    let out_w = out_w as u32;
    let out_h = out_h as u32;
    let half_w = out_w as f32 / 2.0;
    let half_h = out_h as f32 / 2.0;
    let center = region.center;
    let angle = region.angle;

    let mut output = RgbImage::new(out_w, out_h);
    let buffer: &mut [u8] = output.as_mut();

    buffer
        .par_chunks_mut((out_w * 3) as usize)
        .enumerate()
        .for_each(|(v, row)| {
            let dy = v as f32 + 0.5 - half_h;
            for u in 0..out_w {
                let dx = u as f32 + 0.5 - half_w;
                let src = rotate_offset(center, dx, dy, angle);
                // Convert from continuous frame coordinates to the
                // pixel-center grid before sampling
                let pixel = sample_bilinear(frame, src.x - 0.5, src.y - 0.5);
                let index = (u * 3) as usize;
                row[index..index + 3].copy_from_slice(&pixel.0);
            }
        });

    Ok(output)
}

/// Samples a pixel at fractional pixel-grid coordinates with bilinear
/// interpolation. Coordinates within half a pixel of the frame edge replicate
/// the edge pixel; anything further out is background.
fn sample_bilinear(frame: &RgbImage, sx: f32, sy: f32) -> Rgb<u8> {
    let (width, height) = frame.dimensions();
    let max_x = (width - 1) as f32;
    let max_y = (height - 1) as f32;

    if sx < -0.5 || sy < -0.5 || sx > max_x + 0.5 || sy > max_y + 0.5 {
        return BACKGROUND;
    }

    let sx = sx.clamp(0.0, max_x);
    let sy = sy.clamp(0.0, max_y);

    let x1 = sx.floor() as u32;
    let y1 = sy.floor() as u32;
    let x2 = (x1 + 1).min(width - 1);
    let y2 = (y1 + 1).min(height - 1);

    let dx = sx - x1 as f32;
    let dy = sy - y1 as f32;

    let p11 = frame.get_pixel(x1, y1);
    let p12 = frame.get_pixel(x1, y2);
    let p21 = frame.get_pixel(x2, y1);
    let p22 = frame.get_pixel(x2, y2);

    let mut result = [0u8; 3];
    for (i, channel) in result.iter_mut().enumerate() {
        let value = (1.0 - dx) * (1.0 - dy) * p11.0[i] as f32
            + dx * (1.0 - dy) * p21.0[i] as f32
            + (1.0 - dx) * dy * p12.0[i] as f32
            + dx * dy * p22.0[i] as f32;
        *channel = value.round().clamp(0.0, 255.0) as u8;
    }

    Rgb(result)
}
