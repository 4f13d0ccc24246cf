//! Image preparation ahead of contour extraction.
//!
//! The contour detectors share the same skeleton — binarize, clean up, trace
//! boundaries — and differ in how aggressively the input is prepared. This
//! module provides the building blocks: grayscale conversion, Gaussian blur,
//! tiled local contrast equalization, adaptive local-mean thresholding, and
//! morphological cleanup with a resolution-scaled kernel.

use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology;

/// Converts an RGB frame to single-channel intensity.
pub fn to_grayscale(frame: &RgbImage) -> GrayImage {
    image::imageops::grayscale(frame)
}

/// Applies a Gaussian blur to suppress scanner noise before thresholding.
pub fn blur(gray: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(gray, sigma)
}

/// Localized histogram equalization over a grid of tiles.
///
/// Each tile gets its own clipped-histogram equalization mapping, and every
/// pixel is remapped by bilinearly blending the mappings of the four nearest
/// tiles. This lifts local texture out of low-contrast scans where the photo
/// and the background share a similar overall brightness. The clip limit
/// bounds how steep any tile's mapping can become, expressed as a multiple of
/// the mean histogram bin height.
pub fn equalize_local_contrast(gray: &GrayImage, grid: u32, clip_limit: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tiles_x = grid.max(1).min(width);
    let tiles_y = grid.max(1).min(height);
    let tile_w = width.div_ceil(tiles_x);
    let tile_h = height.div_ceil(tiles_y);

    // Per-tile remapping tables
    let mut luts = vec![[0u8; 256]; (tiles_x * tiles_y) as usize];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);

            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[gray.get_pixel(x, y)[0] as usize] += 1;
                }
            }
            let count = (x1 - x0) * (y1 - y0);

            // Clip the histogram and spread the excess across all bins
            let clip = (clip_limit * count as f32 / 256.0).max(1.0) as u32;
            let mut excess = 0u32;
            for bin in hist.iter_mut() {
                if *bin > clip {
                    excess += *bin - clip;
                    *bin = clip;
                }
            }
            let bonus = excess / 256;
            let remainder = excess % 256;
            for (i, bin) in hist.iter_mut().enumerate() {
                *bin += bonus + u32::from((i as u32) < remainder);
            }

            let lut = &mut luts[(ty * tiles_x + tx) as usize];
            let mut cdf = 0u32;
            for (value, bin) in hist.iter().enumerate() {
                cdf += bin;
                lut[value] = ((cdf as f32 / count as f32) * 255.0).round().min(255.0) as u8;
            }
        }
    }

    let tile_at = |tx: i64, ty: i64| -> &[u8; 256] {
        let cx = tx.clamp(0, tiles_x as i64 - 1) as u32;
        let cy = ty.clamp(0, tiles_y as i64 - 1) as u32;
        &luts[(cy * tiles_x + cx) as usize]
    };

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let value = gray.get_pixel(x, y)[0] as usize;

            // Position relative to tile centers; border pixels replicate the
            // edge tile's mapping
            let gx = (x as f32 + 0.5) / tile_w as f32 - 0.5;
            let gy = (y as f32 + 0.5) / tile_h as f32 - 0.5;
            let tx0 = gx.floor() as i64;
            let ty0 = gy.floor() as i64;
            let fx = gx - tx0 as f32;
            let fy = gy - ty0 as f32;

            let v00 = tile_at(tx0, ty0)[value] as f32;
            let v10 = tile_at(tx0 + 1, ty0)[value] as f32;
            let v01 = tile_at(tx0, ty0 + 1)[value] as f32;
            let v11 = tile_at(tx0 + 1, ty0 + 1)[value] as f32;

            let top = v00 * (1.0 - fx) + v10 * fx;
            let bottom = v01 * (1.0 - fx) + v11 * fx;
            let blended = top * (1.0 - fy) + bottom * fy;

            out.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
    }

    out
}

/// Binarizes an image against its local-mean neighborhood.
///
/// A pixel becomes foreground (255) when it is darker than the mean of the
/// `(2 * block_radius + 1)²` window around it by at least `offset`; scanned
/// photos read darker than the scanner-bed background around them. The window
/// is clamped at the frame edges. The local mean is computed through an
/// integral image, so the cost is independent of the window size.
pub fn adaptive_mean_threshold(gray: &GrayImage, block_radius: u32, offset: i16) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    // integral[(y + 1) * stride + (x + 1)] holds the sum over [0..=x, 0..=y]
    let stride = width as usize + 1;
    let mut integral = vec![0u64; stride * (height as usize + 1)];
    let raw = gray.as_raw();
    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += raw[y * width as usize + x] as u64;
            integral[(y + 1) * stride + (x + 1)] = integral[y * stride + (x + 1)] + row_sum;
        }
    }

    let radius = block_radius as i64;
    let mut out = GrayImage::new(width, height);
    for y in 0..height as i64 {
        let y0 = (y - radius).max(0) as usize;
        let y1 = (y + radius + 1).min(height as i64) as usize;
        for x in 0..width as i64 {
            let x0 = (x - radius).max(0) as usize;
            let x1 = (x + radius + 1).min(width as i64) as usize;

            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let count = ((x1 - x0) * (y1 - y0)) as u64;
            let mean = (sum / count) as i32;

            let pixel = raw[y as usize * width as usize + x as usize] as i32;
            let value = if pixel <= mean - offset as i32 { 255 } else { 0 };
            out.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }

    out
}

/// Morphological close followed by open with a square kernel of the given
/// radius, filling small gaps in foreground regions and then removing
/// isolated specks.
pub fn close_then_open(mask: &GrayImage, radius: u8) -> GrayImage {
    let closed = morphology::close(mask, Norm::LInf, radius);
    morphology::open(&closed, Norm::LInf, radius)
}

/// Derives a morphology kernel radius from the frame resolution.
///
/// The radius scales with the shorter frame dimension so that small previews
/// and high-DPI scans both get proportionate noise suppression, clamped to
/// the given inclusive bounds.
pub fn adaptive_kernel_radius(width: u32, height: u32, fraction: f32, bounds: (u8, u8)) -> u8 {
    let shorter = width.min(height) as f32;
    let radius = (shorter * fraction).round() as i64;
    radius.clamp(bounds.0 as i64, bounds.1 as i64) as u8
}
