//! Contrast-limited adaptive histogram equalization
//!
//! Tile-wise histogram equalization with a clip limit, so local
//! contrast is normalized without amplifying noise in near-uniform
//! tiles. Pixel values are remapped through the CDFs of the four
//! nearest tiles with bilinear interpolation between tile centers.

use image::{GrayImage, Luma};

/// Equalize local contrast with a per-tile clip limit.
///
/// `tile_size` is the side length of each contextual region in pixels;
/// `clip_limit` bounds how far any single tile's histogram may be
/// stretched (in multiples of the uniform bin height).
pub fn clahe(image: &GrayImage, clip_limit: f32, tile_size: u32) -> Result<GrayImage, String> {
    if tile_size == 0 {
        return Err("tile size must be positive".to_string());
    }
    if clip_limit <= 0.0 {
        return Err("clip limit must be positive".to_string());
    }
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err("empty image".to_string());
    }

    let tiles_x = width.div_ceil(tile_size) as usize;
    let tiles_y = height.div_ceil(tile_size) as usize;

    let mut cdfs: Vec<[f32; 256]> = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx as u32 * tile_size;
            let y0 = ty as u32 * tile_size;
            let x1 = (x0 + tile_size).min(width);
            let y1 = (y0 + tile_size).min(height);
            cdfs.push(tile_cdf(image, x0, y0, x1, y1, clip_limit));
        }
    }

    let mut result = GrayImage::new(width, height);
    let tile = tile_size as f32;

    for (x, y, pixel) in image.enumerate_pixels() {
        let level = pixel[0] as usize;

        // Position relative to tile centers
        let fx = (x as f32 + 0.5) / tile - 0.5;
        let fy = (y as f32 + 0.5) / tile - 0.5;
        let tx0 = (fx.floor().max(0.0) as usize).min(tiles_x - 1);
        let ty0 = (fy.floor().max(0.0) as usize).min(tiles_y - 1);
        let tx1 = (tx0 + 1).min(tiles_x - 1);
        let ty1 = (ty0 + 1).min(tiles_y - 1);
        let wx = (fx - fx.floor()).clamp(0.0, 1.0);
        let wy = (fy - fy.floor()).clamp(0.0, 1.0);

        let v00 = cdfs[ty0 * tiles_x + tx0][level];
        let v10 = cdfs[ty0 * tiles_x + tx1][level];
        let v01 = cdfs[ty1 * tiles_x + tx0][level];
        let v11 = cdfs[ty1 * tiles_x + tx1][level];

        let top = v00 * (1.0 - wx) + v10 * wx;
        let bottom = v01 * (1.0 - wx) + v11 * wx;
        let value = top * (1.0 - wy) + bottom * wy;

        result.put_pixel(x, y, Luma([(value * 255.0).clamp(0.0, 255.0) as u8]));
    }

    Ok(result)
}

/// Clipped histogram CDF for one tile.
///
/// Histogram counts above the clip limit are redistributed uniformly
/// across all bins before the CDF is accumulated.
fn tile_cdf(image: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [f32; 256] {
    let mut histogram = [0u32; 256];
    let mut count = 0u32;

    for y in y0..y1 {
        for x in x0..x1 {
            histogram[image.get_pixel(x, y)[0] as usize] += 1;
            count += 1;
        }
    }

    let mut cdf = [0.0f32; 256];
    if count == 0 {
        return cdf;
    }

    let clip_at = ((clip_limit * count as f32 / 256.0) as u32).max(1);
    let mut clipped = 0u32;
    for bin in histogram.iter_mut() {
        if *bin > clip_at {
            clipped += *bin - clip_at;
            *bin = clip_at;
        }
    }

    let spread = clipped / 256;
    let remainder = (clipped % 256) as usize;
    for (i, bin) in histogram.iter_mut().enumerate() {
        *bin += spread;
        if i < remainder {
            *bin += 1;
        }
    }

    let mut cumulative = 0u32;
    for (i, &bin) in histogram.iter().enumerate() {
        cumulative += bin;
        cdf[i] = cumulative as f32 / count as f32;
    }

    cdf
}
