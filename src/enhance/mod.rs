//! Image enhancement pipeline
//!
//! A fixed ordered sequence of transforms between the rasterizer and
//! the recognition gateway: rotation correction, edge-preserving
//! denoising, grayscale normalization, local contrast equalization,
//! adaptive binarization and morphological cleanup.
//!
//! Enhancement is best-effort. Every stage returns a result; on
//! failure the driver logs a warning and passes the stage's input
//! through unchanged, so a pipeline that cannot enhance still hands
//! the engine something to recognize. Output dimensions always equal
//! input dimensions.
//!
//! Polarity convention: binarization produces ink-as-white on black
//! and morphology operates on that; the image is re-inverted exactly
//! once at the end because the engine expects dark text on a light
//! background.

pub mod clahe;
pub mod skew;

pub use skew::estimate_skew;

use image::{imageops, GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::{bilateral_filter, median_filter};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::morphology::{close, open};
use tracing::{debug, warn};

use crate::config::EnhanceConfig;

const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

/// Run the full enhancement sequence over an owned raster.
///
/// `angle` is the skew correction in degrees (0 = none). The returned
/// image has the same dimensions as the input and dark ink on a light
/// background, ready for the recognition gateway.
pub fn enhance(image: GrayImage, angle: f64, config: &EnhanceConfig) -> GrayImage {
    let image = run_stage("rotate", image, |img| rotate_stage(img, angle));
    let image = run_stage("denoise", image, |img| denoise_stage(img, config));
    let image = run_stage("grayscale", image, grayscale_stage);
    let image = run_stage("contrast", image, |img| {
        clahe::clahe(img, config.clahe_clip_limit, config.clahe_tile_size)
    });

    let (image, binarized) = run_flagged_stage("binarize", image, |img| {
        binarize_stage(img, config)
    });
    if !binarized {
        // Morphology is defined on the binarized ink-white image; with
        // binarization fallen back the grayscale raster goes to the
        // engine as-is.
        warn!("Binarization fell back; skipping morphological cleanup");
        return image;
    }

    let mut image = run_stage("morphology", image, morphology_stage);
    imageops::invert(&mut image);
    image
}

/// Apply one stage, falling back to the unmodified input on failure.
fn run_stage<F>(name: &str, input: GrayImage, stage: F) -> GrayImage
where
    F: FnOnce(&GrayImage) -> Result<GrayImage, String>,
{
    run_flagged_stage(name, input, stage).0
}

fn run_flagged_stage<F>(name: &str, input: GrayImage, stage: F) -> (GrayImage, bool)
where
    F: FnOnce(&GrayImage) -> Result<GrayImage, String>,
{
    match stage(&input) {
        Ok(output) if output.dimensions() == input.dimensions() => {
            debug!(stage = name, "Enhancement stage complete");
            (output, true)
        }
        Ok(output) => {
            warn!(
                stage = name,
                expected = ?input.dimensions(),
                got = ?output.dimensions(),
                "Stage changed dimensions; passing input through unchanged"
            );
            (input, false)
        }
        Err(reason) => {
            warn!(
                stage = name,
                %reason,
                "Stage failed; passing input through unchanged"
            );
            (input, false)
        }
    }
}

/// Rotate about the image center, preserving canvas size, bilinear
/// interpolation, white fill.
fn rotate_stage(input: &GrayImage, angle: f64) -> Result<GrayImage, String> {
    if !angle.is_finite() {
        return Err(format!("non-finite rotation angle {angle}"));
    }
    if angle == 0.0 {
        return Ok(input.clone());
    }
    Ok(rotate_about_center(
        input,
        angle.to_radians() as f32,
        Interpolation::Bilinear,
        Luma([255]),
    ))
}

/// Edge-preserving smoothing followed by a small median filter for
/// impulse noise.
fn denoise_stage(input: &GrayImage, config: &EnhanceConfig) -> Result<GrayImage, String> {
    if config.bilateral_window == 0 {
        return Err("bilateral window must be positive".to_string());
    }
    let smoothed = bilateral_filter(
        input,
        config.bilateral_window,
        config.bilateral_sigma_color,
        config.bilateral_sigma_spatial,
    );
    Ok(median_filter(
        &smoothed,
        config.median_radius,
        config.median_radius,
    ))
}

/// The raster is single-channel from the rasterizer onward; the luma
/// collapse is already done and this stage passes the buffer through.
fn grayscale_stage(input: &GrayImage) -> Result<GrayImage, String> {
    Ok(input.clone())
}

/// Adaptive threshold from the local neighborhood mean, inverted so
/// ink becomes the white foreground for morphological processing.
fn binarize_stage(input: &GrayImage, config: &EnhanceConfig) -> Result<GrayImage, String> {
    let (width, height) = input.dimensions();
    if width == 0 || height == 0 {
        return Err("empty image".to_string());
    }

    let integral = integral_image(input);
    let radius = config.threshold_block_radius as i64;
    let mut output = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mean = window_mean(&integral, width, height, x as i64, y as i64, radius);
            let threshold = (mean - config.threshold_offset as f64).clamp(0.0, 255.0);
            let value = if (input.get_pixel(x, y)[0] as f64) < threshold {
                FOREGROUND
            } else {
                BACKGROUND
            };
            output.put_pixel(x, y, Luma([value]));
        }
    }

    Ok(output)
}

/// Closing then opening with a small structuring element. Closing runs
/// first so thin strokes survive the speck-removing opening.
fn morphology_stage(input: &GrayImage) -> Result<GrayImage, String> {
    let closed = close(input, Norm::LInf, 1);
    Ok(open(&closed, Norm::LInf, 1))
}

/// Summed-area table with a one-cell border, for O(1) window sums.
fn integral_image(image: &GrayImage) -> Vec<u64> {
    let (width, height) = image.dimensions();
    let stride = width as usize + 1;
    let mut integral = vec![0u64; stride * (height as usize + 1)];

    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += image.get_pixel(x as u32, y as u32)[0] as u64;
            integral[(y + 1) * stride + (x + 1)] = integral[y * stride + (x + 1)] + row_sum;
        }
    }

    integral
}

fn window_mean(integral: &[u64], width: u32, height: u32, x: i64, y: i64, radius: i64) -> f64 {
    let stride = width as i64 + 1;
    let x0 = (x - radius).max(0);
    let y0 = (y - radius).max(0);
    let x1 = (x + radius + 1).min(width as i64);
    let y1 = (y + radius + 1).min(height as i64);

    let sum = integral[(y1 * stride + x1) as usize] + integral[(y0 * stride + x0) as usize]
        - integral[(y0 * stride + x1) as usize]
        - integral[(y1 * stride + x0) as usize];
    let area = ((x1 - x0) * (y1 - y0)) as f64;

    sum as f64 / area
}
