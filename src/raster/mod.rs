//! Stroke rasterization
//!
//! Draws normalized strokes onto a white grayscale canvas as straight
//! line segments. Without a true anti-aliased line primitive, a
//! multi-pass mode redraws each segment at small vertical offsets to
//! approximate a thicker, smoother stroke; supersampling renders at a
//! multiple of the target size and downsamples with Lanczos before
//! handing the image to the next stage.

use image::{imageops, GrayImage, Luma};
use imageproc::drawing::draw_line_segment_mut;
use tracing::debug;

use crate::config::CanvasProfile;
use crate::ink::{Stroke, StrokeSet};

const BACKGROUND: u8 = 255;
const INK: u8 = 0;

/// Rasterize a normalized stroke set into a freshly allocated canvas.
///
/// The caller owns the returned image. Segments are only drawn between
/// consecutive points within a stroke; strokes are never connected to
/// each other.
pub fn rasterize(strokes: &StrokeSet, profile: &CanvasProfile) -> GrayImage {
    let factor = profile.supersample.max(1);
    let render_w = profile.width * factor;
    let render_h = profile.height * factor;

    let mut canvas = GrayImage::from_pixel(render_w, render_h, Luma([BACKGROUND]));

    for stroke in strokes.strokes() {
        draw_stroke(&mut canvas, stroke, profile.line_passes, factor);
    }

    if factor > 1 {
        debug!(
            "Downsampling {}x{} render to {}x{}",
            render_w, render_h, profile.width, profile.height
        );
        canvas = imageops::resize(
            &canvas,
            profile.width,
            profile.height,
            imageops::FilterType::Lanczos3,
        );
    }

    canvas
}

/// Draw one stroke as segments between consecutive points.
///
/// `passes` vertical offsets are consecutive and centered on zero
/// (3 passes draws at -1/0/+1), forming a contiguous band at render
/// resolution.
fn draw_stroke(canvas: &mut GrayImage, stroke: &Stroke, passes: u32, factor: u32) {
    let passes = passes.max(1) as i32;
    let points = stroke.points();

    for pair in points.windows(2) {
        for pass in 0..passes {
            let offset = (pass - (passes - 1) / 2) as f32;
            draw_line_segment_mut(
                canvas,
                (
                    (pair[0].x * factor as f64) as f32,
                    (pair[0].y * factor as f64) as f32 + offset,
                ),
                (
                    (pair[1].x * factor as f64) as f32,
                    (pair[1].y * factor as f64) as f32 + offset,
                ),
                Luma([INK]),
            );
        }
    }
}
