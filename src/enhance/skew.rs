//! Skew estimation
//!
//! Detects the dominant baseline tilt of rasterized ink so that
//! recognition is insensitive to the angle the text was drawn at.
//! Edge pixels vote in a Hough accumulator; the median of the
//! surviving candidate angles (robust against outlier strokes) is
//! negated to give the correction to apply.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::hough::{detect_lines, LineDetectionOptions};
use tracing::debug;

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;

/// Estimate the rotation (degrees) that would level the ink content.
///
/// Candidates outside (-45, 45] degrees of tilt are discarded; with no
/// surviving candidate, or on pathological input, the estimate is 0 and
/// the pipeline continues uncorrected.
pub fn estimate_skew(image: &GrayImage, deadband: f64) -> f64 {
    let (width, height) = image.dimensions();
    if width < 16 || height < 16 {
        debug!("Image {}x{} too small for skew detection", width, height);
        return 0.0;
    }

    let edges = canny(image, CANNY_LOW, CANNY_HIGH);

    // Vote threshold proportional to the diagonal so detection scales
    // with canvas resolution.
    let diagonal = ((width as f64).powi(2) + (height as f64).powi(2)).sqrt();
    let options = LineDetectionOptions {
        vote_threshold: (diagonal * 0.25).max(50.0) as u32,
        suppression_radius: 8,
    };
    let lines = detect_lines(&edges, options);
    debug!(line_count = lines.len(), "Hough candidates for skew");

    // Hough angles describe the line normal in [0, 180); the baseline
    // tilt relative to horizontal is normal - 90. Keep only candidates
    // within (-45, 45] so near-vertical content does not masquerade as
    // extreme skew.
    let mut tilts: Vec<f64> = lines
        .iter()
        .map(|line| {
            let mut tilt = line.angle_in_degrees as f64 - 90.0;
            if tilt > 135.0 {
                tilt -= 180.0;
            }
            tilt
        })
        .filter(|t| *t > -45.0 && *t <= 45.0)
        .collect();

    if tilts.is_empty() {
        return 0.0;
    }

    tilts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = tilts.len() / 2;
    let median = if tilts.len() % 2 == 0 {
        (tilts[mid - 1] + tilts[mid]) / 2.0
    } else {
        tilts[mid]
    };

    // Rotation is applied opposite to the detected tilt
    let angle = -median;
    if angle.abs() < deadband {
        0.0
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_line_segment_mut;

    fn white_canvas(w: u32, h: u32) -> GrayImage {
        GrayImage::from_pixel(w, h, Luma([255]))
    }

    fn draw_tilted_lines(img: &mut GrayImage, degrees: f64) {
        let slope = degrees.to_radians().tan();
        for base in [60.0f32, 100.0, 140.0] {
            let x0 = 10.0f32;
            let x1 = 190.0f32;
            let y0 = base;
            let y1 = base + ((x1 - x0) as f64 * slope) as f32;
            draw_line_segment_mut(img, (x0, y0), (x1, y1), Luma([0]));
        }
    }

    #[test]
    fn test_horizontal_lines_within_deadband() {
        let mut img = white_canvas(200, 200);
        draw_tilted_lines(&mut img, 0.0);

        let angle = estimate_skew(&img, 0.5);
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn test_tilted_lines_detected() {
        let mut img = white_canvas(200, 200);
        draw_tilted_lines(&mut img, 10.0);

        let angle = estimate_skew(&img, 0.5);
        assert!(
            (angle - (-10.0)).abs() <= 2.0,
            "expected about -10 degrees, got {angle}"
        );
    }

    #[test]
    fn test_blank_image_reports_zero() {
        let img = white_canvas(200, 200);
        assert_eq!(estimate_skew(&img, 0.5), 0.0);
    }

    #[test]
    fn test_tiny_image_reports_zero() {
        let img = white_canvas(8, 8);
        assert_eq!(estimate_skew(&img, 0.5), 0.0);
    }

    #[test]
    fn test_vertical_lines_discarded() {
        // Near-vertical content must not produce an extreme correction
        let mut img = white_canvas(200, 200);
        for x in [60.0f32, 100.0, 140.0] {
            draw_line_segment_mut(&mut img, (x, 10.0), (x, 190.0), Luma([0]));
        }

        assert_eq!(estimate_skew(&img, 0.5), 0.0);
    }
}
