//! Motion score: mean magnitude of the 4-neighbour Laplacian of the absolute
//! frame difference. Uniform change (exposure drift, whole-frame shake) has a
//! near-zero Laplacian; small local movement does not.

use super::gray_frame::GrayFrame;

/// Absolute per-pixel difference of two equally shaped frames.
#[must_use]
pub fn abs_diff(previous: &GrayFrame, current: &GrayFrame) -> Vec<f32> {
    previous
        .pixels
        .iter()
        .zip(&current.pixels)
        .map(|(a, b)| (a - b).abs())
        .collect()
}

/// Mean `|4c - n - s - e - w|` over the interior of a `width × height` field.
///
/// Fields narrower or shorter than 3 pixels have no interior and score 0.
#[must_use]
pub fn laplacian_mean(field: &[f32], width: usize, height: usize) -> f32 {
    if width < 3 || height < 3 || field.len() != width * height {
        return 0.0;
    }
    let mut sum = 0.0f32;
    for y in 1..height - 1 {
        let row = y * width;
        for x in 1..width - 1 {
            let i = row + x;
            let v = 4.0 * field[i] - field[i - 1] - field[i + 1] - field[i - width] - field[i + width];
            sum += v.abs();
        }
    }
    sum / ((width - 2) * (height - 2)) as f32
}

/// Motion score between two frames; 0 if their shapes differ.
#[must_use]
pub fn motion_score(previous: &GrayFrame, current: &GrayFrame) -> f32 {
    if !previous.same_shape(current) {
        return 0.0;
    }
    laplacian_mean(&abs_diff(previous, current), current.width, current.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: usize, height: usize, value: f32) -> GrayFrame {
        GrayFrame {
            width,
            height,
            pixels: vec![value; width * height],
        }
    }

    #[test]
    fn identical_frames_score_zero() {
        let a = flat(160, 120, 0.5);
        assert_eq!(motion_score(&a, &a.clone()), 0.0);
    }

    #[test]
    fn uniform_brightness_change_scores_zero() {
        assert_eq!(motion_score(&flat(16, 12, 0.2), &flat(16, 12, 0.7)), 0.0);
    }

    #[test]
    fn single_pixel_change_is_detected() {
        let a = flat(5, 5, 0.0);
        let mut b = a.clone();
        b.pixels[12] = 1.0; // centre
        // centre: 4, four neighbours: 1 each → 8 over 9 interior pixels
        assert!((motion_score(&a, &b) - 8.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_shapes_score_zero() {
        assert_eq!(motion_score(&flat(4, 4, 0.0), &flat(5, 4, 1.0)), 0.0);
    }

    #[test]
    fn tiny_fields_have_no_interior() {
        assert_eq!(laplacian_mean(&[1.0; 4], 2, 2), 0.0);
    }
}
