use super::frame_error::FrameError;

/// Luminance plane normalised to [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct GrayFrame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<f32>,
}

impl GrayFrame {
    /// Converts packed RGBA using `0.299R + 0.587G + 0.114B`. Alpha is ignored.
    ///
    /// # Errors
    /// [`FrameError::SizeMismatch`] if `rgba` is not `width * height * 4` bytes.
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> Result<Self, FrameError> {
        let expected = width * height * 4;
        if rgba.len() != expected {
            return Err(FrameError::SizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }
        let pixels = rgba
            .chunks_exact(4)
            .map(|px| {
                (0.299 * f32::from(px[0]) + 0.587 * f32::from(px[1]) + 0.114 * f32::from(px[2]))
                    / 255.0
            })
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn white_is_one_black_is_zero() {
        let g = GrayFrame::from_rgba(2, 1, &[255, 255, 255, 255, 0, 0, 0, 255]).unwrap();
        assert!((g.pixels[0] - 1.0).abs() < 1e-5);
        assert_eq!(g.pixels[1], 0.0);
    }

    #[test]
    fn green_weighs_more_than_blue() {
        let g = GrayFrame::from_rgba(2, 1, &[0, 255, 0, 255, 0, 0, 255, 255]).unwrap();
        assert!(g.pixels[0] > g.pixels[1]);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = GrayFrame::from_rgba(2, 2, &[0; 12]).unwrap_err();
        assert_eq!(
            err,
            FrameError::SizeMismatch {
                expected: 16,
                actual: 12
            }
        );
    }
}
