use image::{GrayImage, Luma, RgbImage};

/// Bounding box of a detected face, in pixels of the frame it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

// BT.601 luma weights in 14-bit fixed point, as cv::cvtColor(RGB2GRAY) rounds them.
const LUMA_SHIFT: u32 = 14;
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;

/// Single-channel copy of a colour frame, as fed to the face detector.
///
/// Uses BT.601 weights (0.299, 0.587, 0.114), the gray the Haar cascades were
/// trained on.
pub fn to_grayscale(frame: &RgbImage) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b] = frame.get_pixel(x, y).0;
        let luma = (r as u32 * LUMA_R
            + g as u32 * LUMA_G
            + b as u32 * LUMA_B
            + (1 << (LUMA_SHIFT - 1)))
            >> LUMA_SHIFT;
        Luma([luma as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_keeps_dimensions() {
        let frame = RgbImage::from_pixel(8, 4, image::Rgb([200, 10, 10]));
        let gray = to_grayscale(&frame);
        assert_eq!(gray.dimensions(), (8, 4));
    }

    #[test]
    fn white_stays_white() {
        let frame = RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255]));
        let gray = to_grayscale(&frame);
        assert!(gray.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn primaries_use_bt601_weights() {
        let gray_of = |rgb: [u8; 3]| to_grayscale(&RgbImage::from_pixel(1, 1, image::Rgb(rgb))).get_pixel(0, 0).0[0];
        assert_eq!(gray_of([255, 0, 0]), 76);
        assert_eq!(gray_of([0, 255, 0]), 150);
        assert_eq!(gray_of([0, 0, 255]), 29);
        assert_eq!(gray_of([0, 0, 0]), 0);
        assert_eq!(gray_of([128, 128, 128]), 128);
    }
}
