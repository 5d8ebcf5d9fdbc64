use image::{ImageBuffer, Pixel};

/// Focus score of a frame: variance of its discrete Laplacian.
///
/// The 4-neighbour kernel `[0 1 0; 1 -4 1; 0 1 0]` is applied to every
/// channel independently, borders are mirrored without repeating the edge
/// sample (`dcb|abcd|cba`), and the population variance is taken over all
/// resulting samples of all channels together. Blurry frames have little
/// high-frequency energy and score low; a uniform frame scores exactly 0.
pub fn laplacian_variance<P>(image: &ImageBuffer<P, Vec<u8>>) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }
    let channels = P::CHANNEL_COUNT as usize;
    let raw = image.as_raw();
    let stride = width as usize * channels;
    let sample = |x: usize, y: usize, c: usize| raw[y * stride + x * channels + c] as f64;

    let mut count = 0u64;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;

    for y in 0..height as i64 {
        let up = reflect_101(y - 1, height) as usize;
        let down = reflect_101(y + 1, height) as usize;
        let y = y as usize;
        for x in 0..width as i64 {
            let left = reflect_101(x - 1, width) as usize;
            let right = reflect_101(x + 1, width) as usize;
            let x = x as usize;
            for c in 0..channels {
                let value = sample(x, up, c)
                    + sample(x, down, c)
                    + sample(left, y, c)
                    + sample(right, y, c)
                    - 4.0 * sample(x, y, c);
                sum += value;
                sum_sq += value * value;
                count += 1;
            }
        }
    }

    let n = count as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

/// Mirror an out-of-range coordinate back into `0..len` without repeating the edge.
fn reflect_101(i: i64, len: u32) -> i64 {
    let len = len as i64;
    if len == 1 {
        return 0;
    }
    let mut i = i;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        } else {
            i = 2 * (len - 1) - i;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn uniform_frame_scores_zero() {
        let frame = RgbImage::from_pixel(16, 9, Rgb([120, 64, 200]));
        assert_eq!(laplacian_variance(&frame), 0.0);
    }

    #[test]
    fn single_bright_pixel() {
        // Center 4, border 0. Laplacian: center -16, edge midpoints 8, corners 0.
        let mut img = GrayImage::new(3, 3);
        img.put_pixel(1, 1, Luma([4]));
        let expected = 512.0 / 9.0 - (16.0f64 / 9.0).powi(2);
        assert!((laplacian_variance(&img) - expected).abs() < 1e-9);
    }

    #[test]
    fn colour_channels_are_pooled() {
        let mut gray = GrayImage::new(3, 3);
        gray.put_pixel(1, 1, Luma([4]));
        let mut rgb = RgbImage::new(3, 3);
        rgb.put_pixel(1, 1, Rgb([4, 4, 4]));
        let a = laplacian_variance(&gray);
        let b = laplacian_variance(&rgb);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn checkerboard_is_sharper_than_gradient() {
        let checker = RgbImage::from_fn(32, 32, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let gradient = RgbImage::from_fn(32, 32, |x, _| {
            let v = (x * 8) as u8;
            Rgb([v, v, v])
        });
        let sharp = laplacian_variance(&checker);
        let soft = laplacian_variance(&gradient);
        assert!(sharp > 30.0);
        assert!(soft < sharp);
    }

    #[test]
    fn empty_and_single_pixel_frames() {
        assert_eq!(laplacian_variance(&RgbImage::new(0, 0)), 0.0);
        assert_eq!(laplacian_variance(&RgbImage::from_pixel(1, 1, Rgb([9, 9, 9]))), 0.0);
    }

    #[test]
    fn reflect_without_edge_repeat() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-1, 1), 0);
    }
}
