// ============================================================
// Layer 4: Image Preprocessor
// ============================================================
// Converts a decoded image into the tensor layout the network
// was trained on.
//
// Steps (applied in order):
//   1. Convert to 8-bit RGB (drops alpha, expands greyscale)
//   2. Resize to size × size with a bicubic (Catmull-Rom) filter
//   3. Scale every channel value from 0..=255 into [0, 1]
//   4. Lay out channel-first with a leading batch dimension of 1
//
// This is a pure function of its input. There is no state, so it
// is safe to call from many request threads at once.
//
// The training dataset goes through the same `Preprocessor` so the
// network never sees a differently prepared image at serving time.
//
// Reference: image crate documentation (imageops::resize, FilterType)

use image::{imageops::FilterType, DynamicImage, RgbImage};

use crate::domain::image::ImageTensor;

pub struct Preprocessor {
    /// Target side length in pixels
    size: u32,
}

impl Preprocessor {
    /// Create a new Preprocessor for a square input of `size` pixels
    pub fn new(size: usize) -> Self {
        Self { size: size as u32 }
    }

    /// Resize and normalise a decoded image.
    pub fn process(&self, image: &DynamicImage) -> ImageTensor {
        self.to_tensor(&self.resize(&image.to_rgb8()))
    }

    /// Step 2 alone. The training dataset augments between resize and
    /// normalisation.
    pub fn resize(&self, rgb: &RgbImage) -> RgbImage {
        if rgb.width() == self.size && rgb.height() == self.size {
            rgb.clone()
        } else {
            image::imageops::resize(rgb, self.size, self.size, FilterType::CatmullRom)
        }
    }

    /// Steps 3-4 on an already resized image.
    pub fn to_tensor(&self, resized: &RgbImage) -> ImageTensor {
        let (width, height) = (resized.width() as usize, resized.height() as usize);
        let plane = width * height;
        let mut data = vec![0.0f32; ImageTensor::CHANNELS * plane];

        // HWC (how the image crate stores pixels) → CHW (what conv layers expect)
        for (x, y, pixel) in resized.enumerate_pixels() {
            let offset = y as usize * width + x as usize;
            for c in 0..ImageTensor::CHANNELS {
                data[c * plane + offset] = pixel[c] as f32 / 255.0;
            }
        }

        ImageTensor { data, height, width }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, Rgba, RgbaImage};

    #[test]
    fn test_output_shape() {
        let p   = Preprocessor::new(32);
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 20, Rgb([1, 2, 3])));
        let t   = p.process(&img);
        assert_eq!(t.shape(), [1, 3, 32, 32]);
        assert_eq!(t.len(), 3 * 32 * 32);
    }

    #[test]
    fn test_values_in_unit_range() {
        let p   = Preprocessor::new(16);
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(40, 40, |x, y| {
            Rgb([(x * 6) as u8, (y * 6) as u8, 255])
        }));
        let t = p.process(&img);
        assert!(t.data.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_channel_first_layout() {
        let p   = Preprocessor::new(4);
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 0, 51])));
        let t   = p.process(&img);
        let plane = 16;
        assert!(t.data[..plane].iter().all(|&v| v == 1.0));
        assert!(t.data[plane..2 * plane].iter().all(|&v| v == 0.0));
        assert!(t.data[2 * plane..].iter().all(|&v| (v - 0.2).abs() < 1e-6));
    }

    #[test]
    fn test_alpha_channel_dropped() {
        let p   = Preprocessor::new(8);
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 0])));
        assert_eq!(p.process(&img).shape(), [1, 3, 8, 8]);
    }

    #[test]
    fn test_greyscale_expanded() {
        let p   = Preprocessor::new(8);
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([128])));
        let t   = p.process(&img);
        assert_eq!(t.shape(), [1, 3, 8, 8]);
        assert!((t.data[0] - t.data[64]).abs() < 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let p   = Preprocessor::new(24);
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(31, 17, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        }));
        assert_eq!(p.process(&img), p.process(&img));
    }
}
