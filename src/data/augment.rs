// ============================================================
// Layer 4: Training Augmentation
// ============================================================
// Random geometric jitter applied to resized training images:
//
//   1. Rotation by an angle drawn from [-max_rotation_deg, +max_rotation_deg]
//   2. Independent x/y zoom drawn from [1 - zoom_range, 1 + zoom_range]
//   3. Horizontal flip with probability 0.5
//
// Rotation and zoom are one inverse affine warp around the image
// centre, sampled bilinearly. Coordinates that fall outside the
// source are clamped to the nearest edge pixel, so no black corners
// appear.
//
// Output size always equals input size.

use image::{Rgb, RgbImage};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Augmentation {
    pub max_rotation_deg: f32,
    pub zoom_range:       f32,
    pub horizontal_flip:  bool,
}

impl Default for Augmentation {
    fn default() -> Self {
        Self { max_rotation_deg: 20.0, zoom_range: 0.2, horizontal_flip: true }
    }
}

impl Augmentation {
    /// No-op settings; `apply` returns an identical copy.
    pub fn none() -> Self {
        Self { max_rotation_deg: 0.0, zoom_range: 0.0, horizontal_flip: false }
    }

    pub fn apply<R: Rng>(&self, image: &RgbImage, rng: &mut R) -> RgbImage {
        let theta = rng
            .gen_range(-self.max_rotation_deg..=self.max_rotation_deg)
            .to_radians();
        let zx = rng.gen_range(1.0 - self.zoom_range..=1.0 + self.zoom_range);
        let zy = rng.gen_range(1.0 - self.zoom_range..=1.0 + self.zoom_range);

        let mut out = if theta == 0.0 && zx == 1.0 && zy == 1.0 {
            image.clone()
        } else {
            warp(image, theta, zx, zy)
        };

        if self.horizontal_flip && rng.gen_bool(0.5) {
            image::imageops::flip_horizontal_in_place(&mut out);
        }
        out
    }
}

/// For each output pixel p: source = c + R(theta) · diag(zx, zy) · (p - c).
/// A zoom factor below 1 samples a smaller region, i.e. zooms in.
fn warp(image: &RgbImage, theta: f32, zx: f32, zy: f32) -> RgbImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return image.clone();
    }

    let cx = (w as f32 - 1.0) / 2.0;
    let cy = (h as f32 - 1.0) / 2.0;
    let (sin, cos) = theta.sin_cos();

    RgbImage::from_fn(w, h, |x, y| {
        let dx = (x as f32 - cx) * zx;
        let dy = (y as f32 - cy) * zy;
        let sx = cx + cos * dx - sin * dy;
        let sy = cy + sin * dx + cos * dy;
        sample_bilinear(image, sx, sy)
    })
}

fn sample_bilinear(image: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let (w, h) = image.dimensions();
    let x = x.clamp(0.0, (w - 1) as f32);
    let y = y.clamp(0.0, (h - 1) as f32);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = image.get_pixel(x0, y0);
    let p10 = image.get_pixel(x1, y0);
    let p01 = image.get_pixel(x0, y1);
    let p11 = image.get_pixel(x1, y1);

    let mut px = [0u8; 3];
    for (c, v) in px.iter_mut().enumerate() {
        let top    = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
        let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
        *v = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(px)
}
