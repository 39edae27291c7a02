//! Image preparation and sampling helpers shared by the extractors.

use ftrack_core::{FloatImage, Image};
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Point-pair intensity test `(x1, y1, x2, y2)` relative to the keypoint
pub type TestPair = (f32, f32, f32, f32);

/// Gaussian-smoothed copy of the image as floats
pub fn smoothed(img: &Image, sigma: f32) -> FloatImage {
    if sigma <= 0.0 {
        return FloatImage::from_gray(img);
    }
    FloatImage::from_gray(&gaussian_blur_f32(img, sigma))
}

/// Sobel derivatives `(dx, dy)` of the image
pub fn gradients(img: &Image) -> (FloatImage, FloatImage) {
    let to_float = |g: image::ImageBuffer<image::Luma<i16>, Vec<i16>>| FloatImage {
        width: g.width() as usize,
        height: g.height() as usize,
        data: g.into_raw().into_iter().map(|v| v as f32).collect(),
    };
    (to_float(horizontal_sobel(img)), to_float(vertical_sobel(img)))
}

/// Rotate an offset by `angle` radians
#[inline]
pub fn rotate(dx: f32, dy: f32, sin: f32, cos: f32) -> (f32, f32) {
    (cos * dx - sin * dy, sin * dx + cos * dy)
}

/// Pack bits LSB-first into `n_bytes`, zero-padding the tail
pub fn pack_bits(bits: impl IntoIterator<Item = bool>, n_bytes: usize) -> Vec<u8> {
    let mut out = vec![0u8; n_bytes];
    for (i, bit) in bits.into_iter().enumerate().take(n_bytes * 8) {
        out[i / 8] |= (bit as u8) << (i % 8);
    }
    out
}

/// Test pairs drawn from an isotropic Gaussian (sigma = patch / 5), clamped to the patch
pub fn gaussian_test_pairs(n: usize, patch_size: usize, seed: u64) -> Vec<TestPair> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let radius = (patch_size / 2) as f32;
    let sigma = patch_size as f32 / 5.0;
    let mut sample = move || -> f32 {
        // Box-Muller
        let u1: f32 = rng.random::<f32>().max(f32::MIN_POSITIVE);
        let u2: f32 = rng.random::<f32>();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
        (z * sigma).round().clamp(-radius, radius)
    };

    let mut pairs = Vec::with_capacity(n);
    while pairs.len() < n {
        let pair = (sample(), sample(), sample(), sample());
        if pair.0 == pair.2 && pair.1 == pair.3 {
            continue;
        }
        pairs.push(pair);
    }
    pairs
}
