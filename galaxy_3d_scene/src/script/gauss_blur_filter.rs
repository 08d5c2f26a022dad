/// Gaussian blur kernel declared by scene scripts.
///
/// 15 taps along one axis, in texel units: tap 0 is the center, taps
/// 2k-1 / 2k sit at +k / -k texels. Weights follow a normal distribution
/// with the blur amount as standard deviation, normalized to sum to 1.

use std::f32::consts::PI;

pub const GAUSS_BLUR_SAMPLE_COUNT: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct GaussBlurFilter {
    blur_amount: f32,
    offsets: [f32; GAUSS_BLUR_SAMPLE_COUNT],
    weights: [f32; GAUSS_BLUR_SAMPLE_COUNT],
}

impl GaussBlurFilter {
    /// Build the kernel. `blur_amount` must be positive.
    pub fn new(blur_amount: f32) -> Self {
        debug_assert!(blur_amount > 0.0);

        let mut offsets = [0.0; GAUSS_BLUR_SAMPLE_COUNT];
        let mut weights = [0.0; GAUSS_BLUR_SAMPLE_COUNT];

        weights[0] = gaussian(0.0, blur_amount);
        let mut total = weights[0];

        for k in 1..=GAUSS_BLUR_SAMPLE_COUNT / 2 {
            let weight = gaussian(k as f32, blur_amount);
            offsets[2 * k - 1] = k as f32;
            offsets[2 * k] = -(k as f32);
            weights[2 * k - 1] = weight;
            weights[2 * k] = weight;
            total += 2.0 * weight;
        }

        for weight in &mut weights {
            *weight /= total;
        }

        Self { blur_amount, offsets, weights }
    }

    pub fn blur_amount(&self) -> f32 {
        self.blur_amount
    }

    pub fn sample_offsets(&self) -> &[f32; GAUSS_BLUR_SAMPLE_COUNT] {
        &self.offsets
    }

    pub fn sample_weights(&self) -> &[f32; GAUSS_BLUR_SAMPLE_COUNT] {
        &self.weights
    }
}

fn gaussian(n: f32, theta: f32) -> f32 {
    (1.0 / (2.0 * PI * theta).sqrt()) * (-(n * n) / (2.0 * theta * theta)).exp()
}
