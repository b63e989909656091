//! Rotation-invariant uniform local binary patterns (LBP).
//!
//! Each pixel is compared against `points` neighbours sampled on a circle of
//! `radius` pixels. Uniform patterns (at most two 0/1 transitions) map to the
//! number of set bits, everything else to `points + 1`, so codes lie in
//! `0..=points + 1`.

use serde::{Deserialize, Serialize};

use crate::{sample_bilinear, GrayImageView};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LbpParams {
    /// Circle radius in pixels.
    pub radius: f64,
    /// Number of circularly symmetric neighbour samples.
    pub points: usize,
}

impl Default for LbpParams {
    fn default() -> Self {
        Self {
            radius: 2.0,
            points: 16,
        }
    }
}

impl LbpParams {
    /// Largest code a uniform LBP with these parameters can produce.
    #[inline]
    pub fn max_code(&self) -> u32 {
        self.points as u32 + 1
    }

    /// Neighbour offsets `(dy, dx)`, rounded to 5 decimals so that samples on
    /// the axes land exactly on pixel centres.
    fn offsets(&self) -> Vec<(f64, f64)> {
        let round5 = |v: f64| (v * 1e5).round() / 1e5;
        (0..self.points)
            .map(|p| {
                let angle = 2.0 * std::f64::consts::PI * p as f64 / self.points as f64;
                (
                    round5(-self.radius * angle.sin()),
                    round5(self.radius * angle.cos()),
                )
            })
            .collect()
    }
}

/// Uniform LBP code for every pixel, row-major.
pub fn lbp_codes(img: &GrayImageView<'_>, params: &LbpParams) -> Vec<u32> {
    let offsets = params.offsets();
    let non_uniform = params.max_code();
    let mut bits = vec![false; offsets.len()];
    let mut out = Vec::with_capacity(img.width * img.height);

    for y in 0..img.height {
        for x in 0..img.width {
            let center = img.data[y * img.width + x] as f64;
            for (bit, &(dy, dx)) in bits.iter_mut().zip(&offsets) {
                let v = sample_bilinear(img, x as f64 + dx, y as f64 + dy);
                *bit = v - center >= 0.0;
            }

            // Transitions are counted along the open sequence, without the
            // wrap-around pair.
            let changes = bits.windows(2).filter(|w| w[0] != w[1]).count();
            let code = if changes <= 2 {
                bits.iter().filter(|&&b| b).count() as u32
            } else {
                non_uniform
            };
            out.push(code);
        }
    }
    out
}

/// Normalised histogram of `codes` over `bins` unit-width bins.
///
/// Bin `k` counts codes equal to `k`; a code equal to `bins` falls into the
/// last (closed) bin and larger codes are dropped. Returns `None` when no
/// code lands in range.
pub fn lbp_histogram(codes: &[u32], bins: usize) -> Option<Vec<f64>> {
    if bins == 0 {
        return None;
    }
    let mut counts = vec![0usize; bins];
    for &c in codes {
        let c = c as usize;
        if c < bins {
            counts[c] += 1;
        } else if c == bins {
            counts[bins - 1] += 1;
        }
    }
    let total: usize = counts.iter().sum();
    if total == 0 {
        return None;
    }
    Some(counts.iter().map(|&n| n as f64 / total as f64).collect())
}
