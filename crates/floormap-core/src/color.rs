//! Colour-space conversions for RGB patches.
//!
//! Conventions follow the 8-bit OpenCV ones: grayscale uses BT.601 luma
//! weights rounded to the nearest level, hue is expressed in half-degrees so
//! it fits `[0, 180)`.

use crate::{GrayImage, PatchView};

/// BT.601 luma of one RGB pixel, rounded to an 8-bit level.
#[inline]
pub fn rgb_to_gray(rgb: [u8; 3]) -> u8 {
    let [r, g, b] = rgb.map(f64::from);
    (0.299 * r + 0.587 * g + 0.114 * b).round().clamp(0.0, 255.0) as u8
}

/// HSV of one RGB pixel: hue in `[0, 180)`, saturation and value in `[0, 255]`.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [f64; 3] {
    let [r, g, b] = rgb.map(f64::from);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    if diff <= 0.0 {
        return [0.0, s, v];
    }

    let mut h = if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    let mut h = (h / 2.0).round();
    if h >= 180.0 {
        h -= 180.0;
    }
    [h, s, v]
}

/// Mean hue over all pixels of a patch.
pub fn mean_hue(patch: &PatchView<'_>) -> f64 {
    let n = patch.shape.pixels();
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = patch.pixels().map(|p| rgb_to_hsv(p)[0]).sum();
    sum / n as f64
}

/// Grayscale copy of a patch.
pub fn to_gray_patch(patch: &PatchView<'_>) -> GrayImage {
    GrayImage {
        width: patch.shape.width,
        height: patch.shape.height,
        data: patch.pixels().map(rgb_to_gray).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RgbPatch;
    use approx::assert_relative_eq;

    #[test]
    fn primary_hues_use_half_degrees() {
        assert_eq!(rgb_to_hsv([255, 0, 0])[0], 0.0);
        assert_eq!(rgb_to_hsv([0, 255, 0])[0], 60.0);
        assert_eq!(rgb_to_hsv([0, 0, 255])[0], 120.0);
        assert_eq!(rgb_to_hsv([255, 255, 0])[0], 30.0);
    }

    #[test]
    fn grey_has_zero_hue_and_saturation() {
        let [h, s, v] = rgb_to_hsv([90, 90, 90]);
        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
        assert_eq!(v, 90.0);
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn hue_near_full_turn_wraps_to_zero() {
        // 359.x degrees rounds to 180 half-degrees, which wraps.
        let h = rgb_to_hsv([255, 0, 1])[0];
        assert!(h < 180.0);
    }

    #[test]
    fn gray_weights_match_bt601() {
        assert_eq!(rgb_to_gray([255, 255, 255]), 255);
        assert_eq!(rgb_to_gray([255, 0, 0]), 76);
        assert_eq!(rgb_to_gray([0, 255, 0]), 150);
        assert_eq!(rgb_to_gray([0, 0, 255]), 29);
    }

    #[test]
    fn mean_hue_averages_pixels() {
        let mut data = [0u8, 255, 0].repeat(2);
        data.extend_from_slice(&[0, 0, 255, 0, 0, 255]);
        let patch = RgbPatch::new(2, 2, data).expect("patch");
        assert_relative_eq!(mean_hue(&patch.view()), 90.0);
    }
}
