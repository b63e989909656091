use floormap_core::{mean, mean_hue, percentile, PatchError, PatchShape, PatchStack, PatchView};
use log::info;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::{check_percentile, check_threshold};
use crate::{CalibrationError, HueParams, THRESHOLD_MARGIN};

/// Colour classifier over per-patch mean hue.
#[derive(Clone, Debug)]
pub struct HueClassifier {
    shape: PatchShape,
    hues: Vec<f64>,
    threshold: f64,
}

impl HueClassifier {
    /// Fit on a calibration stack.
    ///
    /// Each calibration patch is reduced to its mean hue. The threshold is the
    /// configured percentile of the calibration patches' own distances to the
    /// hue set, times `1.05`. A percentile below 100 deliberately lets outlier
    /// calibration patches fall outside.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(patches, params), fields(n = patches.len()))
    )]
    pub fn fit(patches: &PatchStack, params: &HueParams) -> Result<Self, CalibrationError> {
        check_percentile(params.percentile)?;
        let fixed = check_threshold(params.threshold)?;

        let hues: Vec<f64> = patches.iter().map(|p| mean_hue(&p)).collect();
        let mut classifier = Self {
            shape: patches.patch_shape(),
            hues,
            threshold: 0.0,
        };

        classifier.threshold = match fixed {
            Some(t) => t,
            None => classifier.fitted_threshold(params.percentile)?,
        };

        info!(
            "hue classifier: {} patches, p{} threshold {:.3}",
            classifier.hues.len(),
            params.percentile,
            classifier.threshold
        );
        Ok(classifier)
    }

    /// Threshold the calibration set would produce for percentile `q`.
    pub fn fitted_threshold(&self, q: f64) -> Result<f64, CalibrationError> {
        check_percentile(q)?;
        let distances: Vec<f64> = self.hues.iter().map(|&h| self.hue_distance(h)).collect();
        let p = percentile(&distances, q).ok_or(CalibrationError::InvalidPercentile(q))?;
        Ok(p * THRESHOLD_MARGIN)
    }

    fn hue_distance(&self, hue: f64) -> f64 {
        let sq: Vec<f64> = self.hues.iter().map(|&c| (hue - c) * (hue - c)).collect();
        mean(&sq).unwrap_or(0.0)
    }

    /// Mean squared difference between the patch's mean hue and every
    /// calibration mean hue.
    pub fn distance(&self, patch: &PatchView<'_>) -> Result<f64, PatchError> {
        if patch.shape != self.shape {
            return Err(PatchError::ShapeMismatch {
                expected: self.shape,
                got: patch.shape,
            });
        }
        Ok(self.hue_distance(mean_hue(patch)))
    }

    pub fn classify(&self, patch: &PatchView<'_>) -> Result<bool, PatchError> {
        Ok(self.distance(patch)? <= self.threshold)
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Calibration mean hues, in stack order.
    #[inline]
    pub fn calibration_hues(&self) -> &[f64] {
        &self.hues
    }

    #[inline]
    pub fn patch_shape(&self) -> PatchShape {
        self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use floormap_core::RgbPatch;

    fn stack(colors: &[[u8; 3]]) -> PatchStack {
        let patches: Vec<RgbPatch> = colors.iter().map(|&c| RgbPatch::filled(3, 3, c)).collect();
        PatchStack::from_patches(&patches).expect("stack")
    }

    #[test]
    fn reduces_patches_to_mean_hue() {
        let c = HueClassifier::fit(&stack(&[[255, 0, 0], [0, 255, 0]]), &HueParams::default())
            .expect("fit");
        assert_eq!(c.calibration_hues(), &[0.0, 60.0]);
        // Both calibration distances are (0 + 3600) / 2.
        assert_relative_eq!(c.threshold(), 1800.0 * THRESHOLD_MARGIN);
    }

    #[test]
    fn green_floor_rejects_blue() {
        let greens = [[20, 200, 20], [30, 220, 30], [10, 180, 10], [40, 240, 40]];
        let c = HueClassifier::fit(&stack(&greens), &HueParams::default()).expect("fit");
        for g in greens {
            assert!(c.classify(&RgbPatch::filled(3, 3, g).view()).expect("ok"));
        }
        assert!(!c
            .classify(&RgbPatch::filled(3, 3, [20, 20, 220]).view())
            .expect("ok"));
    }

    #[test]
    fn higher_percentile_never_lowers_threshold() {
        let colors = [[200, 40, 40], [200, 60, 40], [40, 200, 40], [200, 50, 45], [40, 40, 200]];
        let c = HueClassifier::fit(&stack(&colors), &HueParams::default()).expect("fit");
        let p90 = c.fitted_threshold(90.0).expect("p90");
        let p95 = c.fitted_threshold(95.0).expect("p95");
        assert!(p95 >= p90);
    }

    #[test]
    fn rejects_bad_percentile() {
        let params = HueParams {
            percentile: 150.0,
            threshold: None,
        };
        let err = HueClassifier::fit(&stack(&[[0; 3]]), &params).unwrap_err();
        assert_eq!(err, CalibrationError::InvalidPercentile(150.0));
    }
}
