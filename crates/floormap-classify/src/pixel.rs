use floormap_core::{mean_squared_difference, PatchError, PatchShape, PatchStack, PatchView};
use log::{info, warn};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::check_threshold;
use crate::{CalibrationError, PixelParams, THRESHOLD_MARGIN};

/// Raw pixel classifier: mean squared difference against the whole calibration
/// stack.
#[derive(Clone, Debug)]
pub struct PixelClassifier {
    patches: PatchStack,
    threshold: f64,
}

impl PixelClassifier {
    /// Fit on a calibration stack.
    ///
    /// Without an explicit threshold, the threshold is `1.05x` the largest
    /// distance of any calibration patch to the full stack, so every
    /// calibration patch classifies as floor.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(patches, params), fields(n = patches.len()))
    )]
    pub fn fit(patches: &PatchStack, params: &PixelParams) -> Result<Self, CalibrationError> {
        let mut classifier = Self {
            patches: patches.clone(),
            threshold: 0.0,
        };

        classifier.threshold = match check_threshold(params.threshold)? {
            Some(t) => t,
            None => {
                let worst = patches
                    .iter()
                    .map(|p| classifier.stack_distance(p.data))
                    .fold(0.0_f64, f64::max);
                worst * THRESHOLD_MARGIN
            }
        };

        if classifier.threshold == 0.0 {
            warn!("pixel classifier fitted with zero threshold: only exact calibration matches pass");
        }
        info!(
            "pixel classifier: {} patches of {}, threshold {:.3}",
            patches.len(),
            patches.patch_shape(),
            classifier.threshold
        );
        Ok(classifier)
    }

    fn stack_distance(&self, data: &[u8]) -> f64 {
        let n = self.patches.len() as f64;
        self.patches
            .iter()
            .map(|c| mean_squared_difference(data, c.data))
            .sum::<f64>()
            / n
    }

    /// Mean squared pixel difference between `patch` and the calibration stack.
    pub fn distance(&self, patch: &PatchView<'_>) -> Result<f64, PatchError> {
        let expected = self.patch_shape();
        if patch.shape != expected {
            return Err(PatchError::ShapeMismatch {
                expected,
                got: patch.shape,
            });
        }
        Ok(self.stack_distance(patch.data))
    }

    pub fn classify(&self, patch: &PatchView<'_>) -> Result<bool, PatchError> {
        Ok(self.distance(patch)? <= self.threshold)
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[inline]
    pub fn patch_shape(&self) -> PatchShape {
        self.patches.patch_shape()
    }
}
