use floormap_core::{
    kl_divergence, lbp_codes, lbp_histogram, mean, percentile, to_gray_patch, LbpParams,
    PatchError, PatchShape, PatchStack, PatchView,
};
use log::{debug, info};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::{check_percentile, check_threshold};
use crate::{CalibrationError, ClassifierKind, TextureParams, THRESHOLD_MARGIN};

/// Texture classifier: KL divergence between uniform-LBP histograms.
#[derive(Clone, Debug)]
pub struct LbpClassifier {
    shape: PatchShape,
    lbp: LbpParams,
    bins: usize,
    histograms: Vec<Vec<f64>>,
    threshold: f64,
}

impl LbpClassifier {
    /// Fit on a calibration stack of at least two patches.
    ///
    /// The bin count is fixed here from the largest LBP code seen in the
    /// calibration set and reused for every query. The threshold is the
    /// configured percentile of each histogram's mean divergence to all the
    /// others (self pairs excluded), times `1.05`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(patches, params), fields(n = patches.len()))
    )]
    pub fn fit(patches: &PatchStack, params: &TextureParams) -> Result<Self, CalibrationError> {
        check_percentile(params.percentile)?;
        let fixed = check_threshold(params.threshold)?;
        if params.lbp.points == 0 || params.lbp.radius.is_nan() || params.lbp.radius <= 0.0 {
            return Err(CalibrationError::InvalidLbp);
        }
        if patches.len() < 2 {
            return Err(CalibrationError::TooFewPatches {
                kind: ClassifierKind::Lbp,
                needed: 2,
                got: patches.len(),
            });
        }

        let codes: Vec<Vec<u32>> = patches
            .iter()
            .map(|p| lbp_codes(&to_gray_patch(&p).view(), &params.lbp))
            .collect();
        let max_code = codes.iter().flatten().copied().max().unwrap_or(0);
        let bins = max_code as usize + 1;

        // Every calibration code is <= max_code < bins, so each histogram is
        // populated.
        let histograms: Vec<Vec<f64>> = codes
            .iter()
            .filter_map(|c| lbp_histogram(c, bins))
            .collect();
        debug!("lbp calibration: {} histograms over {} bins", histograms.len(), bins);

        let mut classifier = Self {
            shape: patches.patch_shape(),
            lbp: params.lbp,
            bins,
            histograms,
            threshold: 0.0,
        };
        classifier.threshold = match fixed {
            Some(t) => t,
            None => classifier.fitted_threshold(params.percentile)?,
        };

        info!(
            "lbp classifier: {} patches, {} bins, p{} threshold {:.4}",
            patches.len(),
            bins,
            params.percentile,
            classifier.threshold
        );
        Ok(classifier)
    }

    /// Threshold the calibration set would produce for percentile `q`.
    pub fn fitted_threshold(&self, q: f64) -> Result<f64, CalibrationError> {
        check_percentile(q)?;
        let mean_divergences: Vec<f64> = self
            .histograms
            .iter()
            .enumerate()
            .map(|(i, hi)| {
                let d: Vec<f64> = self
                    .histograms
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, hj)| kl_divergence(hi, hj))
                    .collect();
                mean(&d).unwrap_or(0.0)
            })
            .collect();
        let p = percentile(&mean_divergences, q).ok_or(CalibrationError::InvalidPercentile(q))?;
        Ok(p * THRESHOLD_MARGIN)
    }

    /// Normalised LBP histogram of a patch over the fitted bins.
    ///
    /// `None` when none of the patch's codes fall inside the fitted bins.
    pub fn histogram(&self, patch: &PatchView<'_>) -> Result<Option<Vec<f64>>, PatchError> {
        if patch.shape != self.shape {
            return Err(PatchError::ShapeMismatch {
                expected: self.shape,
                got: patch.shape,
            });
        }
        let codes = lbp_codes(&to_gray_patch(patch).view(), &self.lbp);
        Ok(lbp_histogram(&codes, self.bins))
    }

    /// Mean divergence from the patch histogram to every calibration histogram.
    ///
    /// A patch with no code inside the fitted bins is infinitely far away.
    pub fn distance(&self, patch: &PatchView<'_>) -> Result<f64, PatchError> {
        let Some(hist) = self.histogram(patch)? else {
            return Ok(f64::INFINITY);
        };
        let d: Vec<f64> = self
            .histograms
            .iter()
            .map(|h| kl_divergence(&hist, h))
            .collect();
        Ok(mean(&d).unwrap_or(f64::INFINITY))
    }

    pub fn classify(&self, patch: &PatchView<'_>) -> Result<bool, PatchError> {
        Ok(self.distance(patch)? <= self.threshold)
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of histogram bins fixed at calibration time.
    #[inline]
    pub fn bins(&self) -> usize {
        self.bins
    }

    #[inline]
    pub fn patch_shape(&self) -> PatchShape {
        self.shape
    }
}
