use floormap_core::{LbpParams, PatchStack};
use serde::{Deserialize, Serialize};

use crate::{
    CalibrationError, ClassifierKind, CompositeClassifier, HueClassifier, LbpClassifier,
    PatchClassifier, PixelClassifier,
};

/// Multiplier applied to every fitted threshold, so calibration patches at the
/// edge of the distribution still classify as floor.
pub const THRESHOLD_MARGIN: f64 = 1.05;

/// Parameters for the pixel-MSE classifier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelParams {
    /// Fixed MSE threshold. Fitted from the calibration set when `None`.
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Parameters for the mean-hue classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HueParams {
    /// Percentile (`0..=100`) of calibration hue distances used as threshold.
    pub percentile: f64,
    /// Fixed threshold overriding the fitted one.
    pub threshold: Option<f64>,
}

impl Default for HueParams {
    fn default() -> Self {
        Self {
            percentile: 90.0,
            threshold: None,
        }
    }
}

/// Parameters for the LBP-histogram texture classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureParams {
    pub lbp: LbpParams,
    /// Percentile (`0..=100`) of per-histogram mean divergence used as threshold.
    pub percentile: f64,
    /// Fixed threshold overriding the fitted one.
    pub threshold: Option<f64>,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            lbp: LbpParams::default(),
            percentile: 95.0,
            threshold: None,
        }
    }
}

/// Which classifier to fit, and how.
///
/// Serialised with an internal `kind` tag, e.g.
/// `{"kind": "hue", "percentile": 95.0}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Pixel(PixelParams),
    Hue(HueParams),
    Lbp(TextureParams),
    Composite {
        #[serde(default)]
        hue: HueParams,
        #[serde(default)]
        lbp: TextureParams,
    },
}

impl Default for ClassifierSpec {
    fn default() -> Self {
        ClassifierSpec::Composite {
            hue: HueParams::default(),
            lbp: TextureParams::default(),
        }
    }
}

impl ClassifierSpec {
    /// Default parameters for `kind`.
    pub fn for_kind(kind: ClassifierKind) -> Self {
        match kind {
            ClassifierKind::Pixel => ClassifierSpec::Pixel(PixelParams::default()),
            ClassifierKind::Hue => ClassifierSpec::Hue(HueParams::default()),
            ClassifierKind::Lbp => ClassifierSpec::Lbp(TextureParams::default()),
            ClassifierKind::Composite => ClassifierSpec::default(),
        }
    }

    pub fn kind(&self) -> ClassifierKind {
        match self {
            ClassifierSpec::Pixel(_) => ClassifierKind::Pixel,
            ClassifierSpec::Hue(_) => ClassifierKind::Hue,
            ClassifierSpec::Lbp(_) => ClassifierKind::Lbp,
            ClassifierSpec::Composite { .. } => ClassifierKind::Composite,
        }
    }

    /// Fit the described classifier on a calibration stack.
    pub fn fit(&self, patches: &PatchStack) -> Result<PatchClassifier, CalibrationError> {
        Ok(match self {
            ClassifierSpec::Pixel(p) => PixelClassifier::fit(patches, p)?.into(),
            ClassifierSpec::Hue(p) => HueClassifier::fit(patches, p)?.into(),
            ClassifierSpec::Lbp(p) => LbpClassifier::fit(patches, p)?.into(),
            ClassifierSpec::Composite { hue, lbp } => {
                CompositeClassifier::fit(patches, hue, lbp)?.into()
            }
        })
    }

    /// Fit from a raw `(N, H, W, 3)` byte array; the shape is validated first.
    pub fn fit_array(
        &self,
        shape: &[usize],
        data: Vec<u8>,
    ) -> Result<PatchClassifier, CalibrationError> {
        let stack = PatchStack::from_shape_vec(shape, data)?;
        self.fit(&stack)
    }
}

pub(crate) fn check_percentile(q: f64) -> Result<(), CalibrationError> {
    if (0.0..=100.0).contains(&q) {
        Ok(())
    } else {
        Err(CalibrationError::InvalidPercentile(q))
    }
}

pub(crate) fn check_threshold(t: Option<f64>) -> Result<Option<f64>, CalibrationError> {
    match t {
        Some(t) if !t.is_finite() || t < 0.0 => Err(CalibrationError::InvalidThreshold(t)),
        other => Ok(other),
    }
}
