use floormap_core::PatchError;

use crate::ClassifierKind;

/// Errors returned while fitting a classifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error("{kind} calibration needs at least {needed} patches, got {got}")]
    TooFewPatches {
        kind: ClassifierKind,
        needed: usize,
        got: usize,
    },
    #[error("percentile must lie in 0..=100, got {0}")]
    InvalidPercentile(f64),
    #[error("threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f64),
    #[error("LBP radius must be positive and at least one sample point is required")]
    InvalidLbp,
}
