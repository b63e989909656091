use floormap_core::{PatchError, PatchShape, PatchStack, PatchView};
use serde::{Deserialize, Serialize};

use crate::{CalibrationError, HueClassifier, HueParams, LbpClassifier, TextureParams};

/// Both sub-decisions of a [`CompositeClassifier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDecision {
    pub hue: bool,
    pub lbp: bool,
}

impl CompositeDecision {
    /// Floor only when colour and texture agree.
    #[inline]
    pub fn is_floor(&self) -> bool {
        self.hue && self.lbp
    }
}

/// Hue AND texture, each calibrated independently on the same stack.
#[derive(Clone, Debug)]
pub struct CompositeClassifier {
    hue: HueClassifier,
    lbp: LbpClassifier,
}

impl CompositeClassifier {
    pub fn fit(
        patches: &PatchStack,
        hue: &HueParams,
        lbp: &TextureParams,
    ) -> Result<Self, CalibrationError> {
        Ok(Self {
            hue: HueClassifier::fit(patches, hue)?,
            lbp: LbpClassifier::fit(patches, lbp)?,
        })
    }

    pub fn from_parts(hue: HueClassifier, lbp: LbpClassifier) -> Result<Self, PatchError> {
        if hue.patch_shape() != lbp.patch_shape() {
            return Err(PatchError::ShapeMismatch {
                expected: hue.patch_shape(),
                got: lbp.patch_shape(),
            });
        }
        Ok(Self { hue, lbp })
    }

    /// Evaluate both sub-classifiers; neither short-circuits the other.
    pub fn classify_detailed(&self, patch: &PatchView<'_>) -> Result<CompositeDecision, PatchError> {
        Ok(CompositeDecision {
            hue: self.hue.classify(patch)?,
            lbp: self.lbp.classify(patch)?,
        })
    }

    pub fn classify(&self, patch: &PatchView<'_>) -> Result<bool, PatchError> {
        Ok(self.classify_detailed(patch)?.is_floor())
    }

    pub fn hue(&self) -> &HueClassifier {
        &self.hue
    }

    pub fn lbp(&self) -> &LbpClassifier {
        &self.lbp
    }

    #[inline]
    pub fn patch_shape(&self) -> PatchShape {
        self.hue.patch_shape()
    }
}
