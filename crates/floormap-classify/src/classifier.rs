use std::fmt;

use floormap_core::{FloorClassifier, PatchError, PatchShape, PatchView};
use serde::{Deserialize, Serialize};

use crate::{CompositeClassifier, HueClassifier, LbpClassifier, PixelClassifier};

/// Discriminant of [`PatchClassifier`], for logs and reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    Pixel,
    Hue,
    Lbp,
    Composite,
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClassifierKind::Pixel => "pixel",
            ClassifierKind::Hue => "hue",
            ClassifierKind::Lbp => "lbp",
            ClassifierKind::Composite => "composite",
        })
    }
}

/// A fitted, immutable patch classifier.
#[derive(Clone, Debug)]
pub enum PatchClassifier {
    Pixel(PixelClassifier),
    Hue(HueClassifier),
    Lbp(LbpClassifier),
    Composite(CompositeClassifier),
}

impl PatchClassifier {
    /// `true` for floor, `false` for obstacle.
    pub fn classify(&self, patch: &PatchView<'_>) -> Result<bool, PatchError> {
        match self {
            PatchClassifier::Pixel(c) => c.classify(patch),
            PatchClassifier::Hue(c) => c.classify(patch),
            PatchClassifier::Lbp(c) => c.classify(patch),
            PatchClassifier::Composite(c) => c.classify(patch),
        }
    }

    pub fn kind(&self) -> ClassifierKind {
        match self {
            PatchClassifier::Pixel(_) => ClassifierKind::Pixel,
            PatchClassifier::Hue(_) => ClassifierKind::Hue,
            PatchClassifier::Lbp(_) => ClassifierKind::Lbp,
            PatchClassifier::Composite(_) => ClassifierKind::Composite,
        }
    }

    /// Decision threshold; `None` for the composite, which has one per part.
    pub fn threshold(&self) -> Option<f64> {
        match self {
            PatchClassifier::Pixel(c) => Some(c.threshold()),
            PatchClassifier::Hue(c) => Some(c.threshold()),
            PatchClassifier::Lbp(c) => Some(c.threshold()),
            PatchClassifier::Composite(_) => None,
        }
    }

    /// Shape every query patch must have.
    pub fn patch_shape(&self) -> PatchShape {
        match self {
            PatchClassifier::Pixel(c) => c.patch_shape(),
            PatchClassifier::Hue(c) => c.patch_shape(),
            PatchClassifier::Lbp(c) => c.patch_shape(),
            PatchClassifier::Composite(c) => c.patch_shape(),
        }
    }
}

impl FloorClassifier for PatchClassifier {
    fn is_floor(&self, patch: &PatchView<'_>) -> Result<bool, PatchError> {
        self.classify(patch)
    }
}

impl From<PixelClassifier> for PatchClassifier {
    fn from(c: PixelClassifier) -> Self {
        PatchClassifier::Pixel(c)
    }
}

impl From<HueClassifier> for PatchClassifier {
    fn from(c: HueClassifier) -> Self {
        PatchClassifier::Hue(c)
    }
}

impl From<LbpClassifier> for PatchClassifier {
    fn from(c: LbpClassifier) -> Self {
        PatchClassifier::Lbp(c)
    }
}

impl From<CompositeClassifier> for PatchClassifier {
    fn from(c: CompositeClassifier) -> Self {
        PatchClassifier::Composite(c)
    }
}
