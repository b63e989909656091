use crate::{PatchError, PatchView};

/// Binary floor/obstacle decision over one fixed-shape colour patch.
///
/// `Ok(true)` means traversable floor, `Ok(false)` an obstacle. Implementations
/// must not mutate state at call time; a patch whose shape differs from the one
/// the classifier was fitted on is an error, never a silent decision.
pub trait FloorClassifier {
    fn is_floor(&self, patch: &PatchView<'_>) -> Result<bool, PatchError>;
}

impl<T: FloorClassifier + ?Sized> FloorClassifier for &T {
    fn is_floor(&self, patch: &PatchView<'_>) -> Result<bool, PatchError> {
        (**self).is_floor(patch)
    }
}

impl<T: FloorClassifier + ?Sized> FloorClassifier for Box<T> {
    fn is_floor(&self, patch: &PatchView<'_>) -> Result<bool, PatchError> {
        (**self).is_floor(patch)
    }
}
