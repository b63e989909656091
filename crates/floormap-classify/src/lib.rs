//! Floor/obstacle patch classifiers calibrated from reference floor patches.
//!
//! ## Quickstart
//!
//! ```
//! use floormap_classify::{ClassifierSpec, PixelParams};
//! use floormap_core::{PatchStack, RgbPatch};
//!
//! let floor = RgbPatch::filled(8, 8, [0, 0, 0]);
//! let stack = PatchStack::from_patches(&[floor.clone(), floor.clone(), floor.clone()]).unwrap();
//! let classifier = ClassifierSpec::Pixel(PixelParams::default()).fit(&stack).unwrap();
//!
//! assert!(classifier.classify(&floor.view()).unwrap());
//! assert!(!classifier.classify(&RgbPatch::filled(8, 8, [255; 3]).view()).unwrap());
//! ```
//!
//! Every variant reduces a query patch to a scalar distance against the whole
//! calibration set and accepts it as floor when the distance does not exceed a
//! threshold fitted at construction:
//! - [`PixelClassifier`]: mean squared pixel difference, threshold just above
//!   the worst calibration self-distance;
//! - [`HueClassifier`]: squared mean-hue difference, percentile threshold;
//! - [`LbpClassifier`]: KL divergence of uniform LBP histograms, percentile
//!   threshold;
//! - [`CompositeClassifier`]: hue AND texture.

mod classifier;
mod composite;
mod error;
mod hue;
mod lbp;
mod params;
mod pixel;

pub use classifier::{ClassifierKind, PatchClassifier};
pub use composite::{CompositeClassifier, CompositeDecision};
pub use error::CalibrationError;
pub use hue::HueClassifier;
pub use lbp::LbpClassifier;
pub use params::{ClassifierSpec, HueParams, PixelParams, TextureParams, THRESHOLD_MARGIN};
pub use pixel::PixelClassifier;

pub use floormap_core::{FloorClassifier, LbpParams, PatchError, PatchShape, PatchStack};
