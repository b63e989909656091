//! Core types and utilities for floor-patch occupancy mapping.
//!
//! This crate is intentionally small and free of any camera, robot or
//! image-codec dependency. It provides:
//! - fixed-shape colour patches and calibration stacks (`N x H x W x 3`),
//! - colour conversions (grayscale, HSV hue),
//! - uniform local-binary-pattern texture codes and histograms,
//! - the statistics used to calibrate and evaluate patch classifiers,
//! - the [`FloorClassifier`] seam consumed by the occupancy grid.

mod classify;
mod color;
mod error;
mod image;
mod logger;
mod stats;
mod texture;

pub use classify::FloorClassifier;
pub use color::{mean_hue, rgb_to_gray, rgb_to_hsv, to_gray_patch};
pub use error::PatchError;
pub use image::{
    sample_bilinear, GrayImage, GrayImageView, PatchShape, PatchStack, PatchView, RgbFrame,
    RgbPatch, RGB_CHANNELS,
};
pub use stats::{kl_divergence, mean, mean_squared_difference, percentile};
pub use texture::{lbp_codes, lbp_histogram, LbpParams};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, verbosity_level};
