//! High-level facade crate for the `floormap-*` workspace.
//!
//! A robot with a single forward camera builds a top-down occupancy map of the
//! floor around it:
//! 1. calibrate a [`classify::PatchClassifier`] on a handful of floor patches;
//! 2. for every frame, let an [`grid::OccupancyGrid`] tile the lower half of
//!    the image into patches, project them onto the ground through a
//!    [`grid::PoseSource`], and record floor or obstacle;
//! 3. after every move, mark the robot footprint explored.
//!
//! ## Quickstart
//!
//! ```
//! use floormap::classify::{ClassifierSpec, HueParams};
//! use floormap::core::{PatchStack, RgbFrame, RgbPatch};
//! use floormap::grid::{GridConfig, GroundHomography, OccupancyGrid, OriginId};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let floor = RgbPatch::filled(20, 20, [90, 140, 60]);
//! let stack = PatchStack::from_patches(&[floor.clone(), floor])?;
//! let classifier = ClassifierSpec::Hue(HueParams::default()).fit(&stack)?;
//!
//! let mut pose = GroundHomography::from_array(
//!     [[0.0, -1.0, 250.0], [-1.0, 0.0, 160.0], [0.0, 0.0, 1.0]],
//!     "world",
//! );
//! pose.set_origin(OriginId(1));
//!
//! let config = GridConfig { grid_size: 600, ..GridConfig::default() };
//! let mut grid = OccupancyGrid::for_pose(config, &pose)?;
//! let frame = RgbFrame::filled(320, 240, [90, 140, 60]);
//! let report = grid.process_frame(&frame, &pose, &classifier)?;
//! assert_eq!(report.obstacle_patches, 0);
//! grid.update_location(&pose)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `floormap::core`: patches, frames, colour and texture descriptors, statistics.
//! - `floormap::classify`: calibrated floor classifiers.
//! - `floormap::grid`: the occupancy grid, lattice, rasterizer and pose seam.
//! - `floormap::config`: JSON session configuration.
//! - `floormap::imageio` (feature `image`): `image` conversions, PNG patch
//!   loading and grid rendering.

pub use floormap_classify as classify;
pub use floormap_core as core;
pub use floormap_grid as grid;

pub use floormap_classify::{ClassifierSpec, PatchClassifier};
pub use floormap_core::{FloorClassifier, PatchStack, RgbFrame, RgbPatch};
pub use floormap_grid::{CellCode, FrameReport, GridConfig, OccupancyGrid, PoseSource};

pub mod config;
pub use config::{ConfigIoError, MapperConfig};

#[cfg(feature = "image")]
pub mod imageio;
