//! Top-down occupancy grid built from classified camera patches.
//!
//! Each frame is tiled into a lattice of patches below the optical centre.
//! Every patch is projected onto the ground plane through a [`PoseSource`],
//! rasterized into grid cells and classified as floor or obstacle by any
//! [`FloorClassifier`](floormap_core::FloorClassifier). The robot's own
//! footprint is marked explored on each [`OccupancyGrid::update_location`].
//!
//! ```
//! use floormap_grid::{CellCode, GridConfig, GroundHomography, OccupancyGrid, OriginId};
//!
//! let mut pose = GroundHomography::from_array(
//!     [[0.0, -1.0, 250.0], [-1.0, 0.0, 160.0], [0.0, 0.0, 1.0]],
//!     "world",
//! );
//! pose.set_origin(OriginId(7));
//!
//! let config = GridConfig { grid_size: 200, ..GridConfig::default() };
//! let mut grid = OccupancyGrid::for_pose(config, &pose).unwrap();
//! grid.update_location(&pose).unwrap();
//! assert_eq!(grid.cell(100, 100), Some(CellCode::Explored));
//! ```

mod cell;
mod config;
mod error;
mod grid;
mod lattice;
mod pose;
mod raster;

pub use cell::{CellCode, CellCounts};
pub use config::GridConfig;
pub use error::{ConfigError, MapError, PoseError};
pub use grid::{FrameReport, LocationUpdate, OccupancyGrid};
pub use lattice::{PatchLattice, PatchWindow};
pub use pose::{GroundHomography, OriginId, PoseSource, RobotPose};
pub use raster::polygon_cells;
