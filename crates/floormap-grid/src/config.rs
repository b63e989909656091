use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Geometry of the grid and of the patch lattice laid over each frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Side length of the square grid, in cells (one cell per world unit).
    pub grid_size: usize,
    /// Patch size in pixels, `[height, width]`.
    pub patch_size: [usize; 2],
    /// Optical centre of the frame in pixels, `[row, col]`.
    pub camera_center: [usize; 2],
    /// Side of the square robot footprint marked explored, in cells.
    pub footprint: usize,
    /// Frame name passed to `base_to_link` to reach world coordinates.
    pub world_frame: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_size: 3000,
            patch_size: [20, 20],
            camera_center: [120, 160],
            footprint: 30,
            world_frame: "world".to_string(),
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.cell_count().is_none() {
            return Err(ConfigError::GridTooLarge(self.grid_size));
        }
        let [ph, pw] = self.patch_size;
        if ph == 0 || pw == 0 {
            return Err(ConfigError::EmptyPatch {
                height: ph,
                width: pw,
            });
        }
        let [cr, cc] = self.camera_center;
        if cr < ph / 2 || cc < pw / 2 {
            return Err(ConfigError::CenterTooClose {
                center: self.camera_center,
                patch: self.patch_size,
            });
        }
        if self.footprint == 0 {
            return Err(ConfigError::EmptyFootprint);
        }
        Ok(())
    }

    /// Number of cells, `None` when `grid_size^2` overflows.
    #[inline]
    pub fn cell_count(&self) -> Option<usize> {
        self.grid_size.checked_mul(self.grid_size)
    }

    /// Grid offset applied to truncated world coordinates.
    #[inline]
    pub fn half_size(&self) -> i64 {
        (self.grid_size / 2) as i64
    }
}
