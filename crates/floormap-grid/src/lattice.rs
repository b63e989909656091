//! The patch lattice laid over the lower half of a frame.
//!
//! Patches are centred on the optical centre and tile the frame downwards
//! and sideways. Each lattice column is walked from the bottom of the frame
//! (nearest the robot) up to the row through the optical centre.

use crate::GridConfig;

/// One patch window in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatchWindow {
    /// Lattice row, `0` at the optical centre, growing towards the robot.
    pub lattice_row: i64,
    /// Lattice column, `0` at the optical centre.
    pub lattice_col: i64,
    /// Top image row.
    pub row: i64,
    /// Left image column.
    pub col: i64,
    pub height: usize,
    pub width: usize,
}

impl PatchWindow {
    /// Image corners as `(pixel_x, pixel_y)`, clockwise from top-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (r1, c1) = (self.row as f64, self.col as f64);
        let r2 = r1 + self.height as f64;
        let c2 = c1 + self.width as f64;
        [(c1, r1), (c2, r1), (c2, r2), (c1, r2)]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatchLattice {
    center: [i64; 2],
    patch: [usize; 2],
    rows: i64,
    half_cols: i64,
}

impl PatchLattice {
    pub fn new(camera_center: [usize; 2], patch_size: [usize; 2]) -> Self {
        let [ph, pw] = patch_size;
        let [cr, cc] = camera_center;
        Self {
            center: [cr as i64, cc as i64],
            patch: patch_size,
            rows: (cr.saturating_sub(ph / 2) / ph.max(1)) as i64,
            half_cols: (cc.saturating_sub(pw / 2) / pw.max(1)) as i64,
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.camera_center, config.patch_size)
    }

    /// Patches per column.
    pub fn row_count(&self) -> usize {
        (self.rows + 1) as usize
    }

    pub fn column_count(&self) -> usize {
        (2 * self.half_cols + 1) as usize
    }

    /// Lattice column indices, left to right.
    pub fn columns(&self) -> impl Iterator<Item = i64> {
        -self.half_cols..=self.half_cols
    }

    /// Windows of column `j`, nearest first.
    pub fn column(&self, j: i64) -> impl Iterator<Item = PatchWindow> + '_ {
        (0..=self.rows).rev().map(move |i| self.window(i, j))
    }

    pub fn window(&self, i: i64, j: i64) -> PatchWindow {
        let [ph, pw] = self.patch;
        PatchWindow {
            lattice_row: i,
            lattice_col: j,
            row: self.center[0] - (ph / 2) as i64 + ph as i64 * i,
            col: self.center[1] - (pw / 2) as i64 + pw as i64 * j,
            height: ph,
            width: pw,
        }
    }

    /// Smallest `(height, width)` frame holding every window.
    pub fn min_frame(&self) -> (usize, usize) {
        let bottom = self.window(self.rows, 0);
        let right = self.window(0, self.half_cols);
        (
            (bottom.row + bottom.height as i64).max(0) as usize,
            (right.col + right.width as i64).max(0) as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lattice_covers_lower_half_of_qvga() {
        let lattice = PatchLattice::from_config(&GridConfig::default());
        assert_eq!(lattice.row_count(), 6);
        assert_eq!(lattice.column_count(), 15);
        assert_eq!(lattice.min_frame(), (230, 310));

        let cols: Vec<i64> = lattice.columns().collect();
        assert_eq!(cols.first(), Some(&-7));
        assert_eq!(cols.last(), Some(&7));
    }

    #[test]
    fn columns_walk_from_the_bottom_up() {
        let lattice = PatchLattice::new([120, 160], [20, 20]);
        let rows: Vec<i64> = lattice.column(0).map(|w| w.row).collect();
        assert_eq!(rows, vec![210, 190, 170, 150, 130, 110]);

        let left = lattice.window(5, -7);
        assert_eq!((left.row, left.col), (210, 10));
    }

    #[test]
    fn corners_are_pixel_x_then_y() {
        let w = PatchLattice::new([120, 160], [20, 20]).window(0, 0);
        assert_eq!(
            w.corners(),
            [(150.0, 110.0), (170.0, 110.0), (170.0, 130.0), (150.0, 130.0)]
        );
    }

    #[test]
    fn odd_patches_round_half_down() {
        let lattice = PatchLattice::new([120, 160], [15, 25]);
        // (120 - 7) / 15 = 7, (160 - 12) / 25 = 5
        assert_eq!(lattice.row_count(), 8);
        assert_eq!(lattice.column_count(), 11);
        let w = lattice.window(0, 0);
        assert_eq!((w.row, w.col), (113, 148));
    }
}
