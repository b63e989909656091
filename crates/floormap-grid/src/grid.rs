use floormap_core::{FloorClassifier, RgbFrame};
use log::{debug, info, trace};
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::raster::polygon_cells;
use crate::{
    CellCode, CellCounts, ConfigError, GridConfig, MapError, OriginId, PatchLattice, PatchWindow,
    PoseError, PoseSource,
};

/// What one frame contributed to the map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    pub patches_classified: usize,
    pub floor_patches: usize,
    pub obstacle_patches: usize,
    /// Lattice columns cut short by an obstacle.
    pub columns_stopped: usize,
    /// Cell writes, counting a cell once per patch that wrote it.
    pub cells_written: usize,
    /// Floor patches not written because they overlap explored cells.
    pub floor_footprints_skipped: usize,
}

/// Result of [`OccupancyGrid::update_location`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationUpdate {
    /// The origin changed and the map was wiped first.
    pub reset: bool,
    /// Grid index of the robot position (may lie outside the grid).
    pub row: i64,
    pub col: i64,
    pub cells_marked: usize,
}

/// Square top-down map, one byte per cell, indexed `[row][col]` with the
/// row following world x and the column following world y.
///
/// Write rules:
/// - an obstacle patch always writes [`CellCode::Obstacle`];
/// - a floor patch writes [`CellCode::Floor`] only if none of its cells is
///   [`CellCode::Explored`];
/// - the robot footprint always writes [`CellCode::Explored`].
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    config: GridConfig,
    lattice: PatchLattice,
    cells: Vec<u8>,
    origin_id: OriginId,
}

impl OccupancyGrid {
    /// An all-unknown grid tied to `origin_id`.
    pub fn new(config: GridConfig, origin_id: OriginId) -> Result<Self, MapError> {
        config.validate()?;
        let lattice = PatchLattice::from_config(&config);
        let n = config
            .cell_count()
            .ok_or(ConfigError::GridTooLarge(config.grid_size))?;
        debug!(
            "occupancy grid {0}x{0}, {1} lattice columns of {2} patches",
            config.grid_size,
            lattice.column_count(),
            lattice.row_count()
        );
        Ok(Self {
            config,
            lattice,
            cells: vec![CellCode::Unknown.as_u8(); n],
            origin_id,
        })
    }

    /// An all-unknown grid tied to the pose source's current origin.
    pub fn for_pose<P: PoseSource + ?Sized>(
        config: GridConfig,
        pose: &P,
    ) -> Result<Self, MapError> {
        let origin = pose.pose()?.origin_id;
        Self::new(config, origin)
    }

    /// Classify every lattice patch of `frame` and fuse the results.
    ///
    /// Each lattice column is walked from the bottom of the frame upwards
    /// and stops at its first obstacle: patches above an obstacle may not lie
    /// on the floor, so their ground projection is meaningless. The frame is
    /// assumed to be taken at the pose `pose` currently reports.
    ///
    /// Errors abort the frame; cells written by earlier patches stay.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, frame, pose, classifier),
            fields(width = frame.width, height = frame.height)
        )
    )]
    pub fn process_frame<P, C>(
        &mut self,
        frame: &RgbFrame,
        pose: &P,
        classifier: &C,
    ) -> Result<FrameReport, MapError>
    where
        P: PoseSource + ?Sized,
        C: FloorClassifier + ?Sized,
    {
        let base_to_world = pose.base_to_link(&self.config.world_frame)?;
        let lattice = self.lattice;
        let mut report = FrameReport::default();

        for j in lattice.columns() {
            for window in lattice.column(j) {
                let patch = frame.extract(window.row, window.col, window.height, window.width)?;
                let cells = self.window_cells(&window, pose, &base_to_world)?;

                report.patches_classified += 1;
                if !classifier.is_floor(&patch.view())? {
                    report.obstacle_patches += 1;
                    report.columns_stopped += 1;
                    report.cells_written += self.fill(&cells, CellCode::Obstacle);
                    trace!(
                        "obstacle at lattice ({}, {}), column stopped",
                        window.lattice_row,
                        window.lattice_col
                    );
                    break;
                }

                report.floor_patches += 1;
                if cells.is_empty() {
                    continue;
                }
                if cells
                    .iter()
                    .any(|&i| self.cells[i] == CellCode::Explored.as_u8())
                {
                    report.floor_footprints_skipped += 1;
                    continue;
                }
                report.cells_written += self.fill(&cells, CellCode::Floor);
            }
        }

        debug!(
            "frame fused: {} patches ({} floor, {} obstacle), {} cells written",
            report.patches_classified,
            report.floor_patches,
            report.obstacle_patches,
            report.cells_written
        );
        Ok(report)
    }

    /// Alias of [`OccupancyGrid::process_frame`].
    pub fn process_patch<P, C>(
        &mut self,
        frame: &RgbFrame,
        pose: &P,
        classifier: &C,
    ) -> Result<FrameReport, MapError>
    where
        P: PoseSource + ?Sized,
        C: FloorClassifier + ?Sized,
    {
        self.process_frame(frame, pose, classifier)
    }

    /// Flat indices of the grid cells under a patch's ground footprint.
    fn window_cells<P: PoseSource + ?Sized>(
        &self,
        window: &PatchWindow,
        pose: &P,
        base_to_world: &Matrix4<f64>,
    ) -> Result<Vec<usize>, MapError> {
        let mut corners = [(0.0, 0.0); 4];
        for (dst, (px, py)) in corners.iter_mut().zip(window.corners()) {
            let ground = pose.project_to_ground(px, py)?;
            let world = base_to_world * ground.to_homogeneous();
            let (row, col) = self.checked_world_to_grid(world.x, world.y)?;
            *dst = (row as f64, col as f64);
        }
        let n = self.config.grid_size;
        Ok(polygon_cells(&corners, n, n)
            .into_iter()
            .map(|(r, c)| r * n + c)
            .collect())
    }

    fn fill(&mut self, cells: &[usize], code: CellCode) -> usize {
        let v = code.as_u8();
        for &i in cells {
            self.cells[i] = v;
        }
        cells.len()
    }

    /// Mark the robot footprint explored, wiping the map first if the pose
    /// origin changed since the last call.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, pose)))]
    pub fn update_location<P: PoseSource + ?Sized>(
        &mut self,
        pose: &P,
    ) -> Result<LocationUpdate, MapError> {
        let current = pose.pose()?;
        let reset = current.origin_id != self.origin_id;
        if reset {
            info!(
                "pose origin changed {:?} -> {:?}, clearing map",
                self.origin_id, current.origin_id
            );
            self.reset();
            self.origin_id = current.origin_id;
        }

        let (row, col) = self.checked_world_to_grid(current.position.x, current.position.y)?;
        let cells_marked = self.mark_footprint(row, col);
        trace!("robot at grid ({row}, {col}), {cells_marked} cells explored");
        Ok(LocationUpdate {
            reset,
            row,
            col,
            cells_marked,
        })
    }

    /// Square of side `footprint` starting `footprint / 2` before the centre,
    /// clipped to the grid.
    fn mark_footprint(&mut self, row: i64, col: i64) -> usize {
        let n = self.config.grid_size as i64;
        let side = self.config.footprint as i64;
        let r0 = row.saturating_sub(side / 2);
        let c0 = col.saturating_sub(side / 2);
        let (r_lo, r_hi) = (r0.clamp(0, n), r0.saturating_add(side).clamp(0, n));
        let (c_lo, c_hi) = (c0.clamp(0, n), c0.saturating_add(side).clamp(0, n));

        let v = CellCode::Explored.as_u8();
        let n = n as usize;
        for r in r_lo as usize..r_hi as usize {
            self.cells[r * n + c_lo as usize..r * n + c_hi as usize].fill(v);
        }
        ((r_hi - r_lo) * (c_hi - c_lo)) as usize
    }

    /// Forget everything: all cells back to unknown.
    pub fn reset(&mut self) {
        let n = self.config.grid_size;
        self.cells = vec![CellCode::Unknown.as_u8(); n * n];
    }

    /// Grid index of a world point: both coordinates truncated toward zero,
    /// then shifted by half the grid size. May be out of range.
    #[inline]
    pub fn world_to_grid(&self, x: f64, y: f64) -> (i64, i64) {
        let half = self.config.half_size();
        ((x as i64).saturating_add(half), (y as i64).saturating_add(half))
    }

    /// [`Self::world_to_grid`] for collaborator data: NaN or infinite
    /// coordinates are an error instead of a clamped index.
    fn checked_world_to_grid(&self, x: f64, y: f64) -> Result<(i64, i64), PoseError> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(PoseError::NonFinite { x, y });
        }
        Ok(self.world_to_grid(x, y))
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<CellCode> {
        let n = self.config.grid_size;
        if row >= n || col >= n {
            return None;
        }
        CellCode::from_u8(self.cells[row * n + col])
    }

    pub fn cell_at_world(&self, x: f64, y: f64) -> Option<CellCode> {
        let (row, col) = self.world_to_grid(x, y);
        if row < 0 || col < 0 {
            return None;
        }
        self.cell(row as usize, col as usize)
    }

    /// Floor seen by the camera or driven over.
    pub fn is_traversable(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some_and(CellCode::is_traversable)
    }

    /// Row-major cell bytes, `size() * size()` long.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Side length in cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.config.grid_size
    }

    pub fn counts(&self) -> CellCounts {
        CellCounts::tally(&self.cells)
    }

    pub fn origin_id(&self) -> OriginId {
        self.origin_id
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn lattice(&self) -> &PatchLattice {
        &self.lattice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RobotPose;
    use nalgebra::Point3;

    struct Fixed(RobotPose);

    impl PoseSource for Fixed {
        fn project_to_ground(&self, _: f64, _: f64) -> Result<Point3<f64>, PoseError> {
            Ok(Point3::origin())
        }

        fn base_to_link(&self, _: &str) -> Result<Matrix4<f64>, PoseError> {
            Ok(Matrix4::identity())
        }

        fn pose(&self) -> Result<RobotPose, PoseError> {
            Ok(self.0)
        }
    }

    fn small() -> GridConfig {
        GridConfig {
            grid_size: 100,
            ..GridConfig::default()
        }
    }

    #[test]
    fn starts_unknown() {
        let grid = OccupancyGrid::new(small(), OriginId(1)).expect("grid");
        assert_eq!(grid.size(), 100);
        assert_eq!(grid.as_bytes().len(), 100 * 100);
        assert!(grid.as_bytes().iter().all(|&b| b == 100));
        assert_eq!(grid.counts().unknown, 10_000);
        assert_eq!(grid.cell(100, 0), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = GridConfig {
            grid_size: 0,
            ..GridConfig::default()
        };
        assert!(matches!(
            OccupancyGrid::new(cfg, OriginId(0)),
            Err(MapError::Config(_))
        ));
    }

    #[test]
    fn world_to_grid_truncates_toward_zero() {
        let grid = OccupancyGrid::new(small(), OriginId(1)).expect("grid");
        assert_eq!(grid.world_to_grid(0.0, 0.0), (50, 50));
        assert_eq!(grid.world_to_grid(1.9, -1.9), (51, 49));
        assert_eq!(grid.world_to_grid(-0.5, 0.5), (50, 50));
        assert_eq!(grid.world_to_grid(-60.0, 0.0), (-10, 50));
        assert_eq!(grid.cell_at_world(-60.0, 0.0), None);
    }

    #[test]
    fn footprint_is_thirty_cells_square() {
        let mut grid = OccupancyGrid::new(small(), OriginId(1)).expect("grid");
        let pose = Fixed(RobotPose::new(OriginId(1), 0.0, 0.0));
        let update = grid.update_location(&pose).expect("update");
        assert!(!update.reset);
        assert_eq!((update.row, update.col), (50, 50));
        assert_eq!(update.cells_marked, 900);

        for r in 0..100 {
            for c in 0..100 {
                let inside = (35..65).contains(&r) && (35..65).contains(&c);
                let expected = if inside {
                    CellCode::Explored
                } else {
                    CellCode::Unknown
                };
                assert_eq!(grid.cell(r, c), Some(expected), "cell ({r}, {c})");
            }
        }
    }

    #[test]
    fn footprint_is_clipped_at_the_border() {
        let mut grid = OccupancyGrid::new(small(), OriginId(1)).expect("grid");
        let pose = Fixed(RobotPose::new(OriginId(1), -45.0, 45.0));
        let update = grid.update_location(&pose).expect("update");
        assert_eq!((update.row, update.col), (5, 95));
        // rows [-10, 20) -> [0, 20), cols [80, 110) -> [80, 100)
        assert_eq!(update.cells_marked, 20 * 20);
        assert_eq!(grid.counts().explored, 400);

        let far = Fixed(RobotPose::new(OriginId(1), 500.0, 0.0));
        assert_eq!(grid.update_location(&far).expect("update").cells_marked, 0);
    }

    #[test]
    fn origin_change_wipes_the_map() {
        let mut grid = OccupancyGrid::new(small(), OriginId(1)).expect("grid");
        grid.update_location(&Fixed(RobotPose::new(OriginId(1), 0.0, 0.0)))
            .expect("update");

        let update = grid
            .update_location(&Fixed(RobotPose::new(OriginId(2), 20.0, 20.0)))
            .expect("update");
        assert!(update.reset);
        assert_eq!(grid.origin_id(), OriginId(2));
        assert_eq!(grid.cell(50, 50), Some(CellCode::Unknown));
        assert_eq!(grid.cell(70, 70), Some(CellCode::Explored));
        assert_eq!(grid.counts().explored, 900);
        assert_eq!(grid.counts().unknown, 10_000 - 900);
    }
}
