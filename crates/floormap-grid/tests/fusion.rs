use floormap_classify::{ClassifierSpec, PixelParams};
use floormap_core::{FloorClassifier, PatchError, PatchStack, PatchView, RgbFrame, RgbPatch};
use floormap_grid::{
    CellCode, GridConfig, GroundHomography, MapError, OccupancyGrid, OriginId, PoseError,
    PoseSource, RobotPose,
};
use nalgebra::{Matrix4, Point3};

const BLACK: [u8; 3] = [0, 0, 0];
const WHITE: [u8; 3] = [255, 255, 255];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Dark patches are floor, anything with a bright pixel is an obstacle.
struct DarkIsFloor;

impl FloorClassifier for DarkIsFloor {
    fn is_floor(&self, patch: &PatchView<'_>) -> Result<bool, PatchError> {
        Ok(patch.pixels().all(|[r, _, _]| r < 128))
    }
}

struct Broken;

impl FloorClassifier for Broken {
    fn is_floor(&self, _: &PatchView<'_>) -> Result<bool, PatchError> {
        Err(PatchError::EmptyStack)
    }
}

/// Ground `x = 250 - pixel_y`, `y = 160 - pixel_x`: rows further up the
/// image land further ahead, one world unit per pixel.
///
/// With a 600 grid, lattice patch `(i, j)` covers grid rows
/// `[420 - 20i, 440 - 20i)` and cols `[290 - 20j, 310 - 20j)`.
fn camera() -> GroundHomography {
    let mut pose = GroundHomography::from_array(
        [[0.0, -1.0, 250.0], [-1.0, 0.0, 160.0], [0.0, 0.0, 1.0]],
        "world",
    );
    pose.set_origin(OriginId(1));
    pose
}

fn config(grid_size: usize) -> GridConfig {
    GridConfig {
        grid_size,
        ..GridConfig::default()
    }
}

fn frame() -> RgbFrame {
    RgbFrame::filled(320, 240, BLACK)
}

/// Paint lattice patch `(i, j)` of the default lattice.
fn paint(frame: &mut RgbFrame, i: usize, j: i64, rgb: [u8; 3]) {
    let col = (150 + 20 * j) as usize;
    frame.fill_rect(110 + 20 * i, col, 20, 20, rgb);
}

#[test]
fn open_floor_fills_the_whole_lattice() {
    init_logging();
    let pose = camera();
    let mut grid = OccupancyGrid::for_pose(config(600), &pose).expect("grid");

    let report = grid.process_frame(&frame(), &pose, &DarkIsFloor).expect("frame");
    assert_eq!(report.patches_classified, 90);
    assert_eq!(report.floor_patches, 90);
    assert_eq!(report.obstacle_patches, 0);
    assert_eq!(report.columns_stopped, 0);
    assert_eq!(report.cells_written, 90 * 400);

    let counts = grid.counts();
    assert_eq!(counts.floor, 90 * 400);
    assert_eq!(counts.obstacle, 0);
    assert_eq!(grid.cell(430, 300), Some(CellCode::Floor));
    assert_eq!(grid.cell(320, 150), Some(CellCode::Floor));
    assert_eq!(grid.cell(319, 300), Some(CellCode::Unknown));
    assert_eq!(grid.cell(440, 300), Some(CellCode::Unknown));
    assert!(grid.is_traversable(430, 300));
    assert_eq!(grid.cell_at_world(130.0, 0.0), Some(CellCode::Floor));
}

#[test]
fn same_frame_twice_is_idempotent() {
    let pose = camera();
    let mut grid = OccupancyGrid::for_pose(config(600), &pose).expect("grid");
    let mut img = frame();
    paint(&mut img, 2, -3, WHITE);
    paint(&mut img, 4, 5, WHITE);

    grid.process_frame(&img, &pose, &DarkIsFloor).expect("first");
    let once = grid.as_bytes().to_vec();
    grid.process_frame(&img, &pose, &DarkIsFloor).expect("second");
    assert_eq!(grid.as_bytes(), once.as_slice());
}

#[test]
fn update_location_is_idempotent() {
    let mut pose = camera();
    let mut grid = OccupancyGrid::for_pose(config(600), &pose).expect("grid");
    pose.set_pose(42.0, -17.0, 0.3);

    let first = grid.update_location(&pose).expect("first");
    let once = grid.as_bytes().to_vec();
    let second = grid.update_location(&pose).expect("second");
    assert_eq!(first, second);
    assert!(!second.reset);
    assert_eq!(grid.as_bytes(), once.as_slice());
    assert_eq!(grid.counts().explored, 900);
}

#[test]
fn obstacle_stops_its_column() {
    let pose = camera();
    let mut grid = OccupancyGrid::for_pose(config(600), &pose).expect("grid");
    let mut img = frame();
    paint(&mut img, 3, 0, WHITE);

    let report = grid.process_frame(&img, &pose, &DarkIsFloor).expect("frame");
    assert_eq!(report.obstacle_patches, 1);
    assert_eq!(report.columns_stopped, 1);
    // Rows 2, 1 and 0 of column 0 are never looked at.
    assert_eq!(report.patches_classified, 87);
    assert_eq!(report.floor_patches, 86);

    // Nearer patches of the column are floor.
    assert_eq!(grid.cell(330, 300), Some(CellCode::Floor));
    assert_eq!(grid.cell(350, 300), Some(CellCode::Floor));
    // The obstacle patch itself.
    assert_eq!(grid.cell(360, 290), Some(CellCode::Obstacle));
    assert_eq!(grid.cell(379, 309), Some(CellCode::Obstacle));
    // Beyond it nothing is known.
    for row in [380, 400, 430] {
        assert_eq!(grid.cell(row, 300), Some(CellCode::Unknown));
    }
    // The neighbouring column carries on.
    assert_eq!(grid.cell(430, 280), Some(CellCode::Floor));
    assert_eq!(grid.counts().obstacle, 400);
}

#[test]
fn obstacle_in_nearest_row_stops_every_column() {
    let pose = camera();
    let mut grid = OccupancyGrid::for_pose(config(600), &pose).expect("grid");
    let mut img = frame();
    img.fill_rect(210, 0, 30, 320, WHITE);

    let report = grid.process_frame(&img, &pose, &DarkIsFloor).expect("frame");
    assert_eq!(report.patches_classified, 15);
    assert_eq!(report.columns_stopped, 15);
    assert_eq!(report.floor_patches, 0);
    assert_eq!(grid.counts().obstacle, 15 * 400);
    assert_eq!(grid.counts().floor, 0);
}

#[test]
fn explored_cells_block_overlapping_floor_patches() {
    let mut pose = camera();
    let mut grid = OccupancyGrid::for_pose(config(600), &pose).expect("grid");

    // Drive to (130, 0): footprint rows [415, 445), cols [285, 315).
    pose.set_pose(130.0, 0.0, 0.0);
    grid.update_location(&pose).expect("location");
    pose.set_pose(0.0, 0.0, 0.0);

    let report = grid.process_frame(&frame(), &pose, &DarkIsFloor).expect("frame");
    // Lattice rows 0 and 1 of columns -1, 0 and 1 touch the footprint.
    assert_eq!(report.floor_footprints_skipped, 6);
    assert_eq!(report.cells_written, 84 * 400);

    assert_eq!(grid.cell(430, 300), Some(CellCode::Explored));
    assert_eq!(grid.cell(416, 286), Some(CellCode::Explored));
    // Same skipped patch, outside the footprint: left unknown.
    assert_eq!(grid.cell(401, 291), Some(CellCode::Unknown));
    // Untouched patches elsewhere in those rows are floor.
    assert_eq!(grid.cell(410, 250), Some(CellCode::Floor));
    assert_eq!(grid.counts().explored, 900);
}

#[test]
fn obstacles_overwrite_explored_cells() {
    let mut pose = camera();
    let mut grid = OccupancyGrid::for_pose(config(600), &pose).expect("grid");
    pose.set_pose(130.0, 0.0, 0.0);
    grid.update_location(&pose).expect("location");
    pose.set_pose(0.0, 0.0, 0.0);

    let mut img = frame();
    paint(&mut img, 0, 0, WHITE);
    let report = grid.process_frame(&img, &pose, &DarkIsFloor).expect("frame");
    assert_eq!(report.obstacle_patches, 1);

    assert_eq!(grid.cell(430, 300), Some(CellCode::Obstacle));
    // Footprint cells outside the obstacle patch stay explored.
    assert_eq!(grid.cell(417, 300), Some(CellCode::Explored));
    assert_eq!(grid.cell(442, 300), Some(CellCode::Explored));
    assert_eq!(grid.counts().explored, 900 - 400);
}

#[test]
fn origin_change_discards_the_map() {
    let mut pose = camera();
    let mut grid = OccupancyGrid::for_pose(config(600), &pose).expect("grid");
    grid.process_frame(&frame(), &pose, &DarkIsFloor).expect("frame");
    assert!(grid.counts().floor > 0);

    let same = grid.update_location(&pose).expect("location");
    assert!(!same.reset);
    assert!(grid.counts().floor > 0);

    pose.set_origin(OriginId(2));
    let moved = grid.update_location(&pose).expect("location");
    assert!(moved.reset);
    assert_eq!(grid.origin_id(), OriginId(2));
    let counts = grid.counts();
    assert_eq!(counts.floor, 0);
    assert_eq!(counts.explored, 900);
    assert_eq!(counts.unknown, 600 * 600 - 900);
}

#[test]
fn patches_off_the_grid_are_clipped() {
    let pose = camera();
    // Half size 100: lattice rows 0 and 1 land past the last grid row.
    let mut grid = OccupancyGrid::for_pose(config(200), &pose).expect("grid");
    let report = grid.process_frame(&frame(), &pose, &DarkIsFloor).expect("frame");
    assert_eq!(report.patches_classified, 90);
    assert_eq!(report.floor_patches, 90);
    assert_eq!(grid.counts().floor, 4 * 20 * 200);
    assert_eq!(report.cells_written, 4 * 20 * 200);
}

#[test]
fn degenerate_projection_writes_nothing() {
    let mut pose = GroundHomography::from_array(
        [[0.0, 0.0, 5.0], [0.0, 0.0, 5.0], [0.0, 0.0, 1.0]],
        "world",
    );
    pose.set_origin(OriginId(1));
    let mut grid = OccupancyGrid::for_pose(config(100), &pose).expect("grid");

    let report = grid.process_frame(&frame(), &pose, &DarkIsFloor).expect("frame");
    assert_eq!(report.floor_patches, 90);
    assert_eq!(report.cells_written, 0);

    let white = RgbFrame::filled(320, 240, WHITE);
    let report = grid.process_frame(&white, &pose, &DarkIsFloor).expect("frame");
    assert_eq!(report.columns_stopped, 15);
    assert_eq!(report.cells_written, 0);
    assert_eq!(grid.counts().unknown, 100 * 100);
}

#[test]
fn failures_abort_the_frame() {
    let pose = camera();
    let mut grid = OccupancyGrid::for_pose(config(600), &pose).expect("grid");

    let err = grid.process_frame(&frame(), &pose, &Broken).unwrap_err();
    assert_eq!(err, MapError::Patch(PatchError::EmptyStack));
    assert_eq!(grid.counts().unknown, 600 * 600);

    let tiny = RgbFrame::filled(160, 120, BLACK);
    let err = grid.process_frame(&tiny, &pose, &DarkIsFloor).unwrap_err();
    assert!(matches!(err, MapError::Patch(PatchError::OutOfFrame { .. })));

    let elsewhere = GroundHomography::new(nalgebra::Matrix3::identity(), "map");
    let err = grid.process_frame(&frame(), &elsewhere, &DarkIsFloor).unwrap_err();
    assert_eq!(
        err,
        MapError::Pose(PoseError::UnknownFrame("world".to_string()))
    );
}

/// Pose source whose ground points and position are not finite.
struct Lost {
    value: f64,
}

impl PoseSource for Lost {
    fn project_to_ground(&self, _: f64, _: f64) -> Result<Point3<f64>, PoseError> {
        Ok(Point3::new(self.value, self.value, 0.0))
    }

    fn base_to_link(&self, _: &str) -> Result<Matrix4<f64>, PoseError> {
        Ok(Matrix4::identity())
    }

    fn pose(&self) -> Result<RobotPose, PoseError> {
        Ok(RobotPose::new(OriginId(1), self.value, 0.0))
    }
}

#[test]
fn non_finite_location_is_rejected() {
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let pose = Lost { value };
        let mut grid = OccupancyGrid::new(config(100), OriginId(1)).expect("grid");
        let err = grid.update_location(&pose).unwrap_err();
        assert!(matches!(err, MapError::Pose(PoseError::NonFinite { .. })));
        assert_eq!(grid.cell(50, 50), Some(CellCode::Unknown));
        assert_eq!(grid.counts().unknown, 100 * 100);
    }
}

#[test]
fn non_finite_ground_points_abort_the_frame() {
    for value in [f64::NAN, f64::INFINITY] {
        let pose = Lost { value };
        let mut grid = OccupancyGrid::new(config(100), OriginId(1)).expect("grid");
        let err = grid
            .process_frame(&frame(), &pose, &DarkIsFloor)
            .unwrap_err();
        assert!(matches!(err, MapError::Pose(PoseError::NonFinite { .. })));
        assert_eq!(grid.counts().unknown, 100 * 100);
    }
}

#[test]
fn fitted_pixel_classifier_drives_the_map() {
    init_logging();
    let black = RgbPatch::filled(20, 20, BLACK);
    let stack = PatchStack::from_patches(&[black.clone(), black]).expect("stack");
    let classifier = ClassifierSpec::Pixel(PixelParams::default())
        .fit(&stack)
        .expect("fit");

    let pose = camera();
    let mut grid = OccupancyGrid::for_pose(config(600), &pose).expect("grid");
    let mut img = frame();
    paint(&mut img, 1, -2, [200, 30, 30]);

    let report = grid.process_frame(&img, &pose, &classifier).expect("frame");
    assert_eq!(report.obstacle_patches, 1);
    // Lattice (1, -2) covers rows [400, 420), cols [330, 350).
    assert_eq!(grid.cell(410, 340), Some(CellCode::Obstacle));
    assert_eq!(grid.cell(430, 340), Some(CellCode::Unknown));
}
