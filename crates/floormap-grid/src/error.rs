use floormap_core::PatchError;
use thiserror::Error;

/// Failure reported by a [`PoseSource`](crate::PoseSource).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoseError {
    #[error("pixel ({x}, {y}) does not project onto the ground plane")]
    NotOnGround { x: f64, y: f64 },
    #[error("unknown frame `{0}`")]
    UnknownFrame(String),
    #[error("pose unavailable: {0}")]
    Unavailable(String),
    #[error("non-finite world coordinates ({x}, {y})")]
    NonFinite { x: f64, y: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid size must be non-zero")]
    EmptyGrid,
    #[error("grid size {0} is too large to allocate")]
    GridTooLarge(usize),
    #[error("patch size {height}x{width} has a zero dimension")]
    EmptyPatch { height: usize, width: usize },
    #[error("camera centre {center:?} is closer than half a patch {patch:?} to the frame edge")]
    CenterTooClose {
        center: [usize; 2],
        patch: [usize; 2],
    },
    #[error("robot footprint must be non-zero")]
    EmptyFootprint,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Pose(#[from] PoseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
