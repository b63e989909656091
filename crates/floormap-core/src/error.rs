use crate::PatchShape;

/// Shape and bounds violations on patches, calibration stacks and frames.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("calibration input must be 4-dimensional (N, H, W, C), got {ndim} dimensions")]
    NotFourDimensional { ndim: usize },

    #[error("expected {expected} colour channels, got {got}")]
    UnsupportedChannels { expected: usize, got: usize },

    #[error("buffer length does not match shape (expected {expected} bytes, got {got})")]
    DataLength { expected: usize, got: usize },

    #[error("patch dimensions must be non-zero (got {0})")]
    EmptyPatch(PatchShape),

    #[error("shape {0:?} is too large to address")]
    TooLarge(Vec<usize>),

    #[error("calibration stack holds no patches")]
    EmptyStack,

    #[error("patch shape {got} does not match fitted shape {expected}")]
    ShapeMismatch {
        expected: PatchShape,
        got: PatchShape,
    },

    #[error(
        "patch window rows {row}..{row_end}, cols {col}..{col_end} leaves the {frame_height}x{frame_width} frame"
    )]
    OutOfFrame {
        row: i64,
        row_end: i64,
        col: i64,
        col_end: i64,
        frame_height: usize,
        frame_width: usize,
    },
}
