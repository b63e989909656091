use serde::{Deserialize, Serialize};

/// State of one grid cell, stored in the buffer as its byte value.
///
/// The byte values double as a grayscale palette: obstacles render black,
/// floor light grey and explored cells white.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CellCode {
    Obstacle = 0,
    Unknown = 100,
    Floor = 150,
    Explored = 255,
}

impl CellCode {
    /// Decode a buffer byte; bytes that are not a cell code give `None`.
    #[inline]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CellCode::Obstacle),
            100 => Some(CellCode::Unknown),
            150 => Some(CellCode::Floor),
            255 => Some(CellCode::Explored),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Floor the robot saw or has driven over.
    #[inline]
    pub fn is_traversable(self) -> bool {
        matches!(self, CellCode::Floor | CellCode::Explored)
    }
}

impl From<CellCode> for u8 {
    fn from(code: CellCode) -> Self {
        code as u8
    }
}

/// Number of cells in each state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCounts {
    pub unknown: usize,
    pub floor: usize,
    pub obstacle: usize,
    pub explored: usize,
}

impl CellCounts {
    pub(crate) fn tally(cells: &[u8]) -> Self {
        let mut counts = Self::default();
        for &b in cells {
            match CellCode::from_u8(b) {
                Some(CellCode::Obstacle) => counts.obstacle += 1,
                Some(CellCode::Floor) => counts.floor += 1,
                Some(CellCode::Explored) => counts.explored += 1,
                Some(CellCode::Unknown) | None => counts.unknown += 1,
            }
        }
        counts
    }

    /// Cells that hold any observation.
    pub fn known(&self) -> usize {
        self.floor + self.obstacle + self.explored
    }

    pub fn total(&self) -> usize {
        self.known() + self.unknown
    }
}
