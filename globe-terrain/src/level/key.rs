use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one tile of the elevation pyramid.
///
/// Rows count northward from the coverage sector's southern edge and columns
/// count eastward from its western edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKey {
    pub level: usize,
    pub row: u32,
    pub column: u32,
}

impl TileKey {
    pub const fn new(level: usize, row: u32, column: u32) -> Self {
        Self { level, row, column }
    }

    /// The tile one level coarser that contains this tile.
    ///
    /// Returns `None` at level 0.
    pub fn parent(&self) -> Option<TileKey> {
        if self.level == 0 {
            return None;
        }
        Some(TileKey::new(self.level - 1, self.row / 2, self.column / 2))
    }

    /// Iterates from this tile's parent down to level 0.
    pub fn ancestors(&self) -> impl Iterator<Item = TileKey> {
        std::iter::successors(self.parent(), TileKey::parent)
    }

    /// Cache path for this tile's image.
    ///
    /// Follows the `<prefix>/<level>/<row>/<row>_<column>.<extension>` layout.
    pub fn image_path(&self, prefix: &str, extension: &str) -> String {
        format!(
            "{}/{}/{}/{}_{}.{}",
            prefix.trim_end_matches('/'),
            self.level,
            self.row,
            self.row,
            self.column,
            extension
        )
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.level, self.row, self.column)
    }
}
