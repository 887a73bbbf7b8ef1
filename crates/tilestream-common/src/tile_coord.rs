//! Integer tile coordinates on the navigation grid.

use std::cmp::Ordering;
use std::fmt;

/// Address of one navigation tile on the XZ grid.
///
/// Coordinates compare and hash by value; two coordinates naming the same
/// grid cell are interchangeable keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TileCoord {
    /// Column index along the x axis.
    pub x: i32,
    /// Row index along the z axis.
    pub z: i32,
}

impl TileCoord {
    /// Creates a tile coordinate.
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns this coordinate shifted by the given number of tiles per axis.
    #[inline]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }
}

/// Row-major ordering (z first, then x), matching grid iteration order.
impl Ord for TileCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.z, self.x).cmp(&(other.z, other.x))
    }
}

impl PartialOrd for TileCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, z): (i32, i32)) -> Self {
        Self::new(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_value_equality() {
        let a = TileCoord::new(3, 7);
        let b = TileCoord::new(3, 7);
        let c = TileCoord::new(7, 3);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }

    #[test]
    fn test_row_major_ordering() {
        let mut coords = vec![
            TileCoord::new(1, 1),
            TileCoord::new(0, 2),
            TileCoord::new(2, 0),
            TileCoord::new(0, 1),
        ];
        coords.sort_unstable();

        assert_eq!(
            coords,
            vec![
                TileCoord::new(2, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1),
                TileCoord::new(0, 2),
            ]
        );
    }

    #[test]
    fn test_offset() {
        let c = TileCoord::new(5, 5);
        assert_eq!(c.offset(2, 0), TileCoord::new(7, 5));
        assert_eq!(c.offset(-6, -6), TileCoord::new(-1, -1));
    }

    #[test]
    fn test_display() {
        assert_eq!(TileCoord::new(-2, 9).to_string(), "(-2, 9)");
    }
}
