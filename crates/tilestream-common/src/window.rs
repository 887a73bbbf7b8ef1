//! Streaming window math.
//!
//! The streaming window is the rectangle of tiles kept resident around a
//! tracked position. It is derived state: recomputed from the tracked tile
//! and the grid dimensions on every update, never stored across ticks.

use crate::TileCoord;

/// Inclusive rectangle of tile coordinates, clamped to the mesh grid.
///
/// A window near a grid edge is smaller than `(2 * radius + 1)^2`; a center
/// outside the grid entirely can produce an empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TileWindow {
    /// Lowest contained coordinate.
    pub min: TileCoord,
    /// Highest contained coordinate.
    pub max: TileCoord,
}

impl TileWindow {
    /// Builds the window of tiles within `radius` rings of `center`, clamped
    /// to a grid of `num_tiles` (columns, rows) starting at (0, 0).
    ///
    /// `radius` must be non-negative.
    pub fn from_center_clamped(center: TileCoord, radius: i32, num_tiles: (i32, i32)) -> Self {
        let (nx, nz) = num_tiles;
        Self {
            min: TileCoord::new((center.x - radius).max(0), (center.z - radius).max(0)),
            max: TileCoord::new((center.x + radius).min(nx - 1), (center.z + radius).min(nz - 1)),
        }
    }

    /// Whether `coord` falls inside the window.
    #[inline]
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.min.x && coord.x <= self.max.x && coord.z >= self.min.z && coord.z <= self.max.z
    }

    /// Whether the window contains no coordinates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.z < self.min.z
    }

    /// Number of coordinates in the window.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            ((self.max.x - self.min.x + 1) as usize) * ((self.max.z - self.min.z + 1) as usize)
        }
    }

    /// Iterates the contained coordinates row by row (z outer, x inner).
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> {
        let min = self.min;
        let max = self.max;
        (min.z..=max.z).flat_map(move |z| (min.x..=max.x).map(move |x| TileCoord::new(x, z)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_window() {
        let w = TileWindow::from_center_clamped(TileCoord::new(5, 5), 2, (10, 10));

        assert_eq!(w.min, TileCoord::new(3, 3));
        assert_eq!(w.max, TileCoord::new(7, 7));
        assert_eq!(w.len(), 25);
        assert!(!w.is_empty());
        assert!(w.contains(TileCoord::new(3, 7)));
        assert!(!w.contains(TileCoord::new(8, 5)));
    }

    #[test]
    fn test_clamped_at_corner() {
        let w = TileWindow::from_center_clamped(TileCoord::new(0, 0), 2, (5, 5));

        assert_eq!(w.min, TileCoord::new(0, 0));
        assert_eq!(w.max, TileCoord::new(2, 2));
        assert_eq!(w.len(), 9);
    }

    #[test]
    fn test_clamped_at_far_edge() {
        let w = TileWindow::from_center_clamped(TileCoord::new(9, 9), 2, (10, 10));

        assert_eq!(w.min, TileCoord::new(7, 7));
        assert_eq!(w.max, TileCoord::new(9, 9));
        assert_eq!(w.len(), 9);
    }

    #[test]
    fn test_center_outside_grid_is_empty() {
        let w = TileWindow::from_center_clamped(TileCoord::new(-5, 3), 2, (10, 10));

        assert!(w.is_empty());
        assert_eq!(w.len(), 0);
        assert_eq!(w.coords().count(), 0);
        assert!(!w.contains(TileCoord::new(0, 3)));
    }

    #[test]
    fn test_radius_zero_is_single_tile() {
        let w = TileWindow::from_center_clamped(TileCoord::new(4, 6), 0, (10, 10));

        assert_eq!(w.len(), 1);
        assert_eq!(w.coords().collect::<Vec<_>>(), vec![TileCoord::new(4, 6)]);
    }

    #[test]
    fn test_coords_are_row_major() {
        let w = TileWindow::from_center_clamped(TileCoord::new(1, 1), 1, (4, 4));
        let coords: Vec<_> = w.coords().collect();

        assert_eq!(coords.len(), 9);
        assert_eq!(coords[0], TileCoord::new(0, 0));
        assert_eq!(coords[1], TileCoord::new(1, 0));
        assert_eq!(coords[2], TileCoord::new(2, 0));
        assert_eq!(coords[3], TileCoord::new(0, 1));
        assert_eq!(coords[8], TileCoord::new(2, 2));

        let mut sorted = coords.clone();
        sorted.sort_unstable();
        assert_eq!(coords, sorted);
    }
}
