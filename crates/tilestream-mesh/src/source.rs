//! Tile content sources.
//!
//! A [`TileSource`] stands in for scene geometry: asked for a grid cell, it
//! produces the cell's navigable contents, or nothing when the cell has no
//! walkable area. Cells that produce nothing never exist in the mesh or in
//! any payload cache captured from it.

use tilestream_common::{BoundingBox, TileCoord};

use crate::tile_data::TileRecord;

/// Area id assigned to walkable polygons.
pub const WALKABLE_AREA: u8 = 63;

/// Produces navigation tile contents for grid cells.
pub trait TileSource {
    /// Builds the contents of the cell at `coord` covering `bounds`, or
    /// `None` when the cell contains no navigable area.
    fn build_tile(&self, coord: TileCoord, bounds: &BoundingBox) -> Option<TileRecord>;
}

/// Walkable ground plane with axis-aligned obstructions.
///
/// Every cell yields one walkable quad at the plane height unless an
/// obstruction fully covers the cell's footprint, in which case the cell
/// yields nothing.
#[derive(Debug, Clone, Default)]
pub struct PlanarSource {
    obstructions: Vec<BoundingBox>,
}

impl PlanarSource {
    /// Creates an unobstructed plane.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a plane with the given obstructions.
    pub fn with_obstructions(obstructions: Vec<BoundingBox>) -> Self {
        Self { obstructions }
    }

    /// Adds an obstruction.
    pub fn add_obstruction(&mut self, bounds: BoundingBox) {
        self.obstructions.push(bounds);
    }

    /// Removes all obstructions.
    pub fn clear_obstructions(&mut self) {
        self.obstructions.clear();
    }

    /// Current obstructions.
    pub fn get_obstructions(&self) -> &[BoundingBox] {
        &self.obstructions
    }
}

/// Whether `obstruction` covers the full footprint of `cell` on the XZ
/// plane. Height is ignored; an obstruction blocks its footprint outright.
fn covers_cell(obstruction: &BoundingBox, cell: &BoundingBox) -> bool {
    obstruction.min.x <= cell.min.x
        && obstruction.max.x >= cell.max.x
        && obstruction.min.z <= cell.min.z
        && obstruction.max.z >= cell.max.z
}

impl TileSource for PlanarSource {
    fn build_tile(&self, coord: TileCoord, bounds: &BoundingBox) -> Option<TileRecord> {
        if self.obstructions.iter().any(|o| covers_cell(o, bounds)) {
            return None;
        }

        let y = bounds.min.y;
        Some(TileRecord {
            coord,
            bmin: bounds.min.to_array(),
            bmax: bounds.max.to_array(),
            verts_per_poly: 4,
            verts: vec![
                bounds.min.x, y, bounds.min.z, //
                bounds.max.x, y, bounds.min.z, //
                bounds.max.x, y, bounds.max.z, //
                bounds.min.x, y, bounds.max.z,
            ],
            polys: vec![0, 1, 2, 3],
            areas: vec![WALKABLE_AREA],
        })
    }
}
