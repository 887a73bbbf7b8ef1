//! Mesh interface consumed by the streaming layer.

use glam::Vec3;
use tilestream_common::{BoundingBox, Result, TileCoord};

use crate::tile_data::TileData;

/// Tile-residency surface of a navigation mesh.
///
/// The streaming manager drives a mesh only through this trait, so any
/// engine mesh with per-tile loading can be adapted to it without touching
/// the manager. Implementations are expected to keep grid dimensions and
/// tile indexing stable across [`StreamableMesh::allocate`]; only residency
/// changes.
pub trait StreamableMesh {
    /// Whether the mesh was last populated by a full build.
    fn is_fully_built(&self) -> bool;

    /// Grid dimensions as (columns, rows).
    fn get_num_tiles(&self) -> (i32, i32);

    /// Tile coordinate containing a world-space position.
    ///
    /// Not clamped; positions outside the grid map to out-of-range
    /// coordinates.
    fn get_tile_index(&self, pos: Vec3) -> TileCoord;

    /// World-space bounds of the whole grid.
    fn get_bounding_box(&self) -> BoundingBox;

    /// Whether a tile is resident at `coord`.
    fn has_tile(&self, coord: TileCoord) -> bool;

    /// Serialized payload of the resident tile at `coord`.
    fn get_tile_data(&self, coord: TileCoord) -> Option<TileData>;

    /// Installs a tile from its serialized payload, returning the coordinate
    /// it landed on.
    ///
    /// Fails when a tile is already resident at the payload's coordinate or
    /// when every tile slot is in use.
    fn add_tile(&mut self, data: &TileData) -> Result<TileCoord>;

    /// Evicts the resident tile at `coord`.
    fn remove_tile(&mut self, coord: TileCoord) -> Result<()>;

    /// Discards all tiles and reinitializes the mesh as an empty container
    /// with `max_tiles` slots covering `bounds`.
    fn allocate(&mut self, bounds: BoundingBox, max_tiles: i32) -> Result<()>;

    /// Rebuilds every tile from source geometry, replacing all residency
    /// state.
    fn build(&mut self) -> Result<()>;
}
