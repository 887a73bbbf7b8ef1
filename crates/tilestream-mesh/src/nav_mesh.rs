//! Tile-addressable navigation mesh container.
//!
//! Tiles live in a slot vector with a free list and a coordinate lookup, so
//! installs and evictions stay O(1) regardless of grid size.

use std::collections::HashMap;

use glam::Vec3;
use tilestream_common::{BoundingBox, Error, Result, TileCoord};

use crate::params::NavMeshParams;
use crate::source::TileSource;
use crate::streamable::StreamableMesh;
use crate::tile_data::{TileData, TileRecord};

/// One resident navigation tile.
#[derive(Debug, Clone)]
pub struct MeshTile {
    /// Grid coordinate of the tile.
    pub coord: TileCoord,
    /// World-space bounds of the tile.
    pub bounds: BoundingBox,
    /// Serialized payload the tile was installed from.
    pub data: TileData,
}

/// Tile-addressable navigation mesh over a [`TileSource`].
///
/// The mesh owns its source and can rebuild from it at any time: a full
/// [`NavMesh::build`] re-creates every grid cell, while
/// [`NavMesh::build_partial`] refreshes only a changed region. For
/// streaming, [`NavMesh::allocate`] reinitializes the mesh empty with a
/// bounded slot budget; tiles then arrive one payload at a time through
/// [`NavMesh::add_tile`].
#[derive(Debug)]
pub struct NavMesh<S> {
    /// Grid parameters, fixed at construction.
    params: NavMeshParams,
    /// World-space bounds of the mesh.
    bounds: BoundingBox,
    /// Source geometry the mesh builds from.
    source: S,
    /// Tile slots; `None` marks a vacant slot.
    tiles: Vec<Option<MeshTile>>,
    /// Vacant slot indices available for reuse.
    free_list: Vec<usize>,
    /// Coordinate to occupied slot index.
    pos_lookup: HashMap<TileCoord, usize>,
    /// Set by a full build, cleared by an allocation.
    fully_built: bool,
}

impl<S: TileSource> NavMesh<S> {
    /// Creates an empty mesh over `source`.
    ///
    /// The mesh holds no tiles until [`NavMesh::build`] or
    /// [`NavMesh::add_tile`] populates it.
    pub fn new(params: NavMeshParams, source: S) -> Result<Self> {
        params.validate()?;

        let bounds = params.grid_bounds();
        let capacity = params.max_tiles as usize;
        Ok(Self {
            params,
            bounds,
            source,
            tiles: (0..capacity).map(|_| None).collect(),
            free_list: (0..capacity).rev().collect(),
            pos_lookup: HashMap::new(),
            fully_built: false,
        })
    }

    /// Clears all residency state and resizes to `capacity` slots.
    fn reset_slots(&mut self, capacity: usize) {
        self.tiles.clear();
        self.tiles.resize_with(capacity, || None);
        self.free_list = (0..capacity).rev().collect();
        self.pos_lookup.clear();
    }

    /// Places a tile into a vacant slot and indexes it.
    fn install_tile(&mut self, tile: MeshTile) -> Result<TileCoord> {
        let coord = tile.coord;
        let (nx, nz) = self.params.num_tiles();
        if coord.x < 0 || coord.x >= nx || coord.z < 0 || coord.z >= nz {
            return Err(Error::TileData(format!(
                "tile coordinate {coord} outside {nx}x{nz} grid"
            )));
        }

        if self.pos_lookup.contains_key(&coord) {
            return Err(Error::InvalidMesh(format!(
                "tile {coord} is already present"
            )));
        }

        let slot = match self.free_list.pop() {
            Some(slot) => slot,
            None => {
                return Err(Error::InvalidMesh(format!(
                    "no free tile slot for {coord} ({} in use)",
                    self.pos_lookup.len()
                )));
            }
        };

        self.tiles[slot] = Some(tile);
        self.pos_lookup.insert(coord, slot);
        log::debug!("added tile {coord} in slot {slot}");

        Ok(coord)
    }

    /// Rebuilds the whole grid from the tile source.
    pub fn build(&mut self) -> Result<()> {
        self.bounds = self.params.grid_bounds();
        self.reset_slots(self.params.max_tiles as usize);

        let (nx, nz) = self.params.num_tiles();
        let mut built = 0usize;
        for z in 0..nz {
            for x in 0..nx {
                let coord = TileCoord::new(x, z);
                let cell = self.params.tile_bounds(coord);
                if let Some(record) = self.source.build_tile(coord, &cell) {
                    let data = record.to_bytes()?;
                    self.install_tile(MeshTile {
                        coord,
                        bounds: BoundingBox::new(record.bmin.into(), record.bmax.into()),
                        data,
                    })?;
                    built += 1;
                }
            }
        }

        self.fully_built = true;
        log::info!(
            "built navigation mesh: {built} of {} cells hold tiles",
            (nx as i64) * (nz as i64)
        );

        Ok(())
    }

    /// Rebuilds only the cells whose bounds intersect `region`.
    ///
    /// Used after local geometry changes while the mesh is monolithic.
    /// Requires a prior full build.
    pub fn build_partial(&mut self, region: &BoundingBox) -> Result<()> {
        if !self.fully_built {
            return Err(Error::InvalidMesh(
                "partial rebuild requires a fully built mesh".to_string(),
            ));
        }

        let (nx, nz) = self.params.num_tiles();
        let mut touched = 0usize;
        for z in 0..nz {
            for x in 0..nx {
                let coord = TileCoord::new(x, z);
                let cell = self.params.tile_bounds(coord);
                if !cell.intersects(region) {
                    continue;
                }

                if self.pos_lookup.contains_key(&coord) {
                    self.remove_tile(coord)?;
                }
                if let Some(record) = self.source.build_tile(coord, &cell) {
                    let data = record.to_bytes()?;
                    self.install_tile(MeshTile {
                        coord,
                        bounds: BoundingBox::new(record.bmin.into(), record.bmax.into()),
                        data,
                    })?;
                }
                touched += 1;
            }
        }

        log::debug!("partial rebuild touched {touched} cells");
        Ok(())
    }

    /// Discards all tiles and reinitializes the mesh with `max_tiles` slots
    /// covering `bounds`.
    ///
    /// Clears the fully-built flag; tiles arrive only through
    /// [`NavMesh::add_tile`] afterwards. Grid dimensions and tile indexing
    /// are unchanged.
    pub fn allocate(&mut self, bounds: BoundingBox, max_tiles: i32) -> Result<()> {
        if max_tiles <= 0 {
            return Err(Error::InvalidMesh(
                "tile capacity must be positive".to_string(),
            ));
        }

        self.bounds = bounds;
        self.reset_slots(max_tiles as usize);
        self.fully_built = false;
        log::info!("allocated empty mesh with {max_tiles} tile slots");

        Ok(())
    }

    /// Installs a tile from its serialized payload.
    pub fn add_tile(&mut self, data: &TileData) -> Result<TileCoord> {
        let record = TileRecord::from_bytes(data)?;
        self.install_tile(MeshTile {
            coord: record.coord,
            bounds: BoundingBox::new(record.bmin.into(), record.bmax.into()),
            data: data.clone(),
        })
    }

    /// Evicts the resident tile at `coord`.
    pub fn remove_tile(&mut self, coord: TileCoord) -> Result<()> {
        let slot = match self.pos_lookup.remove(&coord) {
            Some(slot) => slot,
            None => return Err(Error::InvalidMesh(format!("no tile at {coord}"))),
        };

        self.tiles[slot] = None;
        self.free_list.push(slot);
        log::debug!("removed tile {coord} from slot {slot}");

        Ok(())
    }

    /// Whether the mesh was last populated by a full build.
    pub fn is_fully_built(&self) -> bool {
        self.fully_built
    }

    /// Grid dimensions as (columns, rows).
    pub fn get_num_tiles(&self) -> (i32, i32) {
        self.params.num_tiles()
    }

    /// Number of tiles currently resident.
    pub fn get_tile_count(&self) -> usize {
        self.pos_lookup.len()
    }

    /// Number of tile slots, occupied or vacant.
    pub fn get_max_tiles(&self) -> usize {
        self.tiles.len()
    }

    /// Gets the grid parameters.
    pub fn get_params(&self) -> &NavMeshParams {
        &self.params
    }

    /// World-space bounds of the mesh.
    pub fn get_bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    /// Tile coordinate containing a world-space position.
    pub fn get_tile_index(&self, pos: Vec3) -> TileCoord {
        self.params.tile_index(pos)
    }

    /// Resident tile at `coord`.
    pub fn get_tile_at(&self, coord: TileCoord) -> Option<&MeshTile> {
        self.pos_lookup
            .get(&coord)
            .and_then(|&slot| self.tiles[slot].as_ref())
    }

    /// Whether a tile is resident at `coord`.
    pub fn has_tile(&self, coord: TileCoord) -> bool {
        self.pos_lookup.contains_key(&coord)
    }

    /// Payload of the resident tile at `coord`.
    pub fn get_tile_data(&self, coord: TileCoord) -> Option<TileData> {
        self.get_tile_at(coord).map(|tile| tile.data.clone())
    }

    /// Source geometry access.
    pub fn get_source(&self) -> &S {
        &self.source
    }

    /// Mutable source geometry access, for toggling obstructions between
    /// rebuilds.
    pub fn get_source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: TileSource> StreamableMesh for NavMesh<S> {
    fn is_fully_built(&self) -> bool {
        self.fully_built
    }

    fn get_num_tiles(&self) -> (i32, i32) {
        self.params.num_tiles()
    }

    fn get_tile_index(&self, pos: Vec3) -> TileCoord {
        self.params.tile_index(pos)
    }

    fn get_bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    fn has_tile(&self, coord: TileCoord) -> bool {
        self.pos_lookup.contains_key(&coord)
    }

    fn get_tile_data(&self, coord: TileCoord) -> Option<TileData> {
        NavMesh::get_tile_data(self, coord)
    }

    fn add_tile(&mut self, data: &TileData) -> Result<TileCoord> {
        NavMesh::add_tile(self, data)
    }

    fn remove_tile(&mut self, coord: TileCoord) -> Result<()> {
        NavMesh::remove_tile(self, coord)
    }

    fn allocate(&mut self, bounds: BoundingBox, max_tiles: i32) -> Result<()> {
        NavMesh::allocate(self, bounds, max_tiles)
    }

    fn build(&mut self) -> Result<()> {
        NavMesh::build(self)
    }
}
