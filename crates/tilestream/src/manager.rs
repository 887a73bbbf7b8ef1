//! Sliding-window tile streaming.
//!
//! A [`TileStreamingManager`] keeps a square window of mesh tiles resident
//! around a tracked world position. Enabling streaming captures every payload
//! the fully built mesh holds into a [`TileCache`] and re-allocates the mesh
//! empty; each window update then removes the tiles that fell out of range
//! and re-adds the ones that came into range, straight from the cache.

use std::collections::HashSet;

use glam::Vec3;
use tilestream_common::{Error, Result, TileCoord, TileWindow};
use tilestream_mesh::StreamableMesh;

use crate::cache::TileCache;

/// Tiles that changed residency during a single window update.
///
/// Removals are applied before additions, so peak residency never exceeds
/// the window capacity. Both lists are sorted row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamUpdate {
    /// Coordinates streamed in during this update.
    pub added: Vec<TileCoord>,
    /// Coordinates streamed out during this update.
    pub removed: Vec<TileCoord>,
}

impl StreamUpdate {
    /// Whether the update changed nothing.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Lifetime counters for a streaming manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamingStats {
    /// Window updates processed since the manager was created.
    pub updates: u64,
    /// Tiles streamed in since the manager was created.
    pub tiles_added: u64,
    /// Tiles streamed out since the manager was created.
    pub tiles_removed: u64,
    /// Tiles currently resident in the mesh (zero while disabled).
    pub active_tiles: usize,
    /// Payloads held by the cache (zero while disabled).
    pub cached_tiles: usize,
}

/// Per-enable state, dropped again on disable.
#[derive(Debug)]
struct StreamingState {
    cache: TileCache,
    active: HashSet<TileCoord>,
    num_tiles: (i32, i32),
}

/// Streams mesh tiles in and out around a tracked world position.
///
/// The manager owns no mesh. Callers pass the mesh into every operation, and
/// the manager keeps its active set mirroring the mesh exactly: a coordinate
/// is in the set if and only if the mesh holds that tile.
///
/// Lifecycle: [`enable_streaming`](Self::enable_streaming) captures payloads
/// and empties the mesh, [`update_window`](Self::update_window) follows the
/// tracked position, [`disable_streaming`](Self::disable_streaming) rebuilds
/// the full mesh and discards the cache. Updating before enabling is an
/// error, as is enabling twice without disabling in between.
#[derive(Debug)]
pub struct TileStreamingManager {
    radius: i32,
    state: Option<StreamingState>,
    updates: u64,
    tiles_added: u64,
    tiles_removed: u64,
}

impl TileStreamingManager {
    /// Creates a manager that keeps tiles within `radius` of the tracked
    /// position resident.
    ///
    /// A radius of zero keeps only the tile under the position.
    pub fn new(radius: i32) -> Result<Self> {
        if radius < 0 {
            return Err(Error::Streaming(format!(
                "streaming radius must be non-negative, got {radius}"
            )));
        }
        Ok(Self {
            radius,
            state: None,
            updates: 0,
            tiles_added: 0,
            tiles_removed: 0,
        })
    }

    /// Whether streaming is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }

    /// Configured streaming radius in tiles.
    pub fn get_streaming_radius(&self) -> i32 {
        self.radius
    }

    /// Most tiles the window can ever hold.
    pub fn max_active_tiles(&self) -> usize {
        let side = 2 * self.radius as usize + 1;
        side * side
    }

    /// Switches the mesh from fully built to streamed.
    ///
    /// Captures every payload into the cache first, then re-allocates the
    /// mesh empty with exactly window capacity. The mesh holds no tiles
    /// until the first [`update_window`](Self::update_window) call.
    pub fn enable_streaming<M: StreamableMesh>(&mut self, mesh: &mut M) -> Result<()> {
        if self.state.is_some() {
            return Err(Error::Streaming(
                "streaming is already enabled".to_string(),
            ));
        }

        let cache = TileCache::capture(mesh)?;
        self.install(mesh, cache)
    }

    /// Switches the mesh to streamed using an already captured cache.
    ///
    /// The mesh does not need to be fully built; its grid must match the
    /// cache's. This is the entry point for streaming from a baked snapshot.
    pub fn enable_streaming_from_cache<M: StreamableMesh>(
        &mut self,
        mesh: &mut M,
        cache: TileCache,
    ) -> Result<()> {
        if self.state.is_some() {
            return Err(Error::Streaming(
                "streaming is already enabled".to_string(),
            ));
        }
        if cache.get_num_tiles() != mesh.get_num_tiles() {
            return Err(Error::Streaming(format!(
                "cache grid {:?} does not match mesh grid {:?}",
                cache.get_num_tiles(),
                mesh.get_num_tiles()
            )));
        }

        self.install(mesh, cache)
    }

    fn install<M: StreamableMesh>(&mut self, mesh: &mut M, cache: TileCache) -> Result<()> {
        if cache.is_empty() {
            log::warn!("enabling streaming with an empty cache; no tiles will ever load");
        }

        let num_tiles = mesh.get_num_tiles();
        let bounds = mesh.get_bounding_box();
        mesh.allocate(bounds, self.max_active_tiles() as i32)?;

        log::info!(
            "streaming enabled: radius {} ({} tile window), {} cached payloads",
            self.radius,
            self.max_active_tiles(),
            cache.len()
        );

        self.state = Some(StreamingState {
            cache,
            active: HashSet::new(),
            num_tiles,
        });
        Ok(())
    }

    /// Switches the mesh back to fully built and discards streaming state.
    ///
    /// The mesh is rebuilt from its tile source. If the rebuild fails,
    /// streaming stays enabled and the mesh is left as the failed rebuild
    /// left it.
    pub fn disable_streaming<M: StreamableMesh>(&mut self, mesh: &mut M) -> Result<()> {
        if self.state.is_none() {
            return Err(Error::Streaming(
                "streaming is not enabled".to_string(),
            ));
        }

        mesh.build()?;
        self.state = None;

        log::info!("streaming disabled, mesh fully rebuilt");
        Ok(())
    }

    /// Re-centers the window on `position` and reconciles the mesh.
    ///
    /// Tiles outside the new window are removed first, then tiles inside it
    /// that are not yet resident are added from the cache. Window cells the
    /// cache has no payload for are skipped without error. Returns the
    /// coordinates that changed residency.
    pub fn update_window<M: StreamableMesh>(
        &mut self,
        mesh: &mut M,
        position: Vec3,
    ) -> Result<StreamUpdate> {
        let state = self.state.as_mut().ok_or_else(|| {
            Error::Streaming("streaming is not enabled".to_string())
        })?;
        if mesh.get_num_tiles() != state.num_tiles {
            return Err(Error::Streaming(format!(
                "mesh grid changed from {:?} to {:?} while streaming",
                state.num_tiles,
                mesh.get_num_tiles()
            )));
        }

        let center = mesh.get_tile_index(position);
        let window = TileWindow::from_center_clamped(center, self.radius, state.num_tiles);

        let mut removed: Vec<TileCoord> = state
            .active
            .iter()
            .copied()
            .filter(|coord| !window.contains(*coord))
            .collect();
        removed.sort_unstable();
        for coord in &removed {
            mesh.remove_tile(*coord)?;
            state.active.remove(coord);
            log::debug!("streamed out tile {coord}");
        }

        let mut added = Vec::new();
        for coord in window.coords() {
            if state.active.contains(&coord) {
                continue;
            }
            match state.cache.get(coord)? {
                Some(data) => {
                    mesh.add_tile(&data)?;
                    state.active.insert(coord);
                    added.push(coord);
                    log::debug!("streamed in tile {coord}");
                }
                None => continue,
            }
        }

        self.updates += 1;
        self.tiles_added += added.len() as u64;
        self.tiles_removed += removed.len() as u64;

        Ok(StreamUpdate { added, removed })
    }

    /// Coordinates currently resident, sorted row-major. Empty while
    /// streaming is disabled.
    pub fn get_active_tiles(&self) -> Vec<TileCoord> {
        match &self.state {
            Some(state) => {
                let mut coords: Vec<TileCoord> = state.active.iter().copied().collect();
                coords.sort_unstable();
                coords
            }
            None => Vec::new(),
        }
    }

    /// The payload cache, while streaming is enabled.
    pub fn get_cache(&self) -> Option<&TileCache> {
        self.state.as_ref().map(|state| &state.cache)
    }

    /// Lifetime counters. The per-enable fields read zero while disabled.
    pub fn get_stats(&self) -> StreamingStats {
        StreamingStats {
            updates: self.updates,
            tiles_added: self.tiles_added,
            tiles_removed: self.tiles_removed,
            active_tiles: self.state.as_ref().map_or(0, |s| s.active.len()),
            cached_tiles: self.state.as_ref().map_or(0, |s| s.cache.len()),
        }
    }
}

/// Mean position of a group of agents, used to center one shared window.
///
/// Returns `None` for an empty group.
pub fn group_centroid(positions: &[Vec3]) -> Option<Vec3> {
    if positions.is_empty() {
        return None;
    }
    let sum: Vec3 = positions.iter().copied().sum();
    Some(sum / positions.len() as f32)
}
