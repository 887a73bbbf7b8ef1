//! Offline tile payload cache.
//!
//! When streaming is enabled, every payload the fully built mesh holds is
//! captured into a [`TileCache`] keyed by coordinate. The cache is read-only
//! afterwards: the streaming window pulls payloads back out as the tracked
//! position moves. Payloads are LZ4-compressed at capture time; the cache
//! never interprets their contents.

use std::collections::HashMap;

use tilestream_common::{Error, Result, TileCoord};
use tilestream_mesh::{StreamableMesh, TileData};

#[cfg(feature = "serialization")]
use tilestream_mesh::NavMeshParams;

/// Compressed store of every tile payload a fully built mesh produced.
///
/// Grid cells that never produced a tile are simply absent; looking them up
/// yields `Ok(None)`.
#[derive(Debug, Clone)]
pub struct TileCache {
    /// LZ4-compressed payload per coordinate.
    tiles: HashMap<TileCoord, Vec<u8>>,
    /// Grid dimensions the payloads were captured from.
    num_tiles: (i32, i32),
}

impl TileCache {
    /// Captures every resident tile payload from a fully built mesh.
    pub fn capture<M: StreamableMesh>(mesh: &M) -> Result<Self> {
        if !mesh.is_fully_built() {
            return Err(Error::Streaming(
                "capturing tile payloads requires a fully built mesh".to_string(),
            ));
        }

        let (nx, nz) = mesh.get_num_tiles();
        let mut tiles = HashMap::new();
        for z in 0..nz {
            for x in 0..nx {
                let coord = TileCoord::new(x, z);
                if let Some(data) = mesh.get_tile_data(coord) {
                    tiles.insert(coord, lz4_flex::compress_prepend_size(data.as_bytes()));
                }
            }
        }

        log::debug!("captured {} tile payloads from {}x{} grid", tiles.len(), nx, nz);
        Ok(Self {
            tiles,
            num_tiles: (nx, nz),
        })
    }

    /// Decompresses and returns the payload at `coord`, if one was captured.
    pub fn get(&self, coord: TileCoord) -> Result<Option<TileData>> {
        match self.tiles.get(&coord) {
            Some(compressed) => match lz4_flex::decompress_size_prepended(compressed) {
                Ok(bytes) => Ok(Some(TileData::new(bytes))),
                Err(e) => {
                    log::error!("lz4 decompression failed for tile {coord}: {e:?}");
                    Err(Error::TileData(format!("corrupt cache entry for tile {coord}")))
                }
            },
            None => Ok(None),
        }
    }

    /// Whether a payload was captured at `coord`.
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    /// Number of captured payloads.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no payloads were captured.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Grid dimensions the cache was captured from.
    pub fn get_num_tiles(&self) -> (i32, i32) {
        self.num_tiles
    }

    /// Captured coordinates, in no particular order.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.tiles.keys().copied()
    }

    /// Total compressed size of all captured payloads, in bytes.
    pub fn compressed_size(&self) -> usize {
        self.tiles.values().map(|data| data.len()).sum()
    }

    /// Builds a serializable snapshot of the cache.
    ///
    /// `params` must describe the grid the cache was captured from; they are
    /// stored alongside the payloads so a consumer can reconstruct a
    /// matching mesh.
    #[cfg(feature = "serialization")]
    pub fn to_snapshot(&self, params: NavMeshParams) -> Result<CacheSnapshot> {
        if params.num_tiles() != self.num_tiles {
            return Err(Error::Streaming(format!(
                "snapshot params grid {:?} does not match cache grid {:?}",
                params.num_tiles(),
                self.num_tiles
            )));
        }

        let mut tiles: Vec<(TileCoord, Vec<u8>)> = self
            .tiles
            .iter()
            .map(|(coord, data)| (*coord, data.clone()))
            .collect();
        tiles.sort_unstable_by_key(|(coord, _)| *coord);

        Ok(CacheSnapshot { params, tiles })
    }
}

/// Serializable image of a [`TileCache`] plus the grid it was captured from.
///
/// Snapshots let a tool bake a world's payloads once and stream from the
/// file later, without rebuilding the mesh.
#[cfg(feature = "serialization")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheSnapshot {
    /// Grid parameters of the mesh the cache came from.
    pub params: NavMeshParams,
    /// Compressed payload per coordinate, sorted row-major.
    pub tiles: Vec<(TileCoord, Vec<u8>)>,
}

#[cfg(feature = "serialization")]
impl CacheSnapshot {
    /// Rebuilds the runtime cache, validating grid agreement.
    pub fn to_cache(&self) -> Result<TileCache> {
        self.params.validate()?;

        let (nx, nz) = self.params.num_tiles();
        let mut tiles = HashMap::with_capacity(self.tiles.len());
        for (coord, data) in &self.tiles {
            if coord.x < 0 || coord.x >= nx || coord.z < 0 || coord.z >= nz {
                return Err(Error::TileData(format!(
                    "snapshot tile {coord} outside {nx}x{nz} grid"
                )));
            }
            if tiles.insert(*coord, data.clone()).is_some() {
                return Err(Error::TileData(format!(
                    "snapshot lists tile {coord} twice"
                )));
            }
        }

        Ok(TileCache {
            tiles,
            num_tiles: (nx, nz),
        })
    }

    /// Saves the snapshot to a file in JSON format.
    pub fn save_to_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::TileData(format!("snapshot encoding failed: {e}")))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a snapshot from a JSON file.
    pub fn load_from_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let snapshot = serde_json::from_str(&json)
            .map_err(|e| Error::TileData(format!("snapshot decoding failed: {e}")))?;
        Ok(snapshot)
    }

    /// Saves the snapshot to a file in binary format.
    pub fn save_to_binary<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let encoded = postcard::to_allocvec(self)
            .map_err(|e| Error::TileData(format!("snapshot encoding failed: {e}")))?;
        std::fs::write(path, encoded)?;
        Ok(())
    }

    /// Loads a snapshot from a binary file.
    pub fn load_from_binary<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        let snapshot = postcard::from_bytes(&data)
            .map_err(|e| Error::TileData(format!("snapshot decoding failed: {e}")))?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilestream_mesh::{NavMesh, NavMeshParams, PlanarSource};

    fn built_mesh(nx: i32, nz: i32) -> NavMesh<PlanarSource> {
        let params = NavMeshParams {
            num_tiles_x: nx,
            num_tiles_z: nz,
            max_tiles: nx * nz,
            ..Default::default()
        };
        let mut mesh = NavMesh::new(params, PlanarSource::new()).unwrap();
        mesh.build().unwrap();
        mesh
    }

    #[test]
    fn test_capture_requires_fully_built_mesh() {
        let params = NavMeshParams::default();
        let mesh = NavMesh::new(params, PlanarSource::new()).unwrap();

        assert!(TileCache::capture(&mesh).is_err());
    }

    #[test]
    fn test_capture_holds_every_payload() {
        let mesh = built_mesh(5, 4);
        let cache = TileCache::capture(&mesh).unwrap();

        assert_eq!(cache.len(), 20);
        assert_eq!(cache.get_num_tiles(), (5, 4));
        for z in 0..4 {
            for x in 0..5 {
                assert!(cache.contains(TileCoord::new(x, z)));
            }
        }
    }

    #[test]
    fn test_get_round_trips_payload() {
        let mesh = built_mesh(3, 3);
        let cache = TileCache::capture(&mesh).unwrap();

        let coord = TileCoord::new(1, 2);
        let original = mesh.get_tile_data(coord).unwrap();
        let restored = cache.get(coord).unwrap().unwrap();

        assert_eq!(restored, original);
    }

    #[test]
    fn test_uncaptured_coordinate_is_benign() {
        let mesh = built_mesh(2, 2);
        let cache = TileCache::capture(&mesh).unwrap();

        assert!(cache.get(TileCoord::new(9, 9)).unwrap().is_none());
    }

    #[test]
    fn test_source_gaps_stay_absent() {
        let params = NavMeshParams {
            num_tiles_x: 3,
            num_tiles_z: 3,
            max_tiles: 9,
            ..Default::default()
        };
        let gap = TileCoord::new(1, 1);
        let source = PlanarSource::with_obstructions(vec![params.tile_bounds(gap)]);
        let mut mesh = NavMesh::new(params, source).unwrap();
        mesh.build().unwrap();

        let cache = TileCache::capture(&mesh).unwrap();

        assert_eq!(cache.len(), 8);
        assert!(!cache.contains(gap));
        assert!(cache.get(gap).unwrap().is_none());
    }

    #[cfg(feature = "serialization")]
    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_snapshot_round_trip_json_and_binary() {
            let mesh = built_mesh(4, 4);
            let cache = TileCache::capture(&mesh).unwrap();
            let snapshot = cache.to_snapshot(mesh.get_params().clone()).unwrap();

            let dir = tempfile::tempdir().unwrap();
            let json_path = dir.path().join("cache.json");
            let bin_path = dir.path().join("cache.bin");

            snapshot.save_to_json(&json_path).unwrap();
            snapshot.save_to_binary(&bin_path).unwrap();

            for restored in [
                CacheSnapshot::load_from_json(&json_path).unwrap(),
                CacheSnapshot::load_from_binary(&bin_path).unwrap(),
            ] {
                let rebuilt = restored.to_cache().unwrap();
                assert_eq!(rebuilt.len(), cache.len());
                for coord in cache.coords() {
                    assert_eq!(
                        rebuilt.get(coord).unwrap(),
                        cache.get(coord).unwrap(),
                    );
                }
            }
        }

        #[test]
        fn test_snapshot_rejects_mismatched_params() {
            let mesh = built_mesh(4, 4);
            let cache = TileCache::capture(&mesh).unwrap();
            let other = NavMeshParams {
                num_tiles_x: 2,
                num_tiles_z: 2,
                max_tiles: 4,
                ..Default::default()
            };

            assert!(cache.to_snapshot(other).is_err());
        }

        #[test]
        fn test_snapshot_rejects_out_of_grid_tiles() {
            let mesh = built_mesh(2, 2);
            let cache = TileCache::capture(&mesh).unwrap();
            let mut snapshot = cache.to_snapshot(mesh.get_params().clone()).unwrap();
            snapshot.tiles.push((TileCoord::new(5, 5), vec![1, 2, 3]));

            assert!(snapshot.to_cache().is_err());
        }
    }
}
