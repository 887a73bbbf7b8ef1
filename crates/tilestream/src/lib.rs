//! Tile streaming for navigation meshes
//!
//! This crate keeps a sliding square window of navigation-mesh tiles
//! resident around a tracked world position. All tile payloads are baked
//! once and held compressed in a cache; as the position moves between grid
//! cells, tiles falling out of the window are removed from the mesh and
//! tiles entering it are added back from the cache.
//!
//! # Features
//!
//! - **Sliding window**: a configurable-radius square of tiles follows any
//!   world position, clamped to the grid edges
//! - **Payload cache**: LZ4-compressed tile payloads captured from a fully
//!   built mesh, or loaded from a baked snapshot
//! - **Bounded residency**: removals are applied before additions, so the
//!   mesh never holds more than the window capacity
//! - **Snapshots**: JSON and binary cache persistence behind the
//!   `serialization` feature
//!
//! # Example
//!
//! ```rust,ignore
//! use tilestream::TileStreamingManager;
//! use tilestream_mesh::{NavMesh, NavMeshParams, PlanarSource};
//!
//! let params = NavMeshParams::default();
//! let mut mesh = NavMesh::new(params, PlanarSource::new())?;
//! mesh.build()?;
//!
//! let mut streaming = TileStreamingManager::new(2)?;
//! streaming.enable_streaming(&mut mesh)?;
//!
//! // Follow the player each frame.
//! let update = streaming.update_window(&mut mesh, player_position)?;
//! for coord in &update.added {
//!     println!("tile {coord} is now resident");
//! }
//! ```

pub mod cache;
pub mod manager;

pub use cache::*;
pub use manager::*;
