//! Tile-addressable navigation mesh for streaming
//!
//! This crate provides the mesh side of navigation tile streaming: a fixed
//! grid of independently loadable tiles, a binary payload format for moving
//! tiles in and out, and tile sources that stand in for scene geometry.
//!
//! # Features
//!
//! - **Grid container**: O(1) tile install/evict with slot reuse and a
//!   coordinate lookup
//! - **Full and partial rebuilds**: repopulate the whole grid, or only the
//!   cells touching a changed region
//! - **Bounded allocation**: reinitialize empty with a fixed slot budget,
//!   ready to receive streamed tiles
//! - **Opaque payloads**: magic/version-checked little-endian tile encoding
//!
//! # Example
//!
//! ```rust,ignore
//! use tilestream_mesh::{NavMesh, NavMeshParams, PlanarSource};
//!
//! let params = NavMeshParams {
//!     num_tiles_x: 16,
//!     num_tiles_z: 16,
//!     max_tiles: 256,
//!     ..Default::default()
//! };
//! let mut mesh = NavMesh::new(params, PlanarSource::new())?;
//!
//! // Populate every grid cell from the source
//! mesh.build()?;
//!
//! // Move a tile out and back in through its serialized payload
//! let coord = mesh.get_tile_index(agent_position);
//! let payload = mesh.get_tile_data(coord).unwrap();
//! mesh.remove_tile(coord)?;
//! mesh.add_tile(&payload)?;
//! ```

pub mod nav_mesh;
pub mod params;
pub mod source;
pub mod streamable;
pub mod tile_data;

pub use nav_mesh::*;
pub use params::*;
pub use source::*;
pub use streamable::*;
pub use tile_data::*;
