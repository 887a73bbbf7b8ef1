//! Common types shared by the tilestream navigation-mesh streaming crates

mod bounds;
mod tile_coord;
mod window;

pub use bounds::*;
pub use tile_coord::*;
pub use window::*;

/// Represents a 3D position
pub type Vec3 = glam::Vec3;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid mesh state: {0}")]
    InvalidMesh(String),

    #[error("tile data error: {0}")]
    TileData(String),

    #[error("streaming error: {0}")]
    Streaming(String),

    #[cfg(feature = "std")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for streaming operations
pub type Result<T> = std::result::Result<T, Error>;
