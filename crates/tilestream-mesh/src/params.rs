//! Navigation mesh grid parameters.

use glam::Vec3;
use tilestream_common::{BoundingBox, Error, Result, TileCoord};

/// Grid geometry and slot capacity of a tile-addressable navigation mesh.
///
/// The grid is a fixed rectangle of square tiles on the XZ plane, anchored at
/// `origin` and indexed from (0, 0).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NavMeshParams {
    /// World-space position of the grid's minimum corner.
    pub origin: [f32; 3],
    /// Edge length of one square tile.
    pub tile_size: f32,
    /// Vertical extent of the navigable volume.
    pub height: f32,
    /// Number of tile columns along the x axis.
    pub num_tiles_x: i32,
    /// Number of tile rows along the z axis.
    pub num_tiles_z: i32,
    /// Number of tile slots a fully built mesh occupies.
    pub max_tiles: i32,
}

impl Default for NavMeshParams {
    fn default() -> Self {
        Self {
            origin: [0.0, 0.0, 0.0],
            tile_size: 10.0,
            height: 2.0,
            num_tiles_x: 8,
            num_tiles_z: 8,
            max_tiles: 64,
        }
    }
}

impl NavMeshParams {
    /// Validates the parameters.
    pub fn validate(&self) -> Result<()> {
        for v in &self.origin {
            if v.is_infinite() || v.is_nan() {
                return Err(Error::InvalidMesh("origin must be finite".to_string()));
            }
        }

        if self.tile_size <= 0.0 || !self.tile_size.is_finite() {
            return Err(Error::InvalidMesh(
                "tile_size must be positive and finite".to_string(),
            ));
        }

        if self.height <= 0.0 || !self.height.is_finite() {
            return Err(Error::InvalidMesh(
                "height must be positive and finite".to_string(),
            ));
        }

        if self.num_tiles_x <= 0 || self.num_tiles_z <= 0 {
            return Err(Error::InvalidMesh(
                "grid dimensions must be positive".to_string(),
            ));
        }

        if (self.max_tiles as i64) < (self.num_tiles_x as i64) * (self.num_tiles_z as i64) {
            return Err(Error::InvalidMesh(format!(
                "max_tiles {} cannot hold a full {}x{} grid",
                self.max_tiles, self.num_tiles_x, self.num_tiles_z
            )));
        }

        Ok(())
    }

    /// Grid dimensions as (columns, rows).
    #[inline]
    pub fn num_tiles(&self) -> (i32, i32) {
        (self.num_tiles_x, self.num_tiles_z)
    }

    /// World-space bounds of the whole grid.
    pub fn grid_bounds(&self) -> BoundingBox {
        let min = Vec3::from(self.origin);
        let max = min
            + Vec3::new(
                self.num_tiles_x as f32 * self.tile_size,
                self.height,
                self.num_tiles_z as f32 * self.tile_size,
            );
        BoundingBox::new(min, max)
    }

    /// World-space bounds of one grid cell.
    pub fn tile_bounds(&self, coord: TileCoord) -> BoundingBox {
        let min = Vec3::from(self.origin)
            + Vec3::new(
                coord.x as f32 * self.tile_size,
                0.0,
                coord.z as f32 * self.tile_size,
            );
        let max = min + Vec3::new(self.tile_size, self.height, self.tile_size);
        BoundingBox::new(min, max)
    }

    /// Center of one grid cell, at the origin's height.
    pub fn tile_center(&self, coord: TileCoord) -> Vec3 {
        Vec3::from(self.origin)
            + Vec3::new(
                (coord.x as f32 + 0.5) * self.tile_size,
                0.0,
                (coord.z as f32 + 0.5) * self.tile_size,
            )
    }

    /// Tile coordinate containing a world-space position.
    ///
    /// The result is not clamped; positions outside the grid map to
    /// out-of-range coordinates.
    pub fn tile_index(&self, pos: Vec3) -> TileCoord {
        let tx = ((pos.x - self.origin[0]) / self.tile_size).floor() as i32;
        let tz = ((pos.z - self.origin[2]) / self.tile_size).floor() as i32;
        TileCoord::new(tx, tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(NavMeshParams::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = NavMeshParams {
            tile_size: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        params = NavMeshParams {
            num_tiles_x: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        params = NavMeshParams {
            origin: [f32::NAN, 0.0, 0.0],
            ..Default::default()
        };
        assert!(params.validate().is_err());

        // Capacity too small for a full build
        params = NavMeshParams {
            max_tiles: 10,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_tile_index_floor_math() {
        let params = NavMeshParams::default();

        assert_eq!(
            params.tile_index(Vec3::new(5.0, 0.0, 5.0)),
            TileCoord::new(0, 0)
        );
        assert_eq!(
            params.tile_index(Vec3::new(10.0, 0.0, 9.9)),
            TileCoord::new(1, 0)
        );
        assert_eq!(
            params.tile_index(Vec3::new(-0.1, 0.0, 35.0)),
            TileCoord::new(-1, 3)
        );
    }

    #[test]
    fn test_tile_index_with_offset_origin() {
        let params = NavMeshParams {
            origin: [-40.0, 0.0, -40.0],
            ..Default::default()
        };

        assert_eq!(
            params.tile_index(Vec3::new(-40.0, 0.0, -40.0)),
            TileCoord::new(0, 0)
        );
        assert_eq!(
            params.tile_index(Vec3::new(0.0, 0.0, 0.0)),
            TileCoord::new(4, 4)
        );
    }

    #[test]
    fn test_tile_bounds() {
        let params = NavMeshParams::default();
        let bounds = params.tile_bounds(TileCoord::new(2, 1));

        assert_eq!(bounds.min, Vec3::new(20.0, 0.0, 10.0));
        assert_eq!(bounds.max, Vec3::new(30.0, 2.0, 20.0));
    }

    #[test]
    fn test_grid_bounds() {
        let params = NavMeshParams::default();
        let bounds = params.grid_bounds();

        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::new(80.0, 2.0, 80.0));
    }

    #[test]
    fn test_tile_center_round_trips_index() {
        let params = NavMeshParams::default();
        let coord = TileCoord::new(3, 6);

        assert_eq!(params.tile_index(params.tile_center(coord)), coord);
    }
}
