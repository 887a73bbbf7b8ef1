//! Binary tile payload format.
//!
//! One navigation tile serializes to a little-endian blob: a magic/version
//! header, the tile's grid coordinate and bounds, then its polygon soup.
//! Everything outside this module treats the blob as opaque bytes.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

use tilestream_common::{Error, Result, TileCoord};

/// Magic number for tile payloads ('TNAV')
pub const TILE_DATA_MAGIC: u32 = 0x5641_4E54; // 'TNAV' in little-endian

/// Current tile payload version
pub const TILE_DATA_VERSION: u32 = 1;

/// Vertex indices are u16, so a tile holds at most this many vertices.
const MAX_TILE_VERTS: usize = 1 << 16;

/// Upper bound on polygons per tile, guarding decode-time allocations.
const MAX_TILE_POLYS: usize = 1 << 16;

/// Opaque serialized payload of one navigation tile.
///
/// Produced by [`TileRecord::to_bytes`] and consumed when a tile is
/// (re)installed into a mesh. Caches and snapshot files move these around
/// without interpreting their contents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TileData {
    bytes: Vec<u8>,
}

impl TileData {
    /// Wraps raw payload bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The raw payload bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Unwraps into the raw payload bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Payload size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decoded contents of one navigation tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRecord {
    /// Grid coordinate the tile occupies.
    pub coord: TileCoord,
    /// Minimum corner of the tile's bounds.
    pub bmin: [f32; 3],
    /// Maximum corner of the tile's bounds.
    pub bmax: [f32; 3],
    /// Vertex indices per polygon.
    pub verts_per_poly: u32,
    /// Vertex positions, three floats per vertex.
    pub verts: Vec<f32>,
    /// Polygon vertex indices, `verts_per_poly` per polygon.
    pub polys: Vec<u16>,
    /// Area id per polygon.
    pub areas: Vec<u8>,
}

impl TileRecord {
    /// Number of vertices in the tile.
    #[inline]
    pub fn vert_count(&self) -> usize {
        self.verts.len() / 3
    }

    /// Number of polygons in the tile.
    #[inline]
    pub fn poly_count(&self) -> usize {
        self.areas.len()
    }

    /// Checks the record's internal consistency.
    fn check(&self) -> Result<()> {
        if self.verts_per_poly < 3 || self.verts_per_poly > 16 {
            return Err(Error::TileData(format!(
                "verts_per_poly {} out of range",
                self.verts_per_poly
            )));
        }

        if self.verts.len() % 3 != 0 {
            return Err(Error::TileData(
                "vertex array length is not a multiple of 3".to_string(),
            ));
        }

        if self.vert_count() > MAX_TILE_VERTS {
            return Err(Error::TileData(format!(
                "too many vertices: {}",
                self.vert_count()
            )));
        }

        if self.polys.len() != self.poly_count() * self.verts_per_poly as usize {
            return Err(Error::TileData(
                "polygon index array does not match polygon count".to_string(),
            ));
        }

        let vert_count = self.vert_count();
        for &idx in &self.polys {
            if idx as usize >= vert_count {
                return Err(Error::TileData(format!(
                    "polygon index {idx} out of range for {vert_count} vertices"
                )));
            }
        }

        Ok(())
    }

    /// Writes the record in the binary payload layout.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.check()?;

        writer.write_u32::<LittleEndian>(TILE_DATA_MAGIC)?;
        writer.write_u32::<LittleEndian>(TILE_DATA_VERSION)?;
        writer.write_i32::<LittleEndian>(self.coord.x)?;
        writer.write_i32::<LittleEndian>(self.coord.z)?;
        for v in &self.bmin {
            writer.write_f32::<LittleEndian>(*v)?;
        }
        for v in &self.bmax {
            writer.write_f32::<LittleEndian>(*v)?;
        }
        writer.write_u32::<LittleEndian>(self.vert_count() as u32)?;
        writer.write_u32::<LittleEndian>(self.poly_count() as u32)?;
        writer.write_u32::<LittleEndian>(self.verts_per_poly)?;
        for v in &self.verts {
            writer.write_f32::<LittleEndian>(*v)?;
        }
        for idx in &self.polys {
            writer.write_u16::<LittleEndian>(*idx)?;
        }
        for area in &self.areas {
            writer.write_u8(*area)?;
        }

        Ok(())
    }

    /// Reads a record, validating magic, version, and index ranges.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_u32::<LittleEndian>()?;
        if magic != TILE_DATA_MAGIC {
            return Err(Error::TileData(format!(
                "bad payload magic 0x{magic:08x}"
            )));
        }

        let version = reader.read_u32::<LittleEndian>()?;
        if version != TILE_DATA_VERSION {
            return Err(Error::TileData(format!(
                "unsupported payload version {version}"
            )));
        }

        let x = reader.read_i32::<LittleEndian>()?;
        let z = reader.read_i32::<LittleEndian>()?;

        let mut bmin = [0.0f32; 3];
        for v in &mut bmin {
            *v = reader.read_f32::<LittleEndian>()?;
        }
        let mut bmax = [0.0f32; 3];
        for v in &mut bmax {
            *v = reader.read_f32::<LittleEndian>()?;
        }

        let vert_count = reader.read_u32::<LittleEndian>()? as usize;
        let poly_count = reader.read_u32::<LittleEndian>()? as usize;
        let verts_per_poly = reader.read_u32::<LittleEndian>()?;

        if vert_count > MAX_TILE_VERTS {
            return Err(Error::TileData(format!("too many vertices: {vert_count}")));
        }
        if poly_count > MAX_TILE_POLYS {
            return Err(Error::TileData(format!("too many polygons: {poly_count}")));
        }
        if verts_per_poly < 3 || verts_per_poly > 16 {
            return Err(Error::TileData(format!(
                "verts_per_poly {verts_per_poly} out of range"
            )));
        }

        let mut verts = vec![0.0f32; vert_count * 3];
        for v in &mut verts {
            *v = reader.read_f32::<LittleEndian>()?;
        }

        let mut polys = vec![0u16; poly_count * verts_per_poly as usize];
        for idx in &mut polys {
            *idx = reader.read_u16::<LittleEndian>()?;
        }

        let mut areas = vec![0u8; poly_count];
        reader.read_exact(&mut areas)?;

        let record = Self {
            coord: TileCoord::new(x, z),
            bmin,
            bmax,
            verts_per_poly,
            verts,
            polys,
            areas,
        };
        record.check()?;

        Ok(record)
    }

    /// Serializes the record into an opaque payload.
    pub fn to_bytes(&self) -> Result<TileData> {
        let mut bytes = Vec::with_capacity(
            44 + self.verts.len() * 4 + self.polys.len() * 2 + self.areas.len(),
        );
        self.write_to(&mut bytes)?;
        Ok(TileData::new(bytes))
    }

    /// Decodes an opaque payload.
    pub fn from_bytes(data: &TileData) -> Result<Self> {
        let mut cursor = Cursor::new(data.as_bytes());
        Self::read_from(&mut cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> TileRecord {
        TileRecord {
            coord: TileCoord::new(3, 5),
            bmin: [30.0, 0.0, 50.0],
            bmax: [40.0, 2.0, 60.0],
            verts_per_poly: 4,
            verts: vec![
                30.0, 0.0, 50.0, //
                40.0, 0.0, 50.0, //
                40.0, 0.0, 60.0, //
                30.0, 0.0, 60.0,
            ],
            polys: vec![0, 1, 2, 3],
            areas: vec![63],
        }
    }

    #[test]
    fn test_round_trip() {
        let record = sample_record();
        let data = record.to_bytes().unwrap();
        let decoded = TileRecord::from_bytes(&data).unwrap();

        assert_eq!(decoded, record);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = sample_record().to_bytes().unwrap().into_bytes();
        bytes[0] ^= 0xff;

        let result = TileRecord::from_bytes(&TileData::new(bytes));
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_version_rejected() {
        let mut bytes = sample_record().to_bytes().unwrap().into_bytes();
        bytes[4] = 99;

        let result = TileRecord::from_bytes(&TileData::new(bytes));
        assert!(result.is_err());
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let bytes = sample_record().to_bytes().unwrap().into_bytes();
        let truncated = TileData::new(bytes[..bytes.len() / 2].to_vec());

        assert!(TileRecord::from_bytes(&truncated).is_err());
    }

    #[test]
    fn test_oversized_counts_rejected_before_allocation() {
        let mut bytes = sample_record().to_bytes().unwrap().into_bytes();
        // vert_count sits after magic, version, coord, and bounds
        bytes[40..44].copy_from_slice(&u32::MAX.to_le_bytes());

        assert!(TileRecord::from_bytes(&TileData::new(bytes)).is_err());
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let mut record = sample_record();
        record.polys[2] = 7;

        assert!(record.to_bytes().is_err());
    }

    #[test]
    fn test_inconsistent_area_count_rejected() {
        let mut record = sample_record();
        record.areas.push(63);

        assert!(record.to_bytes().is_err());
    }
}
