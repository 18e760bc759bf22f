//! Header and index record encoding.

use super::types::*;
use crate::coord::TileAddress;

impl ContainerHeader {
    /// Builds the header for `tile_count` tiles and a payload of `payload_len` bytes.
    pub fn new(georef: &Georef, tile_count: u32, payload_len: u64) -> Self {
        let bounds = &georef.bounds;
        Self {
            version: FORMAT_VERSION,
            projection: PROJECTION_WEB_MERCATOR,
            north: to_angle_units(bounds.north()),
            west: to_angle_units(bounds.west()),
            south: to_angle_units(bounds.south()),
            east: to_angle_units(bounds.east()),
            max_zoom: georef.max_zoom,
            min_zoom: georef.min_zoom,
            level_count: georef.level_count,
            tile_count,
            payload_len,
        }
    }

    /// Serializes the header into its 48-byte little-endian form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN);

        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&(HEADER_LEN as u16).to_le_bytes());
        bytes.extend_from_slice(&self.projection.to_le_bytes());

        bytes.extend_from_slice(&self.north.to_le_bytes());
        bytes.extend_from_slice(&self.west.to_le_bytes());
        bytes.extend_from_slice(&self.south.to_le_bytes());
        bytes.extend_from_slice(&self.east.to_le_bytes());

        bytes.push(self.max_zoom);
        bytes.push(self.min_zoom);
        bytes.extend_from_slice(&self.level_count.to_le_bytes());
        bytes.extend_from_slice(&self.tile_count.to_le_bytes());
        bytes.extend_from_slice(&(INDEX_RECORD_LEN as u16).to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&self.payload_len.to_le_bytes());

        bytes
    }

    /// Parses and validates a header from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self, ContainerError> {
        let mut cursor = Cursor::new(data, HEADER_LEN)?;

        let magic = cursor.array::<4>();
        if magic != MAGIC {
            return Err(ContainerError::BadMagic(magic));
        }

        let version = cursor.u16();
        if version != FORMAT_VERSION {
            return Err(ContainerError::UnsupportedVersion(version));
        }

        expect_field("header length", cursor.u16().into(), HEADER_LEN as u64)?;
        let projection = cursor.u32();
        expect_field(
            "projection",
            projection.into(),
            PROJECTION_WEB_MERCATOR.into(),
        )?;

        let north = cursor.i32();
        let west = cursor.i32();
        let south = cursor.i32();
        let east = cursor.i32();
        let max_zoom = cursor.u8();
        let min_zoom = cursor.u8();
        let level_count = cursor.u16();
        let tile_count = cursor.u32();
        expect_field(
            "index record length",
            cursor.u16().into(),
            INDEX_RECORD_LEN as u64,
        )?;
        let _reserved = cursor.u16();
        let payload_len = cursor.u64();

        Ok(Self {
            version,
            projection,
            north,
            west,
            south,
            east,
            max_zoom,
            min_zoom,
            level_count,
            tile_count,
            payload_len,
        })
    }
}

impl IndexEntry {
    /// Serializes the record into its 24-byte little-endian form.
    pub fn to_bytes(&self) -> [u8; INDEX_RECORD_LEN] {
        let mut bytes = [0u8; INDEX_RECORD_LEN];
        bytes[0] = self.address.zoom;
        // bytes 1..4 reserved
        bytes[4..8].copy_from_slice(&self.address.col.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.address.row.to_le_bytes());
        bytes[12..20].copy_from_slice(&self.offset.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.length.to_le_bytes());
        bytes
    }

    /// Parses one record. `data` must hold at least [`INDEX_RECORD_LEN`] bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ContainerError> {
        let mut cursor = Cursor::new(data, INDEX_RECORD_LEN)?;
        let zoom = cursor.u8();
        let _reserved = cursor.array::<3>();
        let col = cursor.u32();
        let row = cursor.u32();
        let offset = cursor.u64();
        let length = cursor.u32();

        Ok(Self {
            address: TileAddress::new(zoom, col, row),
            offset,
            length,
        })
    }
}

fn expect_field(field: &'static str, actual: u64, expected: u64) -> Result<(), ContainerError> {
    if actual != expected {
        return Err(ContainerError::BadLayout {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Little-endian reader over a slice whose length was checked up front.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8], needed: usize) -> Result<Self, ContainerError> {
        if data.len() < needed {
            return Err(ContainerError::Truncated {
                needed,
                actual: data.len(),
            });
        }
        Ok(Self {
            data: &data[..needed],
            pos: 0,
        })
    }

    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.array::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.array())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.array())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.array())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.array())
    }
}
