//! Georeferenced tile container.
//!
//! A container is a single little-endian file a GPS device can load:
//!
//! ```text
//! ┌──────────────┐ 0
//! │ header (48)  │ magic "JNXT", version, projection, bounds, zooms, counts
//! ├──────────────┤ 48
//! │ index        │ 24 bytes per tile: zoom, col, row, offset, length
//! ├──────────────┤ 48 + 24 × tiles
//! │ payload      │ encoded images back to back, in index order
//! └──────────────┘
//! ```
//!
//! Bounds are stored as `i32` fixed-point angles (`deg × 2^31 / 180`).
//! Offsets in the index are relative to the payload start.

mod header;
mod reader;
mod types;
mod writer;

pub use reader::{ContainerReader, ParsedContainer};
pub use types::{
    from_angle_units, to_angle_units, ContainerError, ContainerHeader, Georef, IndexEntry,
    FORMAT_VERSION, HEADER_LEN, INDEX_RECORD_LEN, MAGIC, PROJECTION_WEB_MERCATOR,
};
pub use writer::assemble;
