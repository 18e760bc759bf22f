//! Container assembly.

use super::types::*;
use crate::error::ExportError;
use crate::fetch::{DownloadedTile, TileOutcome};
use tracing::debug;

/// Builds a container from fetched tiles.
///
/// Tiles are laid out in `(zoom, row, col)` order whatever order they arrive
/// in, so the same tiles always produce the same bytes. Blank tiles have no
/// index entry.
///
/// # Errors
///
/// [`ExportError::AssemblyInvariant`] if the same address appears twice, a
/// tile lies outside the georeferenced zoom range, or a count overflows its
/// field.
pub fn assemble(
    mut tiles: Vec<DownloadedTile>,
    georef: &Georef,
) -> Result<Vec<u8>, ExportError> {
    tiles.sort_by_key(|t| t.address);

    if let Some(pair) = tiles.windows(2).find(|w| w[0].address == w[1].address) {
        return Err(ExportError::AssemblyInvariant(format!(
            "tile {} appears more than once",
            pair[0].address
        )));
    }

    let zooms = georef.min_zoom..=georef.max_zoom;
    if let Some(tile) = tiles.iter().find(|t| !zooms.contains(&t.address.zoom)) {
        return Err(ExportError::AssemblyInvariant(format!(
            "tile {} is outside zoom range {}..={}",
            tile.address, georef.min_zoom, georef.max_zoom
        )));
    }

    let blank = tiles.iter().filter(|t| t.is_blank()).count();
    let images: Vec<(_, Vec<u8>)> = tiles
        .into_iter()
        .filter_map(|t| match t.outcome {
            TileOutcome::Image(data) => Some((t.address, data)),
            TileOutcome::Blank => None,
        })
        .collect();

    let tile_count = u32::try_from(images.len()).map_err(|_| {
        ExportError::AssemblyInvariant(format!("{} tiles exceed the index limit", images.len()))
    })?;

    let mut index = Vec::with_capacity(images.len());
    let mut offset = 0u64;
    for (address, data) in &images {
        let length = u32::try_from(data.len()).map_err(|_| {
            ExportError::AssemblyInvariant(format!(
                "tile {} is {} bytes, larger than a record can describe",
                address,
                data.len()
            ))
        })?;
        index.push(IndexEntry {
            address: *address,
            offset,
            length,
        });
        offset += u64::from(length);
    }
    let payload_len = offset;

    verify_index(&index, payload_len)?;

    let header = ContainerHeader::new(georef, tile_count, payload_len);
    let total_len = header.payload_offset() + payload_len as usize;
    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(&header.to_bytes());
    for entry in &index {
        out.extend_from_slice(&entry.to_bytes());
    }
    for (_, data) in &images {
        out.extend_from_slice(data);
    }

    if out.len() != total_len {
        return Err(ExportError::AssemblyInvariant(format!(
            "container is {} bytes, expected {}",
            out.len(),
            total_len
        )));
    }

    debug!(
        tiles = tile_count,
        blank,
        payload_bytes = payload_len,
        total_bytes = out.len(),
        "Container assembled"
    );

    Ok(out)
}

/// Checks that entries tile the payload exactly, in order, without gaps.
fn verify_index(index: &[IndexEntry], payload_len: u64) -> Result<(), ExportError> {
    let mut expected = 0u64;
    for entry in index {
        if entry.offset != expected {
            return Err(ExportError::AssemblyInvariant(format!(
                "entry for {} starts at {}, expected {}",
                entry.address, entry.offset, expected
            )));
        }
        expected += u64::from(entry.length);
    }
    if expected != payload_len {
        return Err(ExportError::AssemblyInvariant(format!(
            "index covers {} bytes but payload is {}",
            expected, payload_len
        )));
    }
    Ok(())
}
