//! Container parsing.

use super::types::*;

/// Parser for containers produced by [`assemble`](super::assemble).
pub struct ContainerReader;

impl ContainerReader {
    /// Parses and validates a whole container.
    ///
    /// Checks the header fields, the total length, and that index entries are
    /// in `(zoom, row, col)` order and cover the payload contiguously.
    pub fn parse(data: &[u8]) -> Result<ParsedContainer<'_>, ContainerError> {
        let header = ContainerHeader::parse(data)?;

        let payload_offset = header.payload_offset();
        // Saturate so a crafted payload length reports as a length mismatch
        let expected_len = (payload_offset as u64)
            .checked_add(header.payload_len)
            .unwrap_or(u64::MAX);
        if data.len() as u64 != expected_len || payload_offset > data.len() {
            return Err(ContainerError::BadLayout {
                field: "file length",
                expected: expected_len,
                actual: data.len() as u64,
            });
        }

        let mut entries = Vec::with_capacity(header.tile_count as usize);
        let mut next_offset = 0u64;
        for (index, record) in data[HEADER_LEN..payload_offset]
            .chunks_exact(INDEX_RECORD_LEN)
            .enumerate()
        {
            let entry = IndexEntry::parse(record)?;

            if entry.offset != next_offset {
                return Err(ContainerError::BadIndex {
                    index,
                    reason: format!("offset {} does not follow {}", entry.offset, next_offset),
                });
            }
            if let Some(previous) = entries.last().map(|e: &IndexEntry| e.address) {
                if entry.address <= previous {
                    return Err(ContainerError::BadIndex {
                        index,
                        reason: format!("{} is out of order after {}", entry.address, previous),
                    });
                }
            }
            if entry.address.zoom < header.min_zoom || entry.address.zoom > header.max_zoom {
                return Err(ContainerError::BadIndex {
                    index,
                    reason: format!("zoom {} outside header range", entry.address.zoom),
                });
            }

            next_offset += u64::from(entry.length);
            entries.push(entry);
        }

        if next_offset != header.payload_len {
            return Err(ContainerError::BadLayout {
                field: "payload length",
                expected: header.payload_len,
                actual: next_offset,
            });
        }

        Ok(ParsedContainer {
            header,
            entries,
            payload: &data[payload_offset..],
        })
    }
}

/// A validated container borrowing its bytes.
#[derive(Debug)]
pub struct ParsedContainer<'a> {
    header: ContainerHeader,
    entries: Vec<IndexEntry>,
    payload: &'a [u8],
}

impl<'a> ParsedContainer<'a> {
    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// The payload region.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Image bytes of one entry.
    pub fn tile_data(&self, entry: &IndexEntry) -> &'a [u8] {
        let start = entry.offset as usize;
        &self.payload[start..start + entry.length as usize]
    }
}
