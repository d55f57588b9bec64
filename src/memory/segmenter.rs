//! Slicing fetched buffers into rows.

use crate::core::address::Address;
use crate::core::line::LineSegment;
use crate::core::memory_byte::MemoryByte;

/// Cut `buffer` into rows of `bytes_per_line`, addressing row `i` at
/// `start + i * units_per_line`.
///
/// The buffer length must be a multiple of `bytes_per_line`; the fetcher
/// guarantees this by padding. A trailing partial row is dropped.
pub fn segment_lines(
    buffer: &[MemoryByte],
    start: &Address,
    bytes_per_line: usize,
    units_per_line: u64,
) -> Vec<LineSegment> {
    if bytes_per_line == 0 {
        return Vec::new();
    }
    debug_assert_eq!(buffer.len() % bytes_per_line, 0);

    let mut address = start.clone();
    buffer
        .chunks_exact(bytes_per_line)
        .map(|chunk| {
            let line = LineSegment::new(address.clone(), chunk.to_vec());
            address = address.add_units(units_per_line);
            line
        })
        .collect()
}

/// Flatten rows back into one buffer.
pub fn join_lines(lines: &[LineSegment]) -> Vec<MemoryByte> {
    lines.iter().flat_map(|l| l.bytes.iter().copied()).collect()
}

/// Whether `address` is inside the rows currently rendered.
pub fn buffer_contains(lines: &[LineSegment], address: &Address, units_per_line: u64) -> bool {
    match (lines.first(), lines.last()) {
        (Some(first), Some(last)) => {
            let end = last.address.add_units(units_per_line);
            *address >= first.address && *address < end
        }
        _ => false,
    }
}
