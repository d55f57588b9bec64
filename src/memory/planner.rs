//! Fetch window planning.
//!
//! Turns a [`ContentDescriptor`] and the bounds of an Extended block into
//! the address range and row count to fetch. Planning is pure: it never
//! touches the store and can be recomputed on every scroll.

use crate::core::address::Address;
use crate::core::descriptor::ContentDescriptor;
use crate::error::{EngineError, Result};
use crate::memory::block::BlockBounds;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A planned fetch window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPlan {
    /// Address of the first row
    pub buffer_start: Address,
    /// Exclusive end of the addressed range; never past the block end
    pub buffer_end: Address,
    /// Rows to fetch; the last row may extend past `buffer_end`
    pub number_of_lines: usize,
    pub units_per_line: u64,
    pub bytes_per_line: usize,
    /// Placeholder bytes in front of the data (Simple blocks only)
    pub leading_bytes: usize,
}

impl WindowPlan {
    /// Units requested from an Extended block.
    pub fn required_units(&self) -> u64 {
        self.units_per_line * self.number_of_lines as u64
    }

    /// Length of the fetched buffer in bytes.
    pub fn required_bytes(&self) -> usize {
        self.bytes_per_line * self.number_of_lines
    }

    /// Whether `address` falls inside `[buffer_start, buffer_end]`.
    pub fn covers(&self, address: &Address) -> bool {
        *address >= self.buffer_start && *address <= self.buffer_end
    }
}

fn units(lines: usize, units_per_line: u64) -> BigUint {
    BigUint::from(lines) * units_per_line
}

fn lines_in(span: &BigUint, units_per_line: u64) -> Result<usize> {
    let lines = (span + (units_per_line - 1)) / units_per_line;
    lines
        .to_usize()
        .ok_or_else(|| EngineError::Range(format!("window of {} units is too large", span)))
}

/// Plan the window for an Extended block.
///
/// The window spans the pre-buffer, the visible rows and the post-buffer
/// around the load address. With dynamic loading the window is clamped to
/// the block and regrown backward when the end was cut; without it the whole
/// window shifts backward when it would run past the block end. The result
/// is then cut down to `visible_lines` rows, starting as close to the
/// pre-buffer as the anchor row and the block end allow.
pub fn plan_window(descriptor: &ContentDescriptor, bounds: &BlockBounds) -> Result<WindowPlan> {
    descriptor.validate()?;
    let load = &descriptor.load_address;
    if !bounds.admits(load) {
        return Err(EngineError::Range(format!(
            "load address {} outside block {}",
            load, bounds
        )));
    }
    if descriptor.visible_lines == 0 {
        return Err(EngineError::Range("no visible lines requested".to_string()));
    }

    let upl = descriptor.units_per_line();
    let anchor = if descriptor.align_to_line {
        load.align_down(upl)
    } else {
        load.clone()
    };

    let pre = units(descriptor.pre_buffer_lines, upl);
    let visible = units(descriptor.visible_lines, upl);
    let post = units(descriptor.post_buffer_lines, upl);
    let requested_span = &pre + &visible + &post;

    let mut start = Address::from(anchor.saturating_sub(&Address::from(pre.clone())));
    let mut end = &(&anchor + &post) + &visible;

    if descriptor.dynamic_load {
        start = start.max(bounds.start.clone());
        if end > bounds.end {
            end = bounds.end.clone();
        }
        // Recover a cut-off tail by growing backward only.
        if end.saturating_sub(&start) < requested_span {
            let grown = Address::from(end.saturating_sub(&Address::from(requested_span.clone())));
            start = grown.max(bounds.start.clone());
        }
    } else {
        if end > bounds.end {
            end = bounds.end.clone();
            start = Address::from(end.saturating_sub(&Address::from(requested_span.clone())));
        }
        start = start.max(bounds.start.clone());
    }

    // At most `visible_lines` rows are fetched. Keep the anchor row and as
    // much of the pre-buffer as fits.
    if end.saturating_sub(&start) > visible {
        let budget = Address::from(visible.clone());
        let wanted = Address::from(anchor.saturating_sub(&Address::from(pre.clone())));
        let earliest = Address::from(anchor.add_units(upl).saturating_sub(&budget));
        let latest = Address::from(end.saturating_sub(&budget));
        start = start.max(wanted).max(earliest).min(latest);
        end = &start + &visible;
    }

    let span = end.saturating_sub(&start);
    if span.is_zero() {
        return Err(EngineError::Range(format!(
            "empty window [{}, {}) in block {}",
            start, end, bounds
        )));
    }
    let number_of_lines = lines_in(&span, upl)?;

    debug!(
        load = %load,
        start = %start,
        end = %end,
        lines = number_of_lines,
        dynamic = descriptor.dynamic_load,
        "Planned fetch window"
    );

    Ok(WindowPlan {
        buffer_start: start,
        buffer_end: end,
        number_of_lines,
        units_per_line: upl,
        bytes_per_line: descriptor.bytes_per_line,
        leading_bytes: 0,
    })
}

/// Plan the window for a Simple block of `length` bytes at `start_address`.
///
/// Simple blocks are always loaded whole with no pre/post buffer. A start
/// address off a row boundary is rounded down and the difference becomes
/// leading placeholder bytes; the tail is padded to a full row.
pub fn plan_simple(
    descriptor: &ContentDescriptor,
    start_address: u64,
    length: u64,
) -> Result<WindowPlan> {
    descriptor.validate()?;
    let upl = descriptor.units_per_line();
    let unit = descriptor.addressable_size;
    let start = Address::from(start_address);
    let aligned = start.align_down(upl);
    let leading_units = (start_address - aligned.to_u64().unwrap_or(start_address)) as usize;
    let leading_bytes = leading_units * unit;

    let length = usize::try_from(length)
        .map_err(|_| EngineError::Range(format!("simple block of {} bytes is too large", length)))?;
    let total = leading_bytes + length;
    let number_of_lines = total.div_ceil(descriptor.bytes_per_line);
    let buffer_end = start.add_units((length / unit) as u64);

    debug!(
        start = %aligned,
        leading = leading_bytes,
        length,
        lines = number_of_lines,
        "Planned simple block window"
    );

    Ok(WindowPlan {
        buffer_start: aligned,
        buffer_end,
        number_of_lines,
        units_per_line: upl,
        bytes_per_line: descriptor.bytes_per_line,
        leading_bytes,
    })
}
