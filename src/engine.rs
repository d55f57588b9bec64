//! Entry points for rendering requests.
//!
//! [`plan_and_fetch_memory`] drives the memory path and
//! [`resolve_and_partition`] the indexed-value path. Both check the request's
//! [`CancelToken`] before the backing store is queried, after it answers, and
//! before the result is handed back; a cancelled request returns
//! [`EngineError::Cancelled`] and nothing else.

use crate::cancel::CancelToken;
use crate::core::descriptor::ContentDescriptor;
use crate::core::line::LineSegment;
use crate::error::{EngineError, Rendered, Result};
use crate::memory::block::MemoryBlockHandle;
use crate::memory::delta::{mark_store_monitored, ContentSnapshot};
use crate::memory::fetcher::fetch_window;
use crate::memory::planner::{plan_simple, plan_window, WindowPlan};
use crate::memory::segmenter::segment_lines;
use crate::variables::logical::{resolve_logical_value, StructureProvider};
use crate::variables::partition::{query_size, split_children, Children, Partition};
use crate::variables::value::ValueRef;
use crate::{log_error, span_trace};
use tracing::debug;

/// Per-request knobs for the memory path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions<'a> {
    /// Rows shown at the last suspend, for change marking on stores that
    /// do not track changes.
    pub history: Option<&'a ContentSnapshot>,
    /// Retry from the block's base address instead of failing when the load
    /// address is outside an Extended block.
    pub reset_to_base_on_out_of_range: bool,
}

/// Plan, fetch and segment the window described by `descriptor`.
///
/// A failed store query still yields a full grid of placeholder rows, with
/// the failure reported next to it.
pub fn plan_and_fetch_memory(
    descriptor: &ContentDescriptor,
    block: &MemoryBlockHandle,
    cancel: &CancelToken,
) -> Result<Rendered<Vec<LineSegment>>> {
    plan_and_fetch_memory_with(descriptor, block, FetchOptions::default(), cancel)
}

pub fn plan_and_fetch_memory_with(
    descriptor: &ContentDescriptor,
    block: &MemoryBlockHandle,
    options: FetchOptions<'_>,
    cancel: &CancelToken,
) -> Result<Rendered<Vec<LineSegment>>> {
    let span = span_trace!(
        "plan_and_fetch_memory",
        block = block.kind(),
        load = %descriptor.load_address
    );
    let _guard = span.enter();

    let plan =
        plan_for(descriptor, block, &options).map_err(|e| log_error!(e, "window planning"))?;

    cancel.check("before query")?;
    let fetched = fetch_window(&plan, block);
    cancel.check("after query")?;

    let mut lines = segment_lines(
        &fetched.data,
        &plan.buffer_start,
        plan.bytes_per_line,
        plan.units_per_line,
    );
    if fetched.is_degraded() {
        lines.iter_mut().for_each(|l| l.monitored = false);
    } else if block.manages_changes() {
        mark_store_monitored(&mut lines);
    } else if let Some(history) = options.history {
        history.mark_deltas(&mut lines);
    }

    cancel.check("before handoff")?;
    debug!(
        rows = lines.len(),
        degraded = fetched.is_degraded(),
        "Memory window ready"
    );
    Ok(Rendered {
        data: lines,
        failure: fetched.failure,
    })
}

fn plan_for(
    descriptor: &ContentDescriptor,
    block: &MemoryBlockHandle,
    options: &FetchOptions<'_>,
) -> Result<WindowPlan> {
    match block {
        MemoryBlockHandle::Extended(ext) => {
            let bounds = ext.bounds();
            match plan_window(descriptor, &bounds) {
                Err(EngineError::Range(_))
                    if options.reset_to_base_on_out_of_range
                        && !bounds.admits(&descriptor.load_address) =>
                {
                    let mut reset = descriptor.clone();
                    reset.load_address = ext.base_address();
                    debug!(
                        load = %descriptor.load_address,
                        base = %reset.load_address,
                        "Load address outside block; retrying from base"
                    );
                    plan_window(&reset, &bounds)
                }
                planned => planned,
            }
        }
        MemoryBlockHandle::Simple(simple) => {
            let whole = descriptor.clone().with_buffers(0, 0);
            plan_simple(&whole, simple.start_address(), simple.length())
        }
    }
}

/// Resolve `value` through its logical structures and list its children.
///
/// Children are the elements themselves when the resolved value is small
/// and [`Partition`] placeholders otherwise. Transform, size and element
/// query failures are reported next to whatever could be computed.
pub fn resolve_and_partition(
    value: ValueRef,
    use_logical_structures: bool,
    provider: &dyn StructureProvider,
    partition_size: u64,
    cancel: &CancelToken,
) -> Result<Rendered<Children>> {
    let span = span_trace!(
        "resolve_and_partition",
        type_name = value.type_name(),
        logical = use_logical_structures
    );
    let _guard = span.enter();

    cancel.check("before query")?;
    let resolution = resolve_logical_value(value, use_logical_structures, provider);
    let size = query_size(&resolution.value);
    cancel.check("after query")?;

    let children = split_children(&resolution.value, size, partition_size);
    let failure = resolution.failure.or(children.failure);
    cancel.check("before handoff")?;
    debug!(
        resolved = resolution.value.type_name(),
        applied = resolution.applied.len(),
        children = children.data.len(),
        "Children ready"
    );
    Ok(Rendered {
        data: children.data,
        failure,
    })
}

/// Expand one partition placeholder.
pub fn expand_partition(
    partition: &Partition,
    partition_size: u64,
    cancel: &CancelToken,
) -> Result<Rendered<Children>> {
    let span = span_trace!(
        "expand_partition",
        offset = partition.offset(),
        length = partition.length()
    );
    let _guard = span.enter();

    cancel.check("before query")?;
    let children = partition.expand(partition_size);
    cancel.check("after query")?;
    Ok(children)
}
