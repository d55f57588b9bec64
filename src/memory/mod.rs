//! Memory rendering path: plan a window, fetch it, cut it into rows.
//!
//! [`planner`] computes the window from the viewport state, [`fetcher`]
//! retrieves it from a [`block::MemoryBlockHandle`] degrading to
//! placeholders on failure, and [`segmenter`] slices the result into
//! [`LineSegment`](crate::core::LineSegment)s. [`delta`] marks changed bytes
//! for stores without their own change tracking.

pub mod block;
pub mod buffer;
pub mod delta;
pub mod fetcher;
pub mod planner;
pub mod segmenter;

pub use block::{BlockBounds, BlockError, ExtendedMemoryBlock, MemoryBlockHandle, SimpleMemoryBlock};
pub use buffer::{BufferMemoryBlock, FlatMemoryBlock};
pub use delta::ContentSnapshot;
pub use fetcher::fetch_window;
pub use planner::{plan_simple, plan_window, WindowPlan};
pub use segmenter::{buffer_contains, segment_lines};
