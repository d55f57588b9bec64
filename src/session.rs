//! View sessions: one viewport, one request in flight.
//!
//! A [`ViewSession`] owns the [`ContentDescriptor`] of a single view and runs
//! each rendering request on a Tokio blocking worker. Starting a request
//! cancels the one before it, so a burst of scrolls only completes the last.
//! Sessions share nothing with each other.
//!
//! All request methods must be called from within a Tokio runtime.

use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::core::address::Address;
use crate::core::descriptor::ContentDescriptor;
use crate::core::line::LineSegment;
use crate::engine::{
    expand_partition, plan_and_fetch_memory_with, resolve_and_partition, FetchOptions,
};
use crate::error::{EngineError, Rendered, Result};
use crate::memory::block::MemoryBlockHandle;
use crate::memory::delta::ContentSnapshot;
use crate::variables::logical::StructureProvider;
use crate::variables::partition::{Children, Partition};
use crate::variables::value::ValueRef;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info_span};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// A request running on a blocking worker.
pub struct PendingRequest<T> {
    handle: JoinHandle<Result<T>>,
    token: CancelToken,
}

impl<T> PendingRequest<T> {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the worker. A superseded request yields `Cancelled`.
    pub async fn wait(self) -> Result<T> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) => Err(EngineError::Worker(err.to_string())),
        }
    }
}

/// Text of one rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowText {
    pub label: String,
    pub cells: Vec<String>,
}

pub struct ViewSession {
    id: u64,
    descriptor: ContentDescriptor,
    config: EngineConfig,
    in_flight: Option<CancelToken>,
}

impl ViewSession {
    pub fn new(descriptor: ContentDescriptor, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        descriptor.validate()?;
        Ok(Self {
            id: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
            descriptor,
            config,
            in_flight: None,
        })
    }

    /// Session over a descriptor built from `config.memory`.
    pub fn from_config(
        load_address: Address,
        visible_lines: usize,
        config: EngineConfig,
    ) -> Result<Self> {
        let descriptor =
            ContentDescriptor::from_config(load_address, visible_lines, &config.memory);
        Self::new(descriptor, config)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn descriptor(&self) -> &ContentDescriptor {
        &self.descriptor
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Move the viewport. The next refresh fetches around `address`.
    pub fn scroll_to(&mut self, address: Address) {
        self.cancel_in_flight();
        debug!(session = self.id, load = %address, "Scroll");
        self.descriptor.load_address = address;
    }

    /// Change the number of visible rows.
    pub fn resize(&mut self, visible_lines: usize) -> Result<()> {
        if visible_lines == 0 {
            return Err(EngineError::InvalidDescriptor(
                "visible_lines must be non-zero".to_string(),
            ));
        }
        self.cancel_in_flight();
        debug!(session = self.id, visible_lines, "Resize");
        self.descriptor.visible_lines = visible_lines;
        Ok(())
    }

    pub fn cancel_in_flight(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            if !previous.is_cancelled() {
                debug!(session = self.id, "Superseding in-flight request");
            }
            previous.cancel();
        }
    }

    fn begin(&mut self) -> CancelToken {
        self.cancel_in_flight();
        let token = CancelToken::new();
        self.in_flight = Some(token.clone());
        token
    }

    fn spawn<T, F>(&mut self, name: &'static str, job: F) -> PendingRequest<T>
    where
        T: Send + 'static,
        F: FnOnce(CancelToken) -> Result<T> + Send + 'static,
    {
        let token = self.begin();
        let worker_token = token.clone();
        let span = info_span!("session_request", session = self.id, request = name);
        let handle = tokio::task::spawn_blocking(move || {
            let _guard = span.enter();
            job(worker_token)
        });
        PendingRequest { handle, token }
    }

    /// Fetch the current window from `block`.
    ///
    /// `history` is the snapshot of the rows shown at the last suspend, used
    /// to mark changed bytes when the store does not track changes.
    pub fn refresh_memory(
        &mut self,
        block: Arc<MemoryBlockHandle>,
        history: Option<Arc<ContentSnapshot>>,
    ) -> PendingRequest<Rendered<Vec<LineSegment>>> {
        let descriptor = self.descriptor.clone();
        let reset = self.config.memory.reset_to_base_on_out_of_range;
        self.spawn("refresh_memory", move |token| {
            let options = FetchOptions {
                history: history.as_deref(),
                reset_to_base_on_out_of_range: reset,
            };
            plan_and_fetch_memory_with(&descriptor, &block, options, &token)
        })
    }

    /// List the children of `value`.
    pub fn expand_value(
        &mut self,
        value: ValueRef,
        provider: Arc<dyn StructureProvider>,
    ) -> PendingRequest<Rendered<Children>> {
        let logical = self.config.variables.show_logical_structures;
        let size = self.config.variables.partition_size;
        self.spawn("expand_value", move |token| {
            resolve_and_partition(value, logical, provider.as_ref(), size, &token)
        })
    }

    pub fn expand_partition(&mut self, partition: Partition) -> PendingRequest<Rendered<Children>> {
        let size = self.config.variables.partition_size;
        self.spawn("expand_partition", move |token| {
            expand_partition(&partition, size, &token)
        })
    }

    /// Address labels and hex cells for `lines` fetched from `block`.
    pub fn format_rows(&self, lines: &[LineSegment], block: &MemoryBlockHandle) -> Vec<RowText> {
        let address_size = lines
            .first()
            .map(|l| block.address_size(&l.address))
            .unwrap_or(self.config.memory.default_address_size);
        lines
            .iter()
            .map(|line| RowText {
                label: line.address_label(address_size),
                cells: line.hex_cells(&self.config.memory.padded_str),
            })
            .collect()
    }
}

impl Drop for ViewSession {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

impl std::fmt::Debug for ViewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewSession")
            .field("id", &self.id)
            .field("descriptor", &self.descriptor)
            .field("in_flight", &self.in_flight.is_some())
            .finish()
    }
}
