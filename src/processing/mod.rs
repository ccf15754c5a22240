//! Preview processing: sequencing engine calls on committed parameters.

mod coordinator;
pub(crate) mod worker;

pub use coordinator::{
    Completion, Dispatch, Displayed, ProcessingCoordinator, ProcessingTicket, RequestId,
};
pub(crate) use coordinator::RequestSequence;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::adjustments::AdjustmentParams;
use crate::engine::{Bitmap, EngineResult, FilterArgs, ImageEngine};
use worker::{guard_engine_call, WorkerChannel};

type ProcessingOutcome = (RequestId, EngineResult<Bitmap>);

/// Owns the source bitmap and runs issued tickets on background workers.
pub struct ProcessingRuntime {
    coordinator: ProcessingCoordinator,
    engine: Option<Arc<dyn ImageEngine>>,
    source: Arc<Bitmap>,
    results: WorkerChannel<ProcessingOutcome>,
}

impl ProcessingRuntime {
    pub fn new(source: Arc<Bitmap>, engine: Option<Arc<dyn ImageEngine>>) -> Self {
        Self {
            coordinator: ProcessingCoordinator::new(),
            engine,
            source,
            results: WorkerChannel::new(),
        }
    }

    pub const fn coordinator(&self) -> &ProcessingCoordinator {
        &self.coordinator
    }

    pub fn engine(&self) -> Option<&Arc<dyn ImageEngine>> {
        self.engine.as_ref()
    }

    pub fn source(&self) -> &Arc<Bitmap> {
        &self.source
    }

    pub fn is_busy(&self) -> bool {
        self.coordinator.is_busy()
    }

    /// Bitmap that should currently be on screen.
    pub fn displayed_bitmap(&self) -> Arc<Bitmap> {
        match self.coordinator.displayed() {
            Displayed::Processed { bitmap, .. } => Arc::clone(bitmap),
            Displayed::Original => Arc::clone(&self.source),
        }
    }

    /// Dispatches `params`, which must be a committed snapshot.
    pub fn submit(&mut self, params: AdjustmentParams) -> Dispatch {
        let dispatch = self
            .coordinator
            .begin(params, self.engine.is_some(), &self.source);
        if let (Dispatch::Issue(ticket), Some(engine)) = (&dispatch, &self.engine) {
            let id = ticket.id;
            let args = FilterArgs::from(&ticket.params);
            let engine = Arc::clone(engine);
            let source = Arc::clone(&self.source);
            self.results.spawn_worker_action(move || {
                let result = guard_engine_call(|| engine.process_all_filters(&source, &args));
                (id, result)
            });
        }
        dispatch
    }

    /// Applies every result that has arrived; never blocks.
    pub fn poll(&mut self) -> Vec<Completion> {
        self.results
            .drain()
            .into_iter()
            .map(|(id, result)| self.coordinator.finish(id, result))
            .collect()
    }

    /// Blocks up to `timeout` for the next result.
    pub fn wait_next(&mut self, timeout: Duration) -> Option<Completion> {
        let (id, result) = self.results.recv_timeout(timeout)?;
        Some(self.coordinator.finish(id, result))
    }

    /// Blocks until no request is in flight or `timeout` elapses.
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<Completion> {
        let deadline = Instant::now() + timeout;
        let mut completions = Vec::new();
        while self.coordinator.outstanding() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.wait_next(remaining) {
                Some(completion) => completions.push(completion),
                None => break,
            }
        }
        completions
    }
}
