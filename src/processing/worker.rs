use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::time::Duration;

use crate::engine::{EngineError, EngineResult};

/// Results of background engine calls, collected on the host thread.
#[derive(Debug)]
pub(crate) struct WorkerChannel<T> {
    tx: mpsc::Sender<T>,
    rx: mpsc::Receiver<T>,
}

impl<T: Send + 'static> WorkerChannel<T> {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel::<T>();
        Self { tx, rx }
    }

    pub(crate) fn spawn_worker_action<W>(&self, work: W)
    where
        W: FnOnce() -> T + Send + 'static,
    {
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let result = work();
            let _ = tx.send(result);
        });
    }

    /// Everything that completed since the last drain, without blocking.
    pub(crate) fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }

    pub(crate) fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Runs an engine call, turning a panic inside the engine into an error.
pub(crate) fn guard_engine_call<T>(call: impl FnOnce() -> EngineResult<T>) -> EngineResult<T> {
    panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "engine panicked".to_string());
        Err(EngineError::Processing(reason))
    })
}
