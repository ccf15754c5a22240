use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::adjustments::AdjustmentParams;
use crate::engine::{ensure_drawable, Bitmap, EngineResult};

/// Sequence number stamped on every engine call at issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source shared by the preview and quality-preview paths.
#[derive(Debug, Default)]
pub(crate) struct RequestSequence {
    last: u64,
}

impl RequestSequence {
    pub(crate) fn next(&mut self) -> RequestId {
        self.last += 1;
        RequestId(self.last)
    }
}

#[derive(Debug, Clone, Default)]
pub enum Displayed {
    #[default]
    Original,
    Processed {
        request: RequestId,
        bitmap: Arc<Bitmap>,
    },
}

/// Engine call the runtime must perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingTicket {
    pub id: RequestId,
    pub params: AdjustmentParams,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Committed parameters are the identity; the original is shown without an engine call.
    ShowOriginal(RequestId),
    /// No engine loaded; the original stays on screen.
    EngineUnavailable(RequestId),
    /// The source cannot be drawn; the previous preview is kept.
    Aborted(RequestId),
    Issue(ProcessingTicket),
}

impl Dispatch {
    pub const fn id(&self) -> RequestId {
        match self {
            Self::ShowOriginal(id) | Self::EngineUnavailable(id) | Self::Aborted(id) => *id,
            Self::Issue(ticket) => ticket.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied(RequestId),
    /// A newer request was issued after this one; the result was dropped.
    Superseded(RequestId),
    /// The engine failed; the original bitmap is displayed instead.
    FellBackToOriginal(RequestId),
    /// The source could not be decoded; the previous preview is kept.
    KeptPrevious(RequestId),
}

impl Completion {
    pub const fn id(self) -> RequestId {
        match self {
            Self::Applied(id)
            | Self::Superseded(id)
            | Self::FellBackToOriginal(id)
            | Self::KeptPrevious(id) => id,
        }
    }

    /// Whether the user should see a generic failure message.
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::FellBackToOriginal(_))
    }
}

/// Decides which engine result may reach the screen.
///
/// Every dispatch takes a fresh id, including the ones that never reach the
/// engine, so an older in-flight result can never overwrite a newer decision.
#[derive(Debug, Default)]
pub struct ProcessingCoordinator {
    sequence: RequestSequence,
    latest: Option<RequestId>,
    outstanding: BTreeSet<RequestId>,
    displayed: Displayed,
}

impl ProcessingCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn latest(&self) -> Option<RequestId> {
        self.latest
    }

    pub const fn displayed(&self) -> &Displayed {
        &self.displayed
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// True while the latest issued request has not completed.
    pub fn is_busy(&self) -> bool {
        self.latest
            .is_some_and(|latest| self.outstanding.contains(&latest))
    }

    pub fn begin(
        &mut self,
        params: AdjustmentParams,
        engine_available: bool,
        source: &Bitmap,
    ) -> Dispatch {
        let id = self.sequence.next();
        self.latest = Some(id);

        if params.is_identity() {
            tracing::debug!(request = id.value(), "identity parameters; showing original");
            self.displayed = Displayed::Original;
            return Dispatch::ShowOriginal(id);
        }
        if !engine_available {
            tracing::debug!(request = id.value(), "no image engine; showing original");
            self.displayed = Displayed::Original;
            return Dispatch::EngineUnavailable(id);
        }
        if let Err(err) = ensure_drawable(source) {
            tracing::warn!(request = id.value(), %err, "processing aborted");
            return Dispatch::Aborted(id);
        }

        self.outstanding.insert(id);
        tracing::debug!(
            request = id.value(),
            in_flight = self.outstanding.len(),
            "processing request issued"
        );
        Dispatch::Issue(ProcessingTicket { id, params })
    }

    pub fn finish(&mut self, id: RequestId, result: EngineResult<Bitmap>) -> Completion {
        self.outstanding.remove(&id);

        if self.latest != Some(id) {
            tracing::debug!(request = id.value(), latest = ?self.latest, "stale result discarded");
            return Completion::Superseded(id);
        }

        match result {
            Ok(bitmap) => {
                self.displayed = Displayed::Processed {
                    request: id,
                    bitmap: Arc::new(bitmap),
                };
                tracing::debug!(request = id.value(), "processed preview applied");
                Completion::Applied(id)
            }
            Err(err) if err.keeps_previous_preview() => {
                tracing::warn!(request = id.value(), %err, "processing aborted; keeping preview");
                Completion::KeptPrevious(id)
            }
            Err(err) => {
                tracing::warn!(request = id.value(), %err, "processing failed; showing original");
                self.displayed = Displayed::Original;
                Completion::FellBackToOriginal(id)
            }
        }
    }
}
