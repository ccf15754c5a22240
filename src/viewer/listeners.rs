use crate::input::ListenerKind;

/// Handle the host returns for an attached listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Document/window event registration provided by the host shell.
pub trait ListenerHost {
    fn attach(&mut self, kind: ListenerKind) -> ListenerId;
    fn detach(&mut self, id: ListenerId);
}

/// Listeners currently registered on behalf of an open viewer.
#[derive(Debug, Default)]
pub struct ListenerSet {
    attached: Vec<(ListenerKind, ListenerId)>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self, kind: ListenerKind) -> bool {
        self.attached.iter().any(|(attached, _)| *attached == kind)
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    /// Attaches every viewer listener that is not attached yet.
    pub fn attach_all(&mut self, host: &mut dyn ListenerHost) {
        for kind in ListenerKind::ALL {
            if self.is_attached(kind) {
                continue;
            }
            let id = host.attach(kind);
            self.attached.push((kind, id));
        }
        tracing::debug!(count = self.attached.len(), "viewer listeners attached");
    }

    /// Detaches everything and returns how many listeners were removed.
    pub fn detach_all(&mut self, host: &mut dyn ListenerHost) -> usize {
        let count = self.attached.len();
        for (_, id) in self.attached.drain(..) {
            host.detach(id);
        }
        if count > 0 {
            tracing::debug!(count, "viewer listeners detached");
        }
        count
    }
}
