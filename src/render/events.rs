use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::render::job::JobInfo;

/// Lifecycle notifications fired synchronously by the engine.
///
/// Block events may be delivered from rayon worker threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderEvent {
    RenderStart,
    RenderFinished,
    ProcessStart(JobInfo),
    ProcessComplete(JobInfo),
    BlockStarted {
        block_num: usize,
        total: usize,
        start_byte: usize,
        end_byte: usize,
    },
    BlockFinished {
        block_num: usize,
        done_count: usize,
        total: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    RenderStart,
    RenderFinished,
    ProcessStart,
    ProcessComplete,
    BlockStarted,
    BlockFinished,
}

impl RenderEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::RenderStart => EventKind::RenderStart,
            Self::RenderFinished => EventKind::RenderFinished,
            Self::ProcessStart(_) => EventKind::ProcessStart,
            Self::ProcessComplete(_) => EventKind::ProcessComplete,
            Self::BlockStarted { .. } => EventKind::BlockStarted,
            Self::BlockFinished { .. } => EventKind::BlockFinished,
        }
    }
}

pub type Listener = Arc<dyn Fn(&RenderEvent) + Send + Sync>;

/// Per-engine observer registry. Emitting with no listeners is a no-op.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<Listener>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<_, _> = self
            .listeners
            .iter()
            .map(|(k, v)| (*k, v.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("listeners", &counts)
            .finish()
    }
}

impl EventBus {
    pub fn listen<F>(&mut self, kind: EventKind, f: F)
    where
        F: Fn(&RenderEvent) + Send + Sync + 'static,
    {
        self.listeners.entry(kind).or_default().push(Arc::new(f));
    }

    pub fn emit(&self, event: &RenderEvent) {
        if let Some(listeners) = self.listeners.get(&event.kind()) {
            for l in listeners {
                l(event);
            }
        }
    }
}
