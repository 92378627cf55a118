use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::events::{EngineSignal, SignalHandler};

/// Keeps the most recent diagnostic signals in a bounded ring.
///
/// Clones share the same ring: register one clone with a session and keep
/// another to inspect what went wrong.
#[derive(Debug, Clone)]
pub struct DiagnosticRecorder {
    entries: Arc<Mutex<VecDeque<EngineSignal>>>,
    capacity: usize,
}

impl DiagnosticRecorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Recorded diagnostics, oldest first.
    pub fn recent(&self) -> Vec<EngineSignal> {
        self.entries().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<EngineSignal>> {
        // A panicking handler cannot leave the ring half-written.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SignalHandler for DiagnosticRecorder {
    fn handle_signal(&mut self, signal: &EngineSignal) {
        if !signal.is_diagnostic() || self.capacity == 0 {
            return;
        }
        let mut entries = self.entries();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(signal.clone());
    }
}
