use shopwatch_types::{EngineSettings, ManualCounts};
use tokio::sync::watch;

use super::clock::{Clock, SystemClock};
use super::line_source::LineSource;
use crate::events::{EngineSignal, SignalHandler};
use crate::signal_processor::ClassificationEngine;
use crate::state::MatchSnapshot;

/// Single writer around the engine. Feeds lines in order, dispatches the
/// resulting signals to registered handlers and publishes a fresh snapshot
/// whenever the effective state changes.
pub struct ParsingSession<C: Clock = SystemClock> {
    engine: ClassificationEngine<C>,
    signal_handlers: Vec<Box<dyn SignalHandler + Send + Sync>>,
    snapshot_tx: watch::Sender<MatchSnapshot>,
    lines_processed: u64,
}

impl ParsingSession<SystemClock> {
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_engine(ClassificationEngine::new(settings))
    }
}

impl<C: Clock> ParsingSession<C> {
    pub fn with_engine(engine: ClassificationEngine<C>) -> Self {
        let (snapshot_tx, _) = watch::channel(engine.snapshot());
        Self {
            engine,
            signal_handlers: Vec::new(),
            snapshot_tx,
            lines_processed: 0,
        }
    }

    /// Receiver that always holds the latest published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<MatchSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Register a signal handler to receive engine signals
    pub fn add_signal_handler(&mut self, handler: Box<dyn SignalHandler + Send + Sync>) {
        self.signal_handlers.push(handler);
    }

    pub fn engine(&self) -> &ClassificationEngine<C> {
        &self.engine
    }

    pub fn lines_processed(&self) -> u64 {
        self.lines_processed
    }

    /// Process a single live line
    pub fn process_line(&mut self, line: &str) {
        let signals = self.engine.process(line);
        self.lines_processed += 1;
        self.dispatch_signals(&signals);
        self.publish();
    }

    /// Process the startup backlog as one batch
    pub fn catch_up(&mut self, lines: Vec<String>) {
        let count = lines.len() as u64;
        let signals = self.engine.catch_up(lines);
        self.lines_processed += count;
        self.dispatch_signals(&signals);
        self.publish();
    }

    /// Drain a source: backlog first, then live lines until it closes.
    pub async fn run<S: LineSource>(&mut self, mut source: S) -> u64 {
        let backlog = source.backlog();
        tracing::info!("[SESSION] Catching up on {} backlog lines", backlog.len());
        self.catch_up(backlog);

        while let Some(line) = source.next_line().await {
            self.process_line(&line);
        }

        tracing::info!("[SESSION] Line source closed after {} lines", self.lines_processed);
        self.lines_processed
    }

    /// Force the published counts, or clear the override with `None`.
    pub fn set_manual_counts(&mut self, counts: Option<ManualCounts>) {
        self.engine.set_manual_counts(counts);
        self.publish();
    }

    fn dispatch_signals(&mut self, signals: &[EngineSignal]) {
        if signals.is_empty() {
            return;
        }
        for handler in &mut self.signal_handlers {
            handler.handle_signals(signals);
        }
    }

    fn publish(&self) {
        let snapshot = self.engine.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}
