pub mod context;
pub mod error;
pub mod events;
pub mod handlers;
pub mod log;
pub mod signal_processor;
pub mod state;

// Re-exports for convenience
pub use context::{ChannelLineSource, Clock, LineSource, ManualClock, ParsingSession, SystemClock};
pub use error::LineError;
pub use events::{EngineSignal, ExitReason, ResetCause, SignalHandler};
pub use handlers::DiagnosticRecorder;
pub use signal_processor::ClassificationEngine;
pub use state::{CountField, MatchSnapshot, MatchState, Phase};
