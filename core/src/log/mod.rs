//! Log line grammar.
//!
//! The game log is loosely structured free text. Everything the engine
//! reacts to is declared here as a named rule, so the rule table can be
//! tested without running the state machines.

mod backlog;
mod rules;
mod zone_line;

pub use backlog::trailing_window;
pub use rules::{LineFacts, Marker};
pub use zone_line::{EntityId, LogZone, Side, ZoneChange, parse_zone_change};
