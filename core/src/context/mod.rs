mod clock;
mod line_source;
mod parsing_session;

pub use clock::{Clock, ManualClock, SystemClock, saturating_seconds};
pub use line_source::{ChannelLineSource, LineSource};
pub use parsing_session::ParsingSession;
