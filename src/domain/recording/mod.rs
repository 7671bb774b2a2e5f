//! Recording domain: session state machine and fixed encoding parameters

mod duration;
mod format;
mod session;
mod state;

pub use duration::Duration;
pub use format::{AudioFormat, Codec, Quality, CHANNELS, SAMPLE_RATE};
pub use session::{RecordingSession, SessionId};
pub use state::RecordingState;
