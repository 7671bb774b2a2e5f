//! Domain layer - Core recording model
//!
//! Value objects, the recording session entity, configuration and errors.
//! Nothing here touches devices, files or the terminal.

pub mod config;
pub mod error;
pub mod recording;

pub use config::AppConfig;
pub use error::*;
pub use recording::{
    AudioFormat, Codec, Duration, Quality, RecordingSession, RecordingState, SessionId,
};
