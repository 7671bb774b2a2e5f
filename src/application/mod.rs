//! Application layer - Use cases and port interfaces
//!
//! Contains the recording session manager and the trait definitions
//! for the devices, encoders and observers it talks to.

pub mod notifications;
pub mod ports;
pub mod session_manager;

pub use notifications::NotifierObserver;
pub use session_manager::{ObserverId, RecordingSessionManager};
