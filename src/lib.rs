//! Voice2Notion - voice note recording session manager
//!
//! Records microphone audio into a single fixed-path artifact (12 kHz mono
//! FLAC or WAV), one session at a time, and publishes every state change
//! to registered observers.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Recording state, sessions, audio format, config and errors
//! - **Application**: The session manager and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, FLAC/WAV, notify-rust, TOML config)
//! - **CLI**: Command-line interface, daemon control socket and signal handling

pub mod application;
#[cfg(unix)]
pub mod cli;
pub mod domain;
pub mod infrastructure;
