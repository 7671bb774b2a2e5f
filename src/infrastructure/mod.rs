//! Infrastructure layer - Adapter implementations
//!
//! Concrete implementations of the port interfaces: cpal and synthetic
//! capture devices, FLAC/WAV artifact encoders, desktop notifications and
//! the TOML config store.

pub mod capture;
pub mod config;
pub mod encoding;
pub mod notification;

pub use capture::{create_capture_device, CpalMicrophone, SyntheticBehavior, SyntheticTone};
pub use config::{default_output_dir, XdgConfigStore};
pub use encoding::ArtifactFileEncoder;
pub use notification::NotifyRustNotifier;
