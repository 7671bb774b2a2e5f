//! Desktop notification adapters (notify-rust: D-Bus on Linux, native elsewhere)

mod notify_rust;

pub use notify_rust::NotifyRustNotifier;
