//! Configuration and storage locations

mod xdg;

pub use xdg::XdgConfigStore;

use std::path::PathBuf;

/// Directory name used under the platform config and data directories
pub const APP_DIR: &str = "voice2notion";

/// Environment override for the artifact directory
pub const OUTPUT_DIR_ENV: &str = "VOICE2NOTION_OUTPUT_DIR";

/// Application-private storage for the recording artifact
pub fn default_output_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_dir_is_app_scoped() {
        assert!(default_output_dir().ends_with(APP_DIR));
    }
}
