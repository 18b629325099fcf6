use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("lexidrag");
            Some(state_dir.join("outcomes.db"))
        } else {
            ProjectDirs::from("", "", "lexidrag")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("outcomes.db"))
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "lexidrag").map(|pd| pd.config_dir().join("config.json"))
    }
}
