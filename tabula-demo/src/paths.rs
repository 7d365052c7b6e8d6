//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "tabula";
const APPLICATION: &str = "tabula-demo";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the config directory for the ini and style files.
///
/// - Linux: `$XDG_CONFIG_HOME/tabula-demo` or `~/.config/tabula-demo`
/// - macOS: `~/Library/Application Support/dev.tabula.tabula-demo`
/// - Windows: `C:\Users\<User>\AppData\Roaming\tabula\tabula-demo\config`
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the cache directory, where logs go.
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Persisted table settings.
pub fn settings_ini() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("tabula.ini"))
}

/// Optional style overrides.
pub fn style_json() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("style.json"))
}

pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("latest.log"))
}

/// Maximum number of old log files to keep.
const MAX_OLD_LOGS: usize = 10;

/// Rename latest.log to a timestamped name and drop the oldest archives.
///
/// Call this at startup before creating the new log file.
pub fn rotate_logs(latest: &Path) {
    let Some(dir) = latest.parent() else { return };
    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let _ = fs::rename(latest, dir.join(format!("{timestamp}.log")));
    }
    cleanup_old_logs(dir, latest);
}

fn cleanup_old_logs(dir: &Path, latest: &Path) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let path = e.path();
            path.extension().is_some_and(|ext| ext == "log") && path != latest
        })
        .collect();

    // Oldest first
    logs.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());

    if logs.len() > MAX_OLD_LOGS {
        for entry in logs.iter().take(logs.len() - MAX_OLD_LOGS) {
            let _ = fs::remove_file(entry.path());
        }
    }
}
