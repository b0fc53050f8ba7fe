// Wishclip platform paths
// Resolves where settings and the local store live on each OS.
//
// `WISHCLIP_DATA_DIR` overrides both locations, which is how the host
// browser points a sandboxed popup process at its profile directory.

use std::env;
use std::path::PathBuf;

const APP_DIR_LOWER: &str = "wishclip";
#[cfg(any(target_os = "macos", target_os = "windows"))]
const APP_DIR_TITLE: &str = "Wishclip";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

fn override_dir() -> Option<PathBuf> {
    env::var("WISHCLIP_DATA_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Returns the directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/wishclip` or `~/.config/wishclip`
/// - **macOS**: `~/Library/Application Support/Wishclip`
/// - **Windows**: `%APPDATA%/Wishclip`
pub fn get_config_dir() -> PathBuf {
    if let Some(dir) = override_dir() {
        return dir;
    }
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join(APP_DIR_TITLE)
    }
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
            .join(APP_DIR_TITLE)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) => PathBuf::from(xdg).join(APP_DIR_LOWER),
            Err(_) => home_dir().join(".config").join(APP_DIR_LOWER),
        }
    }
}

/// Returns the directory holding the local store database.
///
/// - **Linux**: `$XDG_DATA_HOME/wishclip` or `~/.local/share/wishclip`
/// - **macOS**: `~/Library/Application Support/Wishclip`
/// - **Windows**: `%APPDATA%/Wishclip`
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = override_dir() {
        return dir;
    }
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    {
        get_config_dir()
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_DATA_HOME") {
            Ok(xdg) => PathBuf::from(xdg).join(APP_DIR_LOWER),
            Err(_) => home_dir()
                .join(".local")
                .join("share")
                .join(APP_DIR_LOWER),
        }
    }
}

/// Path of the local store database file.
pub fn get_store_path() -> PathBuf {
    get_data_dir().join(format!("{}.db", APP_DIR_LOWER))
}
