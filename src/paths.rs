use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "lyricfind";

/// Get the application's data directory following XDG standards
/// On Linux: ~/.local/share/lyricfind
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .context("Failed to determine user data directory")?
        .join(APP_DIR);

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    Ok(data_dir)
}

/// Get the application's log directory
pub fn get_log_dir() -> Result<PathBuf> {
    let log_dir = get_data_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    Ok(log_dir)
}

/// Get the path of the optional config file. The file itself is not created.
/// On Linux: ~/.config/lyricfind/config.json
pub fn get_config_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Failed to determine user config directory")?
        .join(APP_DIR)
        .join("config.json"))
}
