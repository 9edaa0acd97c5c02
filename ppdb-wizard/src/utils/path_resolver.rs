use anyhow::Result;
use std::path::PathBuf;

const APP_DIR: &str = "ppdb-wizard";

/// Resolve the per-user data folder (absolute path)
pub fn resolve_data_folder() -> Result<PathBuf> {
    // Prefer the platform data dir (~/.local/share, %LOCALAPPDATA%, ...)
    if let Some(dir) = dirs::data_local_dir() {
        return Ok(dir.join(APP_DIR));
    }

    // Fallback: current working directory
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Ok(cwd.join(APP_DIR))
}

/// Default location of the file-backed draft store
pub fn default_draft_store_path() -> Result<PathBuf> {
    Ok(resolve_data_folder()?.join("drafts.json"))
}

/// Resolve log folder (absolute path), creating it if needed
pub fn resolve_log_folder(configured: Option<&std::path::Path>) -> Result<PathBuf> {
    let log_dir = match configured {
        Some(p) => p.to_path_buf(),
        None => resolve_data_folder()?.join("logs"),
    };
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create log folder {:?}: {}", log_dir, e))?;
    Ok(log_dir)
}
