pub mod export;
pub mod init;
pub mod inspect;

pub use export::{export, ExportArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};

use anyhow::{anyhow, Result};
use blockmail_editor::{EditSession, SessionConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve a user-supplied path against the working directory
fn resolve_path(cwd: &str, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        PathBuf::from(cwd).join(path)
    }
}

/// Read a template file into a fresh edit session
fn load_session(path: &Path, config: &SessionConfig) -> Result<EditSession> {
    let source = fs::read_to_string(path)
        .map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))?;

    let name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("template");

    let mut session = EditSession::new(name, config);
    session
        .load_json(&source)
        .map_err(|e| anyhow!("{}: {}", path.display(), e))?;

    Ok(session)
}
