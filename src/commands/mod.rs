//! CLI command implementations.
//!
//! Each submodule is one subcommand. Commands return `anyhow::Result` and
//! handle their own user-facing output; the binary entry point maps errors
//! to a non-zero exit code.

pub mod seed;
pub mod serve;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use foundernet::config::{self, Config};
use foundernet::server::AppState;
use foundernet::store::file::{FileEventStore, FileMessageStore, FileUserStore};

/// Resolve the data directory from config, CLI override, and defaults.
fn resolve_data_dir(config_path: &str, config: &Config, override_dir: Option<&Path>) -> PathBuf {
    let config_path_ref = Path::new(config_path);
    let raw = override_dir
        .map(Path::to_path_buf)
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_DATA_DIR));
    config::resolve_path(config_path_ref, &raw)
}

/// Open the file stores under the data directory and assemble shared state.
async fn open_state(data_dir: &Path) -> Result<AppState> {
    let users = Arc::new(FileUserStore::open(data_dir.join(config::USERS_DIR)).await?);
    let events = Arc::new(FileEventStore::open(data_dir.join(config::EVENTS_DIR)).await?);
    let messages = Arc::new(FileMessageStore::open(data_dir.join(config::MESSAGES_DIR)).await?);
    Ok(AppState::new(users, events, messages))
}
