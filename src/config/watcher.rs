//! Configuration hot reload.
//!
//! Watches the config file and emits validated `GatewayConfig` values on
//! a channel. A file change that fails to load or validate is logged and
//! skipped; the running configuration stays in effect.

use std::path::Path;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Start watching `path` for changes.
///
/// Returns the watcher guard, which must stay alive for events to fire,
/// and the receiver of validated configurations. Unchanged content is
/// not re-emitted even when the file is rewritten in place.
pub fn watch(
    path: &Path,
) -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<GatewayConfig>), notify::Error> {
    let (tx, rx) = mpsc::unbounded_channel();
    let watched = path.to_path_buf();
    let mut last_seen = std::fs::read_to_string(&watched).ok();

    let mut watcher = RecommendedWatcher::new(
        move |result: notify::Result<Event>| {
            let event = match result {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!(error = %e, "Config watch error");
                    return;
                }
            };
            if !event.kind.is_modify() && !event.kind.is_create() {
                return;
            }

            // Editors fire several events per save; skip no-op rewrites.
            let content = std::fs::read_to_string(&watched).ok();
            if content == last_seen {
                return;
            }
            last_seen = content;

            match load_config(&watched) {
                Ok(config) => {
                    tracing::info!(path = %watched.display(), "Configuration reloaded");
                    let _ = tx.send(config);
                }
                Err(e) => {
                    tracing::error!(
                        path = %watched.display(),
                        error = %e,
                        "Reload failed, keeping current configuration"
                    );
                }
            }
        },
        Config::default().with_poll_interval(POLL_INTERVAL),
    )?;

    watcher.watch(path, RecursiveMode::NonRecursive)?;
    tracing::info!(path = %path.display(), "Watching configuration file");
    Ok((watcher, rx))
}
