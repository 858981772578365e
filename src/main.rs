mod config;
mod dispatch;
mod error;
mod focus;
mod resolver;
mod watcher;

use anyhow::Result;
use dispatch::ReplayMover;
use focus::SystemFocusQuery;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use watcher::ReplayWatcher;

#[tokio::main]
async fn main() -> Result<()> {
    simple_logger::init_with_level(log::Level::Info).unwrap();
    let cfg = config::load_user_config()?;
    let mover = Arc::new(ReplayMover::new(
        cfg.replay.clone(),
        SystemFocusQuery::new(),
    ));

    setup_replay_watcher(&cfg.watcher, mover.clone())?;
    setup_settings_reload(mover.clone());

    log::info!("ReplayXtender started. Press Ctrl+C to exit.");
    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down...");
    Ok(())
}

fn setup_replay_watcher(
    cfg: &config::Watcher,
    mover: Arc<ReplayMover<SystemFocusQuery>>,
) -> Result<()> {
    let watcher = ReplayWatcher::new(
        PathBuf::from(&cfg.watch_path),
        Duration::from_millis(cfg.poll_interval_ms),
    )?;
    log::info!("Watching {:?} for saved replays", cfg.watch_path);

    let (tx, mut rx) = mpsc::channel(8);
    tokio::spawn(watcher.run(tx));
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            mover.on_event(event);
        }
    });
    Ok(())
}

/// Stands in for the host's settings-update callback: when the config file
/// changes on disk, the new replay settings are pushed into the mover.
fn setup_settings_reload(mover: Arc<ReplayMover<SystemFocusQuery>>) {
    tokio::spawn(async move {
        let Ok(path) = config::config_file_path() else {
            return;
        };
        let mut last_modified = modified_at(&path);
        let mut interval = tokio::time::interval(Duration::from_secs(2));
        loop {
            interval.tick().await;
            let modified = modified_at(&path);
            if modified != last_modified {
                last_modified = modified;
                match config::load_user_config() {
                    Ok(cfg) => {
                        log::info!("Settings changed, applying new configuration");
                        mover.update_settings(cfg.replay);
                    }
                    Err(e) => log::warn!("Failed to reload config: {e}"),
                }
            }
        }
    });
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
