use crate::dispatch::HostEvent;
use anyhow::{Result, bail};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::Sender;

const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mkv", "flv", "mov", "ts"];

/// Synthesizes replay-saved events by polling the recorder's output
/// directory. A new video file counts as saved once its size has stopped
/// changing between two scans, so half-written files are not picked up.
pub struct ReplayWatcher {
    dir: PathBuf,
    poll_interval: Duration,
    known: HashSet<PathBuf>,
    pending: HashMap<PathBuf, u64>,
}

impl ReplayWatcher {
    pub fn new(dir: PathBuf, poll_interval: Duration) -> Result<Self> {
        if !dir.is_dir() {
            bail!("watch path is not a directory: {dir:?}");
        }
        // Files already on disk predate this run and are never touched.
        let known = list_videos(&dir).into_iter().collect();
        Ok(Self {
            dir,
            poll_interval,
            known,
            pending: HashMap::new(),
        })
    }

    pub async fn run(mut self, tx: Sender<HostEvent>) {
        let mut interval = tokio::time::interval(self.poll_interval);
        loop {
            interval.tick().await;
            for path in self.scan() {
                debug!("Replay save detected: {path:?}");
                if tx.send(HostEvent::ReplayBufferSaved(path)).await.is_err() {
                    return;
                }
            }
        }
    }

    /// One poll pass; returns the files whose size held steady since the
    /// previous pass.
    fn scan(&mut self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to scan {:?}: {e}", self.dir);
                return Vec::new();
            }
        };

        let mut ready = Vec::new();
        let mut seen = HashSet::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_video(&path) {
                continue;
            }
            seen.insert(path.clone());
            if self.known.contains(&path) {
                continue;
            }
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            match self.pending.get(&path) {
                Some(&previous) if previous == size => {
                    self.pending.remove(&path);
                    self.known.insert(path.clone());
                    ready.push(path);
                }
                _ => {
                    self.pending.insert(path, size);
                }
            }
        }

        // Moved or deleted files may reappear under the same name later.
        self.known.retain(|p| seen.contains(p));
        self.pending.retain(|p, _| seen.contains(p));
        ready
    }
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|v| ext.eq_ignore_ascii_case(v))
        })
}

fn list_videos(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| is_video(p))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watcher(dir: &Path) -> ReplayWatcher {
        ReplayWatcher::new(dir.to_path_buf(), Duration::from_millis(10)).unwrap()
    }

    #[test]
    fn rejects_a_missing_watch_directory() {
        assert!(ReplayWatcher::new(PathBuf::from("/no/such/dir"), Duration::from_secs(1)).is_err());
    }

    #[test]
    fn ignores_files_present_at_startup() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("old.mp4"), b"video").unwrap();

        let mut w = watcher(tmp.path());
        assert!(w.scan().is_empty());
        assert!(w.scan().is_empty());
    }

    #[test]
    fn reports_a_new_file_once_its_size_is_stable() {
        let tmp = tempfile::tempdir().unwrap();
        let mut w = watcher(tmp.path());

        let clip = tmp.path().join("Replay.mp4");
        std::fs::write(&clip, b"vi").unwrap();
        // First sighting only records the size.
        assert!(w.scan().is_empty());
        assert_eq!(w.scan(), vec![clip.clone()]);
        // Not reported again.
        assert!(w.scan().is_empty());
    }

    #[test]
    fn waits_while_the_file_is_still_growing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut w = watcher(tmp.path());

        let clip = tmp.path().join("Replay.mp4");
        std::fs::write(&clip, b"vi").unwrap();
        assert!(w.scan().is_empty());
        std::fs::write(&clip, b"video").unwrap();
        assert!(w.scan().is_empty());
        assert_eq!(w.scan(), vec![clip]);
    }

    #[test]
    fn skips_non_video_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut w = watcher(tmp.path());

        std::fs::write(tmp.path().join("metadata.json"), b"{}").unwrap();
        assert!(w.scan().is_empty());
        assert!(w.scan().is_empty());
    }

    #[test]
    fn a_moved_file_can_reappear_under_the_same_name() {
        let tmp = tempfile::tempdir().unwrap();
        let mut w = watcher(tmp.path());

        let clip = tmp.path().join("Replay.mp4");
        std::fs::write(&clip, b"video").unwrap();
        w.scan();
        assert_eq!(w.scan(), vec![clip.clone()]);

        // The mover relocates the file; a later save may reuse the name.
        std::fs::remove_file(&clip).unwrap();
        assert!(w.scan().is_empty());
        std::fs::write(&clip, b"other").unwrap();
        w.scan();
        assert_eq!(w.scan(), vec![clip]);
    }
}
