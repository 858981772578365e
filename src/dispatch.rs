use crate::config::Replay;
use crate::error::XtenderError;
use crate::focus::FocusQuery;
use crate::resolver;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Notifications forwarded from the recorder integration. Only the replay
/// buffer save matters here; the watcher synthesizes it from disk activity.
#[derive(Clone, Debug)]
pub enum HostEvent {
    ReplayBufferSaved(PathBuf),
}

/// The long-lived event handler. One instance is constructed at startup and
/// shared with the event loop and the settings-reload task; settings are
/// replaced in place when the config file changes.
pub struct ReplayMover<F> {
    settings: Mutex<Replay>,
    focus: F,
}

impl<F: FocusQuery> ReplayMover<F> {
    pub fn new(settings: Replay, focus: F) -> Self {
        Self {
            settings: Mutex::new(settings),
            focus,
        }
    }

    pub fn update_settings(&self, settings: Replay) {
        *self.settings.lock().unwrap() = settings;
    }

    /// Outermost event boundary: failures are logged and the event is
    /// dropped, never propagated. A bad event must not stop later ones from
    /// being handled.
    pub fn on_event(&self, event: HostEvent) {
        match event {
            HostEvent::ReplayBufferSaved(path) => match self.move_replay(&path) {
                Ok(Some(dest)) => info!("Replay moved to {dest:?}"),
                Ok(None) => debug!("Replay left at {path:?}: no label and no fallback"),
                Err(e) => warn!("Dropping replay event: {e}"),
            },
        }
    }

    fn move_replay(&self, path: &Path) -> Result<Option<PathBuf>, XtenderError> {
        let snapshot = self.focus.snapshot().map_err(XtenderError::FocusQuery)?;
        debug!("Focus snapshot: {snapshot:?}");
        let cfg = self.settings.lock().unwrap().clone();
        let resolution = resolver::resolve(path, &snapshot, &cfg);
        resolver::apply(&resolution, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::FocusSnapshot;
    use anyhow::anyhow;

    struct FixedFocus(FocusSnapshot);

    impl FocusQuery for FixedFocus {
        fn snapshot(&self) -> anyhow::Result<FocusSnapshot> {
            Ok(self.0.clone())
        }
    }

    struct BrokenFocus;

    impl FocusQuery for BrokenFocus {
        fn snapshot(&self) -> anyhow::Result<FocusSnapshot> {
            Err(anyhow!("window handle went stale"))
        }
    }

    fn game_snapshot() -> FocusSnapshot {
        FocusSnapshot {
            window_title: "My Game".to_string(),
            executable_path: None,
            product_description: "My Game".to_string(),
            fullscreen: true,
        }
    }

    #[test]
    fn moves_a_saved_replay_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        let original = tmp.path().join("Replay 2024-01-01.mp4");
        std::fs::write(&original, b"video").unwrap();

        let mover = ReplayMover::new(Replay::default(), FixedFocus(game_snapshot()));
        mover.on_event(HostEvent::ReplayBufferSaved(original.clone()));

        assert!(!original.exists());
        assert!(
            tmp.path()
                .join("My Game")
                .join("My Game 2024-01-01.mp4")
                .exists()
        );
    }

    #[test]
    fn focus_failure_is_categorized_and_leaves_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let original = tmp.path().join("Replay.mp4");
        std::fs::write(&original, b"video").unwrap();

        let mover = ReplayMover::new(Replay::default(), BrokenFocus);
        let err = mover.move_replay(&original).unwrap_err();
        assert!(matches!(err, XtenderError::FocusQuery(_)), "got {err}");
        assert!(original.exists());
    }

    #[test]
    fn on_event_swallows_failures() {
        let mover = ReplayMover::new(Replay::default(), BrokenFocus);
        // Must not panic even though the focus query always fails.
        mover.on_event(HostEvent::ReplayBufferSaved(PathBuf::from(
            "/nowhere/Replay.mp4",
        )));
    }

    #[test]
    fn settings_updates_take_effect_on_the_next_event() {
        let tmp = tempfile::tempdir().unwrap();
        let original = tmp.path().join("Replay.mp4");
        std::fs::write(&original, b"video").unwrap();

        let mover = ReplayMover::new(Replay::default(), FixedFocus(game_snapshot()));
        mover.update_settings(Replay {
            prepend_window_name: false,
            ..Replay::default()
        });
        mover.on_event(HostEvent::ReplayBufferSaved(original.clone()));

        assert!(tmp.path().join("My Game").join("Replay.mp4").exists());
    }
}
