use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(rename = "replay")]
    pub replay: Replay,

    #[serde(rename = "watcher")]
    pub watcher: Watcher,
}

/// Options controlling where a saved replay ends up.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Replay {
    /// Base directory for sorted replays. Empty means "use the directory the
    /// replay was written to".
    #[serde(rename = "baseSavePath")]
    pub base_save_path: String,

    /// Send captures from unidentifiable programs to a "Windowsapps" bucket.
    #[serde(rename = "useWindowsapps")]
    pub use_windowsapps: bool,

    /// Replace the "Replay" prefix in file names with the application name,
    /// like Shadowplay does.
    #[serde(rename = "prependWindowName")]
    pub prepend_window_name: bool,

    /// Captures taken while the focused window is not fullscreen go to a
    /// "Desktop" bucket instead of the application bucket.
    #[serde(rename = "fullscreenGameDetection")]
    pub fullscreen_game_detection: bool,
}

impl Default for Replay {
    fn default() -> Self {
        Self {
            base_save_path: String::new(),
            use_windowsapps: true,
            prepend_window_name: true,
            fullscreen_game_detection: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Watcher {
    /// Directory the replay buffer writes into.
    #[serde(rename = "watchPath")]
    pub watch_path: String,

    #[serde(rename = "pollIntervalMs")]
    pub poll_interval_ms: u64,
}

impl Default for Watcher {
    fn default() -> Self {
        Self {
            watch_path: dirs::video_dir()
                .map(|d| d.to_string_lossy().into_owned())
                .unwrap_or_default(),
            poll_interval_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_behavior() {
        let cfg = Replay::default();
        assert!(cfg.base_save_path.is_empty());
        assert!(cfg.use_windowsapps);
        assert!(cfg.prepend_window_name);
        assert!(cfg.fullscreen_game_detection);
    }

    #[test]
    fn parses_camel_case_keys() {
        let cfg: Config = toml::from_str(
            r#"
            [replay]
            baseSavePath = "D:/Replays"
            useWindowsapps = false
            prependWindowName = true
            fullscreenGameDetection = false

            [watcher]
            watchPath = "D:/Recordings"
            pollIntervalMs = 500
            "#,
        )
        .unwrap();
        assert_eq!(cfg.replay.base_save_path, "D:/Replays");
        assert!(!cfg.replay.use_windowsapps);
        assert!(!cfg.replay.fullscreen_game_detection);
        assert_eq!(cfg.watcher.poll_interval_ms, 500);
    }
}
