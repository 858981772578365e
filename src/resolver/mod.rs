use crate::config::Replay;
use crate::error::XtenderError;
use crate::focus::FocusSnapshot;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

mod sanitize;
pub use sanitize::sanitize_label;

/// Bucket for captures whose program could not be identified.
pub const FALLBACK_BUCKET: &str = "Windowsapps";
/// Bucket for captures taken while the focused window was not fullscreen.
pub const DESKTOP_BUCKET: &str = "Desktop";
/// Literal the recorder puts into replay file names; replaced by the label
/// when name rewriting is enabled.
const REPLAY_TOKEN: &str = "Replay";

/// Where a saved replay should go. Computed purely from the original path,
/// the focus snapshot and the settings, so the decision is testable without
/// touching the filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing identifies the capture and no fallback applies; the file
    /// stays where it is.
    Unchanged,
    /// Nothing identifies the capture but a base override is configured;
    /// the file moves into it without a sub-bucket.
    Flat { dir: PathBuf },
    /// The normal case: a per-application bucket, with the file name
    /// possibly rewritten.
    Bucketed { dir: PathBuf, file_name: String },
}

pub fn resolve(original: &Path, snapshot: &FocusSnapshot, cfg: &Replay) -> Resolution {
    let original_dir = original.parent().map(Path::to_path_buf).unwrap_or_default();
    let file_name = original
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let base_override =
        (!cfg.base_save_path.is_empty()).then(|| PathBuf::from(&cfg.base_save_path));

    // Version metadata first, window title second.
    let mut label = sanitize_label(&snapshot.product_description);
    if label.is_empty() {
        label = sanitize_label(&snapshot.window_title);
    }
    if label.is_empty() {
        if cfg.use_windowsapps {
            label = FALLBACK_BUCKET.to_string();
        } else if let Some(dir) = base_override {
            return Resolution::Flat { dir };
        } else {
            return Resolution::Unchanged;
        }
    }

    // Windowed captures are desktop footage no matter what program they
    // came from, fallback bucket included.
    if cfg.fullscreen_game_detection && !snapshot.fullscreen {
        label = DESKTOP_BUCKET.to_string();
    }

    let file_name = if cfg.prepend_window_name {
        file_name.replace(REPLAY_TOKEN, &label)
    } else {
        file_name
    };

    let base_dir = base_override.unwrap_or(original_dir);
    Resolution::Bucketed {
        dir: base_dir.join(&label),
        file_name,
    }
}

/// Performs the side effects of a resolution: bucket creation and the move
/// itself. Returns the final path, or `None` when the resolution was a no-op.
pub fn apply(resolution: &Resolution, original: &Path) -> Result<Option<PathBuf>, XtenderError> {
    match resolution {
        Resolution::Unchanged => Ok(None),
        Resolution::Flat { dir } => {
            let dest = dir.join(original.file_name().unwrap_or_default());
            rename(original, &dest)?;
            Ok(Some(dest))
        }
        Resolution::Bucketed { dir, file_name } => {
            create_bucket(dir)?;
            let dest = dir.join(file_name);
            rename(original, &dest)?;
            Ok(Some(dest))
        }
    }
}

fn create_bucket(dir: &Path) -> Result<(), XtenderError> {
    // Non-recursive on purpose: a missing parent means the base directory
    // itself is wrong, which is worth surfacing.
    match fs::create_dir(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(source) => Err(XtenderError::CreateDir {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

fn rename(from: &Path, to: &Path) -> Result<(), XtenderError> {
    fs::rename(from, to).map_err(|source| XtenderError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}
