use anyhow::Result;
use std::path::PathBuf;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use windows::SystemFocusQuery;

/// What was focused at the moment a replay finished saving. Queried fresh per
/// event, never cached.
///
/// Empty strings mean the information was simply unavailable (no version
/// resource, untitled window); that is not an error, it just pushes label
/// resolution further down the fallback chain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FocusSnapshot {
    pub window_title: String,
    pub executable_path: Option<PathBuf>,
    pub product_description: String,
    pub fullscreen: bool,
}

pub trait FocusQuery {
    fn snapshot(&self) -> Result<FocusSnapshot>;
}

/// Focus introspection is only wired up for Win32. Elsewhere every capture is
/// unidentified and falls through the label fallback chain.
#[cfg(not(target_os = "windows"))]
pub struct SystemFocusQuery;

#[cfg(not(target_os = "windows"))]
impl SystemFocusQuery {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(target_os = "windows"))]
impl FocusQuery for SystemFocusQuery {
    fn snapshot(&self) -> Result<FocusSnapshot> {
        Ok(FocusSnapshot::default())
    }
}
