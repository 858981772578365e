#![cfg(target_os = "windows")]

use super::{FocusQuery, FocusSnapshot};
use anyhow::{Context, Result, bail};
use log::debug;
use std::ffi::{OsString, c_void};
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};
use windows::Win32::Foundation::{CloseHandle, HWND, RECT};
use windows::Win32::Storage::FileSystem::{
    GetFileVersionInfoSizeW, GetFileVersionInfoW, VerQueryValueW,
};
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_NAME_FORMAT, PROCESS_QUERY_LIMITED_INFORMATION,
    QueryFullProcessImageNameW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetSystemMetrics, GetWindowRect, GetWindowTextLengthW, GetWindowTextW,
    GetWindowThreadProcessId, SM_CXSCREEN, SM_CYSCREEN,
};
use windows::core::{PCWSTR, PWSTR};

/// Win32-backed focus queries. All lookups run against the foreground window
/// at call time, so this must be invoked promptly after the save event.
pub struct SystemFocusQuery;

impl SystemFocusQuery {
    pub fn new() -> Self {
        Self
    }
}

impl FocusQuery for SystemFocusQuery {
    fn snapshot(&self) -> Result<FocusSnapshot> {
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.is_invalid() {
                bail!("no foreground window");
            }

            let window_title = window_title(hwnd);
            let executable_path = executable_path(hwnd)?;
            let product_description = executable_path
                .as_deref()
                .map(file_description)
                .unwrap_or_default();
            let fullscreen = is_fullscreen(hwnd)?;

            debug!("Foreground window: title={window_title:?}, exe={executable_path:?}");
            Ok(FocusSnapshot {
                window_title,
                executable_path,
                product_description,
                fullscreen,
            })
        }
    }
}

unsafe fn window_title(hwnd: HWND) -> String {
    let length = unsafe { GetWindowTextLengthW(hwnd) };
    if length <= 0 {
        return String::new();
    }
    let mut buffer: Vec<u16> = vec![0; (length + 1) as usize];
    let copied = unsafe { GetWindowTextW(hwnd, &mut buffer) };
    if copied <= 0 {
        return String::new();
    }
    buffer.truncate(copied as usize);
    OsString::from_wide(&buffer).to_string_lossy().into_owned()
}

/// Full image path of the process owning the window. Fails if the process has
/// already exited or denies the query.
unsafe fn executable_path(hwnd: HWND) -> Result<Option<PathBuf>> {
    let mut pid: u32 = 0;
    unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid)) };
    if pid == 0 {
        return Ok(None);
    }

    let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) }
        .with_context(|| format!("failed to open process {pid}"))?;

    let mut buffer = vec![0u16; 512];
    let mut size: u32 = buffer.len() as u32;
    let result = unsafe {
        QueryFullProcessImageNameW(
            handle,
            PROCESS_NAME_FORMAT(0),
            PWSTR(buffer.as_mut_ptr()),
            &mut size,
        )
    };
    let _ = unsafe { CloseHandle(handle) };
    result.with_context(|| format!("failed to query image name for process {pid}"))?;

    Ok(Some(PathBuf::from(OsString::from_wide(
        &buffer[..size as usize],
    ))))
}

unsafe fn is_fullscreen(hwnd: HWND) -> Result<bool> {
    let mut rect = RECT::default();
    unsafe { GetWindowRect(hwnd, &mut rect) }.context("failed to query window rect")?;

    let screen_width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
    let screen_height = unsafe { GetSystemMetrics(SM_CYSCREEN) };

    Ok(rect.right - rect.left == screen_width && rect.bottom - rect.top == screen_height)
}

/// FileDescription from the executable's version resource, or empty when the
/// resource is missing. A missing resource is normal for plenty of programs.
fn file_description(path: &Path) -> String {
    unsafe { read_file_description(path) }.unwrap_or_default()
}

unsafe fn read_file_description(path: &Path) -> Option<String> {
    let wide: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let size = unsafe { GetFileVersionInfoSizeW(PCWSTR(wide.as_ptr()), None) };
    if size == 0 {
        return None;
    }
    let mut block = vec![0u8; size as usize];
    unsafe { GetFileVersionInfoW(PCWSTR(wide.as_ptr()), None, size, block.as_mut_ptr().cast()) }
        .ok()?;

    // First language/codepage pair of the translation table.
    let translation = unsafe { query_value(&block, "\\VarFileInfo\\Translation")? };
    if translation.1 < 4 {
        return None;
    }
    let pair = unsafe { *(translation.0 as *const [u16; 2]) };

    let sub_block = format!(
        "\\StringFileInfo\\{:04X}{:04X}\\FileDescription",
        pair[0], pair[1]
    );
    let (value, chars) = unsafe { query_value(&block, &sub_block)? };
    if chars == 0 {
        return None;
    }
    let text = unsafe { std::slice::from_raw_parts(value as *const u16, chars as usize) };
    let text = String::from_utf16_lossy(text);
    let text = text.trim_end_matches('\0').to_string();
    (!text.is_empty()).then_some(text)
}

unsafe fn query_value(block: &[u8], sub_block: &str) -> Option<(*mut c_void, u32)> {
    let sub: Vec<u16> = sub_block.encode_utf16().chain(std::iter::once(0)).collect();
    let mut value: *mut c_void = std::ptr::null_mut();
    let mut len: u32 = 0;
    let ok = unsafe {
        VerQueryValueW(
            block.as_ptr().cast(),
            PCWSTR(sub.as_ptr()),
            &mut value,
            &mut len,
        )
    };
    if !ok.as_bool() || value.is_null() {
        return None;
    }
    Some((value, len))
}
