//! Display formatting for sizes, dates, folders and paths

use std::borrow::Cow;
use std::path::Path;

use chrono::{DateTime, Local, TimeZone};

use crate::models::ROOT_FOLDER;

/// Human-readable size with decimal units: `"512 B"`, `"6 KB"`, `"1.2 MB"`
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1000 {
        return format!("{} B", bytes);
    }
    if bytes < 1_000_000 {
        return format!("{} KB", (bytes as f64 / 1000.0).round() as u64);
    }
    let tenths = (bytes as f64 / 100_000.0).round() / 10.0;
    format!("{:.1} MB", tenths)
}

/// Local time as `YYYY-MM-DD h:mm AM`
pub fn format_date(timestamp_ms: i64) -> String {
    format_date_in(timestamp_ms, &Local)
}

pub(crate) fn format_date_in<Tz: TimeZone>(timestamp_ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp_millis(timestamp_ms) {
        Some(utc) => utc.with_timezone(tz).format("%Y-%m-%d %-I:%M %p").to_string(),
        None => "-".to_string(),
    }
}

/// Encode a path the way project folders are named: every non-alphanumeric
/// character becomes `-`
fn encode_folder(path: &Path) -> String {
    path.to_string_lossy().chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '-' }).collect()
}

/// Strip the encoded home-directory prefix and leading dashes from a folder name.
///
/// `-Users-alice-dev-api` with home `/Users/alice` becomes `dev-api`. Folders
/// outside home only lose their leading dashes.
pub fn clean_folder_name(folder: &str, home: Option<&Path>) -> String {
    if folder == ROOT_FOLDER {
        return folder.to_string();
    }

    let mut rest = folder;
    if let Some(home) = home {
        let encoded = encode_folder(home);
        let bare = encoded.trim_start_matches('-');
        if let Some(stripped) = rest.strip_prefix(encoded.as_str()).or_else(|| rest.strip_prefix(bare))
            && (stripped.is_empty() || stripped.starts_with(['-', '/']))
        {
            rest = stripped;
            if rest.is_empty() {
                return "~".to_string();
            }
        }
    }

    let cleaned = rest.trim_start_matches('-');
    if cleaned.is_empty() { folder.to_string() } else { cleaned.to_string() }
}

/// Folder label for display, relative to the current user's home
pub fn folder_label(folder: &str) -> String {
    clean_folder_name(folder, dirs::home_dir().as_deref())
}

/// Replace the home directory prefix with `~`
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, dirs::home_dir().as_deref())
}

pub(crate) fn format_path_with_tilde_internal(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home
        && let Ok(rest) = path.strip_prefix(home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.to_string_lossy());
    }

    match path.to_string_lossy() {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
