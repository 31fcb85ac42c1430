use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, warn};

use crate::catalog::{Catalog, DeleteError, FolderGroup};
use crate::classifier::{Alignment, RecordOutline, Thread};
use crate::handles::{DirectoryHandle, LocalDirectory, LocalFile};
use crate::models::{ConversationRecord, TRANSCRIPT_EXTENSION};
use crate::scanner::{ScanStats, ScannerSession, has_access};
use crate::storage::{SummaryCache, load_last_root, save_last_root, summary_store_path};
use crate::tui::{self, RememberRoot};
use crate::utils::{
    default_root_dir, folder_label, format_date, format_file_size, format_path_with_tilde,
    strip_ansi_codes,
};

/// Log file used while the interactive browser owns the terminal
pub const LOG_FILE_NAME: &str = "convo-viewer.log";

/// Resolved command-line settings shared by all subcommands
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: Option<PathBuf>,
    pub cache_dir: PathBuf,
}

/// Where the root being used came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSource {
    Explicit,
    Remembered,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoot {
    pub path: PathBuf,
    pub source: RootSource,
}

/// Pick the root: explicit flag or env, then the remembered root if it is still
/// accessible, then `~/.claude/projects`
pub fn resolve_root(explicit: Option<&Path>, cache_dir: &Path) -> Result<ResolvedRoot> {
    if let Some(path) = explicit {
        return Ok(ResolvedRoot { path: path.to_path_buf(), source: RootSource::Explicit });
    }

    match load_last_root(cache_dir) {
        Ok(Some(path)) => match LocalDirectory::open(&path) {
            Ok(dir) if has_access(&dir) => {
                return Ok(ResolvedRoot { path, source: RootSource::Remembered });
            }
            _ => warn!(path = %path.display(), "remembered root is not accessible, using default"),
        },
        Ok(None) => {}
        Err(e) => warn!(error = %e, "failed to read remembered root"),
    }

    Ok(ResolvedRoot { path: default_root_dir()?, source: RootSource::Default })
}

/// Open the root directory and a session backed by its summary cache.
/// The root is set on the session but not scanned.
fn open_session(settings: &Settings) -> Result<(ResolvedRoot, ScannerSession)> {
    let resolved = resolve_root(settings.root.as_deref(), &settings.cache_dir)?;
    let root = LocalDirectory::open(&resolved.path)
        .with_context(|| format!("Failed to open root directory {}", resolved.path.display()))?;

    let cache = match summary_store_path(&settings.cache_dir, root.path()) {
        Ok(store_path) => SummaryCache::open(&store_path),
        Err(e) => {
            warn!(error = %e, "cannot locate summary cache, continuing without persistence");
            SummaryCache::in_memory()
        }
    };

    let mut session = ScannerSession::new(Arc::new(cache));
    let root: Arc<dyn DirectoryHandle> = Arc::new(root);
    session.set_root(root)?;
    Ok((resolved, session))
}

fn remember_root(cache_dir: &Path, root: &Path) {
    match save_last_root(cache_dir, root) {
        Ok(()) => info!(root = %root.display(), "remembered root"),
        Err(e) => warn!(error = %e, "failed to remember root"),
    }
}

/// Open the session, scan once and remember the root on success
fn scan_session(settings: &Settings) -> Result<(ResolvedRoot, ScannerSession, ScanStats)> {
    let (resolved, mut session) = open_session(settings)?;
    let stats = session
        .scan()
        .with_context(|| format!("Failed to scan {}", format_path_with_tilde(&resolved.path)))?;
    remember_root(&settings.cache_dir, &resolved.path);
    Ok((resolved, session, stats))
}

pub fn browse(settings: &Settings) -> Result<()> {
    let (resolved, session) = open_session(settings)?;
    let remember = RememberRoot { cache_dir: settings.cache_dir.clone(), root: resolved.path };
    tui::run_browser(session, Some(remember))
}

pub fn scan(settings: &Settings, query: Option<&str>, json: bool) -> Result<()> {
    let (resolved, session, stats) = scan_session(settings)?;
    let query = query.unwrap_or("");

    if json {
        let files = session.catalog().filter(query);
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    let groups = session.catalog().grouped(query);
    if groups.is_empty() {
        println!("No transcripts found under {}", format_path_with_tilde(&resolved.path));
        return Ok(());
    }

    print!("{}", render_groups(&groups));
    let shown: usize = groups.iter().map(|g| g.files.len()).sum();
    println!();
    println!(
        "{} transcripts in {} folders ({} cached, {} read, {} too small)",
        shown,
        groups.len(),
        stats.cache_hits,
        stats.cache_misses,
        stats.skipped_small
    );
    Ok(())
}

/// Folder headers followed by one line per transcript
pub fn render_groups(groups: &[FolderGroup<'_>]) -> String {
    let mut out = String::new();
    for group in groups {
        out.push_str(&format!("{} ({})\n", strip_ansi_codes(&folder_label(group.folder)), group.files.len()));
        for file in &group.files {
            out.push_str(&format!(
                "  {:<20} {:>8}  {}  [{}]\n",
                format_date(file.last_modified_ms),
                format_file_size(file.size_bytes),
                strip_ansi_codes(file.label()),
                strip_ansi_codes(&file.path),
            ));
        }
    }
    out
}

pub fn view(file: &Path, include_sidechains: bool, json: bool) -> Result<()> {
    let handle =
        LocalFile::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let thread =
        Thread::load(&handle).with_context(|| format!("Failed to read {}", file.display()))?;

    if json {
        let records: Vec<&ConversationRecord> = if include_sidechains {
            thread.records().iter().collect()
        } else {
            thread.primary_records().collect()
        };
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("{}: {} messages", strip_ansi_codes(&handle_name(file)), thread.message_count());
    if thread.error_count() > 0 {
        println!("{} lines could not be parsed", thread.error_count());
    }
    println!();
    print!("{}", render_outlines(&thread.outlines(include_sidechains)));
    Ok(())
}

fn handle_name(file: &Path) -> String {
    file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Plain-text thread: start-aligned records flush left, end-aligned ones indented
pub fn render_outlines(outlines: &[RecordOutline]) -> String {
    let mut out = String::new();
    for outline in outlines {
        let indent = match outline.alignment {
            Alignment::Start => "",
            Alignment::End => "        ",
        };
        let marker = if outline.is_error { "!" } else { "#" };
        out.push_str(&format!("{}{} {}\n", indent, marker, strip_ansi_codes(&outline.label)));
        for line in &outline.lines {
            out.push_str(&format!("{}  {}\n", indent, strip_ansi_codes(line)));
        }
        out.push('\n');
    }
    out
}

pub fn delete(settings: &Settings, path: &str, confirmed: bool) -> Result<()> {
    if !path.ends_with(TRANSCRIPT_EXTENSION) {
        return Err(DeleteError::NotTranscript(path.to_string()).into());
    }
    if !confirmed {
        bail!("Refusing to delete {} without --yes", path);
    }

    let (_, mut session, _) = scan_session(settings)?;
    let descriptor = find_descriptor(session.catalog(), path)?;
    session.delete(&descriptor).with_context(|| format!("Failed to delete {}", path))?;
    println!("Deleted {}", path);
    Ok(())
}

fn find_descriptor(catalog: &Catalog, path: &str) -> Result<crate::models::FileDescriptor> {
    let normalized = path.trim_start_matches("./");
    catalog
        .get(normalized)
        .cloned()
        .ok_or_else(|| anyhow!("No transcript at {} in the catalog", path))
}

pub fn clear_cache(settings: &Settings) -> Result<()> {
    let (resolved, session) = open_session(settings)?;
    session.cache().clear();
    println!("Cleared summary cache for {}", format_path_with_tilde(&resolved.path));
    Ok(())
}
