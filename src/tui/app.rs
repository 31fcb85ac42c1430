//! Browser state and event handling.
//!
//! The `App` owns a [`ScannerSession`] and runs the event loop via `run()`:
//!
//! - **Background scan**: scans run on a worker thread and are applied when the
//!   result arrives; the session's in-flight flag rejects overlapping refreshes
//! - **Live search**: every keystroke re-filters the catalog by substring
//! - **Conversation pane**: Enter loads the selected transcript into a [`Thread`]
//! - **Delete confirmation**: Ctrl+D asks, `y` confirms, anything else cancels
//! - **Dirty state tracking**: redraw only when state changes (or every 100ms)

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{info, warn};

use super::events::{Action, poll_event};
use super::rendering::{RenderState, render_ui};
use crate::classifier::{RecordOutline, Thread};
use crate::models::FileDescriptor;
use crate::scanner::{CompletedScan, ScanError, ScannerSession};
use crate::storage::save_last_root;

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;
const MAX_QUERY_CHARS: usize = 256;
const PAGE_SIZE: isize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Conversation,
}

/// Root to persist once the first scan succeeds
#[derive(Debug, Clone)]
pub struct RememberRoot {
    pub cache_dir: PathBuf,
    pub root: PathBuf,
}

impl RememberRoot {
    fn save(&self) {
        match save_last_root(&self.cache_dir, &self.root) {
            Ok(()) => info!(root = %self.root.display(), "remembered root"),
            Err(e) => warn!(error = %e, "failed to remember root"),
        }
    }
}

/// Transcript shown in the conversation pane
#[derive(Debug)]
pub struct OpenTranscript {
    pub path: String,
    pub title: String,
    pub thread: Thread,
    pub outlines: Vec<RecordOutline>,
    pub scroll: u16,
}

impl OpenTranscript {
    /// Rendered rows before wrapping: label, lines and a blank separator per record
    fn row_count(&self) -> usize {
        self.outlines.iter().map(|o| o.lines.len() + 2).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanKind {
    Initial,
    Refresh,
}

struct PendingScan {
    kind: ScanKind,
    receiver: Receiver<CompletedScan>,
}

pub struct App {
    session: ScannerSession,
    remember: Option<RememberRoot>,
    query: String,
    selected_idx: usize,
    focus: Focus,
    show_sidechains: bool,
    open: Option<OpenTranscript>,
    pending_delete: Option<FileDescriptor>,
    pending_scan: Option<PendingScan>,
    status_message: Option<StatusMessage>,
    should_quit: bool,
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl App {
    pub fn new(session: ScannerSession, remember: Option<RememberRoot>) -> Self {
        Self {
            session,
            remember,
            query: String::new(),
            selected_idx: 0,
            focus: Focus::List,
            show_sidechains: false,
            open: None,
            pending_delete: None,
            pending_scan: None,
            status_message: None,
            should_quit: false,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        }
    }

    /// Set a transient status message with automatic expiry
    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType) {
        let duration_ms = match message_type {
            MessageType::Success => STATUS_SUCCESS_DURATION_MS,
            MessageType::Error => STATUS_ERROR_DURATION_MS,
        };
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    fn check_and_clear_expired_status(&mut self) {
        let expired = self.status_message.as_ref().is_some_and(|msg| Instant::now() >= msg.expires_at);
        if expired {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.start_scan(ScanKind::Initial);

        while !self.should_quit {
            self.check_and_clear_expired_status();
            self.poll_scan();

            // Draw if dirty or if it's been >100ms (terminal resize, scan indicator)
            let now = Instant::now();
            if self.needs_redraw || now.duration_since(self.last_draw_time) >= Duration::from_millis(100) {
                let files = self.session.catalog().filter(&self.query);
                terminal.draw(|f| {
                    let state = RenderState {
                        query: &self.query,
                        files: &files,
                        total_count: self.session.catalog().len(),
                        selected_idx: self.selected_idx,
                        focus: self.focus,
                        open: self.open.as_ref(),
                        pending_delete: self.pending_delete.as_ref(),
                        scanning: self.session.is_scanning(),
                        last_error: self.session.last_error(),
                        show_sidechains: self.show_sidechains,
                        status_message: self.status_message.as_ref(),
                    };
                    render_ui(f, &state);
                })?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(Duration::from_millis(100))?;
            self.handle_action(action);
        }

        Ok(())
    }

    fn visible_files(&self) -> Vec<&FileDescriptor> {
        self.session.catalog().filter(&self.query)
    }

    fn selected_file(&self) -> Option<&FileDescriptor> {
        self.visible_files().get(self.selected_idx).copied()
    }

    fn handle_action(&mut self, action: Action) {
        if self.pending_delete.is_some() {
            match action {
                Action::UpdateSearch('y') | Action::UpdateSearch('Y') => self.confirm_delete(),
                Action::Quit => self.should_quit = true,
                Action::None => {}
                _ => {
                    self.pending_delete = None;
                    self.set_status("Delete cancelled", MessageType::Success);
                }
            }
            return;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::Back => self.back(),
            Action::MoveUp => self.move_by(-1),
            Action::MoveDown => self.move_by(1),
            Action::PageUp => self.move_by(-PAGE_SIZE),
            Action::PageDown => self.move_by(PAGE_SIZE),
            Action::Open => self.open_selected(),
            Action::ToggleFocus => self.toggle_focus(),
            Action::ToggleSidechains => self.toggle_sidechains(),
            Action::Refresh => self.start_scan(ScanKind::Refresh),
            Action::RequestDelete => self.request_delete(),
            Action::UpdateSearch(c) => self.update_search(c),
            Action::DeleteChar => self.delete_char(),
            Action::None => {}
        }
    }

    fn back(&mut self) {
        if self.focus == Focus::Conversation || self.open.is_some() {
            self.open = None;
            self.focus = Focus::List;
        } else if !self.query.is_empty() {
            self.query.clear();
            self.selected_idx = 0;
        } else {
            self.should_quit = true;
        }
        self.needs_redraw = true;
    }

    fn move_by(&mut self, delta: isize) {
        match self.focus {
            Focus::List => self.move_selection(delta),
            Focus::Conversation => self.scroll_conversation(delta),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let total = self.visible_files().len();
        if total == 0 {
            self.selected_idx = 0;
            return;
        }

        let old_idx = self.selected_idx;
        let new_idx = (self.selected_idx as isize + delta).max(0) as usize;
        self.selected_idx = new_idx.min(total - 1);

        if old_idx != self.selected_idx {
            self.needs_redraw = true;
        }
    }

    fn scroll_conversation(&mut self, delta: isize) {
        let Some(open) = self.open.as_mut() else { return };
        let max = open.row_count().saturating_sub(1) as isize;
        let next = (open.scroll as isize + delta).clamp(0, max.min(u16::MAX as isize));
        open.scroll = next as u16;
        self.needs_redraw = true;
    }

    fn update_search(&mut self, c: char) {
        if self.query.chars().count() < MAX_QUERY_CHARS {
            self.query.push(c);
            self.focus = Focus::List;
            self.selected_idx = 0;
            self.needs_redraw = true;
        }
    }

    fn delete_char(&mut self) {
        if self.query.pop().is_some() {
            self.selected_idx = 0;
            self.needs_redraw = true;
        }
    }

    fn open_selected(&mut self) {
        let Some(file) = self.selected_file().cloned() else {
            self.set_status("✗ No transcript selected", MessageType::Error);
            return;
        };

        match Thread::load(file.file.as_ref()) {
            Ok(thread) => {
                let outlines = thread.outlines(self.show_sidechains);
                self.open = Some(OpenTranscript {
                    title: file.label().to_string(),
                    path: file.path,
                    thread,
                    outlines,
                    scroll: 0,
                });
                self.focus = Focus::Conversation;
                self.needs_redraw = true;
            }
            Err(e) => {
                warn!(path = %file.path, error = %e, "failed to load transcript");
                self.set_status(format!("✗ Failed to load {}: {}", file.name, e), MessageType::Error);
            }
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match (self.focus, &self.open) {
            (Focus::List, Some(_)) => Focus::Conversation,
            _ => Focus::List,
        };
        self.needs_redraw = true;
    }

    fn toggle_sidechains(&mut self) {
        self.show_sidechains = !self.show_sidechains;
        if let Some(open) = self.open.as_mut() {
            open.outlines = open.thread.outlines(self.show_sidechains);
            open.scroll = 0;
        }
        let text = if self.show_sidechains { "Showing side-chain records" } else { "Hiding side-chain records" };
        self.set_status(text, MessageType::Success);
    }

    fn request_delete(&mut self) {
        match self.selected_file().cloned() {
            Some(file) => {
                self.pending_delete = Some(file);
                self.needs_redraw = true;
            }
            None => self.set_status("✗ No transcript selected", MessageType::Error),
        }
    }

    fn confirm_delete(&mut self) {
        let Some(file) = self.pending_delete.take() else { return };

        match self.session.delete(&file) {
            Ok(()) => {
                if self.open.as_ref().is_some_and(|open| open.path == file.path) {
                    self.open = None;
                    self.focus = Focus::List;
                }
                self.clamp_selection();
                self.set_status(format!("✓ Deleted {}", file.name), MessageType::Success);
            }
            Err(e) => self.set_status(format!("✗ {}", e), MessageType::Error),
        }
    }

    fn clamp_selection(&mut self) {
        let total = self.visible_files().len();
        self.selected_idx = self.selected_idx.min(total.saturating_sub(1));
    }

    fn start_scan(&mut self, kind: ScanKind) {
        let job = match kind {
            ScanKind::Initial => self.session.begin_scan(),
            ScanKind::Refresh => self.session.begin_refresh(),
        };

        match job {
            Ok(job) => {
                let (tx, rx) = mpsc::channel();
                thread::spawn(move || {
                    // Receiver gone means the app quit; the guard still clears the flag
                    let _ = tx.send(job.run());
                });
                self.pending_scan = Some(PendingScan { kind, receiver: rx });
                self.needs_redraw = true;
            }
            Err(ScanError::ScanInProgress) => {
                self.set_status("✗ A scan is already running", MessageType::Error)
            }
            Err(e) => self.set_status(format!("✗ {}", e), MessageType::Error),
        }
    }

    fn poll_scan(&mut self) {
        let Some(pending) = &self.pending_scan else { return };
        let kind = pending.kind;
        match pending.receiver.try_recv() {
            Ok(completed) => {
                self.pending_scan = None;
                self.apply_scan(kind, completed);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.pending_scan = None;
                self.set_status("✗ Scan stopped unexpectedly", MessageType::Error);
            }
        }
    }

    fn apply_scan(&mut self, kind: ScanKind, completed: CompletedScan) {
        match self.session.finish_scan(completed) {
            Ok(stats) => {
                if kind == ScanKind::Initial
                    && let Some(remember) = self.remember.take()
                {
                    remember.save();
                }
                if let Some(open) = &self.open
                    && self.session.catalog().get(&open.path).is_none()
                {
                    self.open = None;
                    self.focus = Focus::List;
                }
                self.clamp_selection();
                self.set_status(
                    format!(
                        "✓ {} transcripts ({} cached, {} read)",
                        self.session.catalog().len(),
                        stats.cache_hits,
                        stats.cache_misses
                    ),
                    MessageType::Success,
                );
            }
            Err(e) => self.set_status(format!("✗ Scan failed: {}", e), MessageType::Error),
        }
    }

    /// Block until the running scan (if any) has been applied
    #[cfg(test)]
    fn wait_for_scan(&mut self) {
        if let Some(pending) = self.pending_scan.take()
            && let Ok(completed) = pending.receiver.recv()
        {
            self.apply_scan(pending.kind, completed);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::handles::MemoryDirectory;
    use crate::scanner::MIN_FILE_SIZE_BYTES;
    use crate::storage::{SummaryCache, load_last_root};

    fn transcript(prompt: &str) -> String {
        let user = serde_json::json!({
            "type": "user", "uuid": "u1", "timestamp": "2025-01-01T00:00:00Z",
            "message": {"role": "user", "content": prompt}
        });
        let side = serde_json::json!({
            "type": "assistant", "uuid": "a1", "timestamp": 0, "isSidechain": true,
            "message": {"role": "assistant", "content": "side work"}
        });
        format!("{}\n{}\n{}", user, side, " ".repeat(MIN_FILE_SIZE_BYTES as usize))
    }

    fn tree() -> MemoryDirectory {
        let root = MemoryDirectory::new("projects");
        let alpha = root.add_directory("-home-alpha");
        alpha.add_file("one.jsonl", transcript("Fix the parser"), 1);
        alpha.add_file("two.jsonl", transcript("Write docs"), 2);
        root.add_directory("-home-beta").add_file("three.jsonl", transcript("Tune the cache"), 1);
        root
    }

    fn scanned_app(root: &MemoryDirectory) -> App {
        let mut session = ScannerSession::new(Arc::new(SummaryCache::in_memory()));
        session.set_root(Arc::new(root.clone())).unwrap();
        let mut app = App::new(session, None);
        app.start_scan(ScanKind::Initial);
        app.wait_for_scan();
        app
    }

    #[test]
    fn test_new_initializes_state() {
        let app = App::new(ScannerSession::new(Arc::new(SummaryCache::in_memory())), None);
        assert_eq!(app.selected_idx, 0);
        assert_eq!(app.focus, Focus::List);
        assert!(app.query.is_empty());
        assert!(!app.should_quit);
        assert!(app.needs_redraw);
    }

    #[test]
    fn test_background_scan_populates_catalog() {
        let app = scanned_app(&tree());

        assert_eq!(app.session.catalog().len(), 3);
        assert!(!app.session.is_scanning());
        assert_eq!(app.visible_files()[0].path, "-home-alpha/one.jsonl");
        assert!(app.status_message.as_ref().unwrap().text.contains("3 transcripts"));
    }

    #[test]
    fn test_scan_without_root_reports_error() {
        let mut app = App::new(ScannerSession::new(Arc::new(SummaryCache::in_memory())), None);
        app.start_scan(ScanKind::Initial);

        assert!(app.pending_scan.is_none());
        assert_eq!(app.status_message.unwrap().message_type, MessageType::Error);
    }

    #[test]
    fn test_refresh_rejected_while_scanning() {
        let mut app = scanned_app(&tree());
        app.start_scan(ScanKind::Refresh);
        assert!(app.session.is_scanning());

        app.handle_action(Action::Refresh);
        assert_eq!(app.status_message.as_ref().unwrap().text, "✗ A scan is already running");

        app.wait_for_scan();
        assert!(!app.session.is_scanning());
    }

    #[test]
    fn test_initial_scan_remembers_root() {
        let cache_dir = TempDir::new().unwrap();
        let mut session = ScannerSession::new(Arc::new(SummaryCache::in_memory()));
        session.set_root(Arc::new(tree())).unwrap();
        let remember = RememberRoot { cache_dir: cache_dir.path().to_path_buf(), root: PathBuf::from("/data/projects") };
        let mut app = App::new(session, Some(remember));

        app.start_scan(ScanKind::Initial);
        app.wait_for_scan();

        assert_eq!(load_last_root(cache_dir.path()).unwrap(), Some(PathBuf::from("/data/projects")));
        assert!(app.remember.is_none());
    }

    #[test]
    fn test_search_filters_and_resets_selection() {
        let mut app = scanned_app(&tree());
        app.handle_action(Action::MoveDown);
        assert_eq!(app.selected_idx, 1);

        for c in "CACHE".chars() {
            app.handle_action(Action::UpdateSearch(c));
        }
        assert_eq!(app.selected_idx, 0);
        assert_eq!(app.visible_files().len(), 1);
        assert_eq!(app.selected_file().unwrap().name, "three.jsonl");

        app.handle_action(Action::Back);
        assert!(app.query.is_empty());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_move_selection_bounds() {
        let mut app = scanned_app(&tree());
        app.handle_action(Action::MoveUp);
        assert_eq!(app.selected_idx, 0);

        app.handle_action(Action::PageDown);
        assert_eq!(app.selected_idx, 2);
    }

    #[test]
    fn test_open_and_toggle_sidechains() {
        let mut app = scanned_app(&tree());
        app.handle_action(Action::Open);

        let open = app.open.as_ref().unwrap();
        assert_eq!(open.title, "Fix the parser");
        assert_eq!(open.outlines.len(), 1);
        assert_eq!(app.focus, Focus::Conversation);

        app.handle_action(Action::ToggleSidechains);
        assert_eq!(app.open.as_ref().unwrap().outlines.len(), 2);

        app.handle_action(Action::Back);
        assert!(app.open.is_none());
        assert_eq!(app.focus, Focus::List);
    }

    #[test]
    fn test_conversation_scroll_is_clamped() {
        let mut app = scanned_app(&tree());
        app.handle_action(Action::Open);

        app.handle_action(Action::MoveUp);
        assert_eq!(app.open.as_ref().unwrap().scroll, 0);

        app.handle_action(Action::PageDown);
        let open = app.open.as_ref().unwrap();
        assert_eq!(open.scroll as usize, open.row_count() - 1);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let root = tree();
        let mut app = scanned_app(&root);

        app.handle_action(Action::RequestDelete);
        assert!(app.pending_delete.is_some());
        app.handle_action(Action::UpdateSearch('n'));
        assert!(app.pending_delete.is_none());
        assert_eq!(app.session.catalog().len(), 3);
        assert!(app.query.is_empty());

        app.handle_action(Action::RequestDelete);
        app.handle_action(Action::UpdateSearch('y'));
        assert_eq!(app.session.catalog().len(), 2);
        assert!(!root.add_directory("-home-alpha").contains("one.jsonl"));
    }

    #[test]
    fn test_delete_closes_open_transcript() {
        let mut app = scanned_app(&tree());
        app.handle_action(Action::Open);
        app.handle_action(Action::ToggleFocus);
        assert_eq!(app.focus, Focus::List);

        app.handle_action(Action::RequestDelete);
        app.handle_action(Action::UpdateSearch('Y'));
        assert!(app.open.is_none());
    }

    #[test]
    fn test_failed_delete_keeps_entry() {
        let root = tree();
        let mut app = scanned_app(&root);
        root.add_directory("-home-alpha").fail_removal(true);

        app.handle_action(Action::RequestDelete);
        app.handle_action(Action::UpdateSearch('y'));

        assert_eq!(app.session.catalog().len(), 3);
        assert_eq!(app.status_message.unwrap().message_type, MessageType::Error);
    }

    #[test]
    fn test_back_quits_from_empty_list() {
        let mut app = scanned_app(&tree());
        app.handle_action(Action::Back);
        assert!(app.should_quit);
    }

    #[test]
    fn test_expired_status_is_cleared() {
        let mut app = scanned_app(&tree());
        app.status_message = Some(StatusMessage {
            text: "old".to_string(),
            message_type: MessageType::Success,
            expires_at: Instant::now() - Duration::from_millis(1),
        });
        app.needs_redraw = false;

        app.check_and_clear_expired_status();
        assert!(app.status_message.is_none());
        assert!(app.needs_redraw);
    }
}
