//! Interactive transcript browser
mod app;
mod events;
mod layout;
mod rendering;
mod terminal;
mod timestamps;

use anyhow::Result;
pub use app::{App, RememberRoot};
use terminal::TerminalManager;

use crate::scanner::ScannerSession;

/// Run the browser on the current terminal until the user quits.
///
/// `session` must have a root set; the first scan starts in the background
/// as soon as the browser is up. `remember` is saved after that scan succeeds.
pub fn run_browser(session: ScannerSession, remember: Option<RememberRoot>) -> Result<()> {
    let mut manager = TerminalManager::enter()?;
    let mut app = App::new(session, remember);

    let res = app.run(manager.terminal_mut());
    manager.restore()?;

    res
}
