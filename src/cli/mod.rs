//! Command-line surface
//!
//! Every subcommand resolves the same settings first: the cache directory
//! (flag, env, platform default) and, for commands that scan, the root.

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::utils::{LogSink, init_logging, resolve_cache_dir};
use commands::{LOG_FILE_NAME, Settings};

#[derive(Parser)]
#[command(name = "convo-viewer")]
#[command(version)]
#[command(about = "Browse conversation transcripts stored as JSONL files", long_about = None)]
pub struct Cli {
    /// Directory to scan for transcripts (default: last used root, then ~/.claude/projects)
    #[arg(long, global = true, env = "CONVO_VIEWER_ROOT")]
    pub root: Option<PathBuf>,

    /// Directory for the summary cache, remembered root and log file
    #[arg(long, global = true, env = "CONVO_VIEWER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse transcripts interactively (default)
    Browse,
    /// Scan the root and print transcripts grouped by folder
    Scan {
        /// Only show transcripts whose name, summary or folder contains this text (case-insensitive)
        #[arg(short, long)]
        query: Option<String>,
        /// Print file descriptors as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one transcript as a conversation thread
    View {
        /// Transcript file to read
        file: PathBuf,
        /// Include side-chain records
        #[arg(long)]
        all: bool,
        /// Print parsed records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete one transcript, given its path relative to the root
    Delete {
        path: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Manage the summary cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Remove every cached summary for the current root
    Clear,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings {
        root: cli.root,
        cache_dir: resolve_cache_dir(cli.cache_dir.as_deref())?,
    };

    let command = cli.command.unwrap_or(Commands::Browse);
    let sink = match command {
        Commands::Browse => LogSink::File(settings.cache_dir.join(LOG_FILE_NAME)),
        _ => LogSink::Stderr,
    };
    init_logging(cli.verbose, sink)?;

    match command {
        Commands::Browse => commands::browse(&settings),
        Commands::Scan { query, json } => commands::scan(&settings, query.as_deref(), json),
        Commands::View { file, all, json } => commands::view(&file, all, json),
        Commands::Delete { path, yes } => commands::delete(&settings, &path, yes),
        Commands::Cache { action: CacheAction::Clear } => commands::clear_cache(&settings),
    }
}
