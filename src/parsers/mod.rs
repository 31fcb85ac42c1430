//! JSONL parsers for conversation transcripts
//!
//! # Error Handling Strategy
//!
//! Parsing never fails past a single line:
//!
//! - **Individual line failures**: a line that is not JSON, or is JSON that does not
//!   fit any record kind, becomes a `ParseError` record carrying the raw text. Syntax
//!   and schema failures are deliberately indistinguishable to callers.
//!
//! - **One record per line**: blank and whitespace-only lines are dropped before
//!   parsing; every other line yields exactly one record, in file order.
//!
//! - **User feedback**: the number of error lines is logged at `warn` so a damaged
//!   transcript is visible without breaking the view.
//!
//! Only reading the file itself can fail, and that surfaces as `io::Error`.

pub mod deserializers;
pub mod line;

pub use line::{load_transcript, parse_line, parse_transcript};
