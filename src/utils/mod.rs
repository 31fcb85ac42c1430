pub mod environment;
pub mod format;
pub mod logging;
pub mod terminal;

pub use environment::{default_cache_dir, default_root_dir, resolve_cache_dir};
pub use format::{clean_folder_name, folder_label, format_date, format_file_size, format_path_with_tilde};
pub use logging::{LogSink, init_logging};
pub use terminal::{sanitize_line, strip_ansi_codes};
