//! Engine module: CLI handling, row parsing, payload codec and path helpers

pub mod arg_parser;
pub mod cli;
pub mod codec;
pub mod parse;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{handle_run, resolve_opts};
pub use codec::UserApps;
pub use parse::{parse_apps, parse_row};
pub use tools::{is_processed, mark_processed, pattern_root, processed_path_for};
