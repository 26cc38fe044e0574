use colored::Colorize;
use env_logger::{Builder, Target};
use log::Level;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Route logs to `log_path` (append). Falls back to stderr when the file cannot be opened.
pub fn setup_logging(verbose: bool, log_path: &Path) {
    use log::LevelFilter;

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let (target, open_err) = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(file) => {
            // No ANSI escapes in the log file.
            colored::control::set_override(false);
            (Target::Pipe(Box::new(file)), None)
        }
        Err(e) => (Target::Stderr, Some(e)),
    };

    Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level) // Our crate: use requested level
        .target(target)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let ts = buf.timestamp_millis();
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = match record.level() {
                        Level::Warn => "WARN".yellow(),
                        Level::Error => "ERROR".red(),
                        _ => unreachable!(),
                    };
                    let path = record.target().to_string().white();
                    format!(
                        "{} [{} {} {}] {}",
                        ts,
                        name.cyan(),
                        level_str,
                        path,
                        record.args()
                    )
                }
                _ => format!("{} [{}] {}", ts, name.cyan(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .init();

    if let Some(e) = open_err {
        log::warn!(
            "Cannot log to file {} ({}), logging to stderr",
            log_path.display(),
            e
        );
    }
}
