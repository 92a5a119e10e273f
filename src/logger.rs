use chrono::Local;
use env_logger::Builder;
use log::{LevelFilter, Record};
use std::io::Write;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// One line per WebDriver command otherwise.
const QUIET_TARGETS: [&str; 3] = ["reqwest", "hyper", "hyper_util"];

/// `2024-05-01 10:00:00 [INFO] batch - Processing 1 / 3`
fn format_line(timestamp: &str, record: &Record) -> String {
    let target = record.target();
    let module = target.strip_prefix("result_extractor_lib::").unwrap_or(target);
    format!("{} [{}] {} - {}", timestamp, record.level(), module, record.args())
}

/// `Info` for this crate, `Warn` for the HTTP stack; `RUST_LOG` overrides both.
pub fn builder() -> Builder {
    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
            writeln!(buf, "{}", format_line(&timestamp, record))
        })
        .filter_level(LevelFilter::Info);
    for target in QUIET_TARGETS {
        builder.filter_module(target, LevelFilter::Warn);
    }
    builder.parse_default_env();
    builder
}

/// Installs the global logger. Later calls leave the first logger in place.
pub fn init() {
    match builder().try_init() {
        Ok(()) => log::debug!("Logger initialized."),
        Err(e) => log::debug!("Logger already installed: {}", e),
    }
}
