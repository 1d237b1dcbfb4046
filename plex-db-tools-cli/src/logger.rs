//! Console and file logger.
//!
//! Info goes to stdout, warnings and errors to stderr. When a log file is
//! configured every record is mirrored there with a timestamp and level,
//! ANSI codes stripped.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

pub(crate) struct CliLogger {
    level: LevelFilter,
    timestamps: bool,
    file: Option<Mutex<File>>,
}

/// Map `-v` count and `--quiet` to a level. `LOG_LEVEL` applies when
/// neither flag is given.
pub(crate) fn level_from_flags(verbose: u8, quiet: bool, env_level: Option<&str>) -> LevelFilter {
    if quiet {
        return LevelFilter::Warn;
    }
    match verbose {
        0 => env_level
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(LevelFilter::Info),
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

impl CliLogger {
    pub(crate) fn new(level: LevelFilter, log_path: Option<&Path>) -> Self {
        let file = log_path.and_then(|path| match open_log_file(path) {
            Ok(f) => Some(Mutex::new(f)),
            Err(e) => {
                eprintln!("Could not open log file {}: {}", path.display(), e);
                None
            }
        });
        Self {
            level,
            timestamps: level >= LevelFilter::Debug,
            file,
        }
    }

    /// Install as the global logger.
    pub(crate) fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // Debug output from dependencies (reqwest, rustls) is noise
        metadata.level() <= self.level
            && (metadata.level() <= Level::Info || metadata.target().starts_with("plex_db_tools"))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = record.args().to_string();

        let prefix = if self.timestamps {
            format!("{} ", chrono::Local::now().format("%H:%M:%S%.3f"))
        } else {
            String::new()
        };

        match record.level() {
            Level::Error => eprintln!(
                "{}{} {}",
                prefix,
                "error:".if_supports_color(Stderr, |t| t.red()),
                message
            ),
            Level::Warn => eprintln!(
                "{}{} {}",
                prefix,
                "warning:".if_supports_color(Stderr, |t| t.yellow()),
                message
            ),
            Level::Info => println!("{prefix}{message}"),
            Level::Debug | Level::Trace => println!(
                "{}{}",
                prefix,
                message.if_supports_color(Stdout, |t| t.dimmed())
            ),
        }

        if let Some(file) = &self.file
            && let Ok(mut file) = file.lock()
        {
            let _ = writeln!(
                file,
                "{} [{:<5}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                strip_ansi_escapes::strip_str(&message)
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        if let Some(file) = &self.file
            && let Ok(mut file) = file.lock()
        {
            let _ = file.flush();
        }
    }
}
