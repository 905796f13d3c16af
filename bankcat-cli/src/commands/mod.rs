//! CLI command implementations

pub mod categorize;
pub mod config;
pub mod ingest;
pub mod logs;
pub mod profiles;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bankcat_core::services::Session;
use bankcat_core::{BankcatContext, EntryPoint, Error, LogEvent, LoggingService};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let dir = get_bankcat_dir().ok()?;
    std::fs::create_dir_all(&dir).ok()?;
    LoggingService::new(&dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Event tagged with the session's bank and file type
pub fn session_event(event: &str, command: &str, session: &Session) -> LogEvent {
    LogEvent::new(event).with_command(command).with_selection(
        session.bank().unwrap_or_default(),
        session.file_type().unwrap_or_default(),
    )
}

/// Get the bankcat directory from environment or default
pub fn get_bankcat_dir() -> Result<PathBuf> {
    bankcat_core::config::default_dir()
}

pub fn get_context() -> Result<BankcatContext> {
    let dir = get_bankcat_dir()?;
    BankcatContext::new(&dir).context("Failed to initialize bankcat context")
}

/// Session with the configured defaults, overridden by command-line flags
pub fn open_session(ctx: &BankcatContext, bank: Option<String>, file_type: Option<String>) -> Session {
    let mut session = ctx.session();
    if let Some(bank) = bank {
        session.select_bank(bank);
    }
    if let Some(file_type) = file_type {
        session.select_file_type(file_type);
    }
    session
}

/// Read a statement file and upload it into the session
pub fn upload_statement(ctx: &BankcatContext, session: &mut Session, path: &Path) -> Result<usize> {
    if session.bank().is_none() || session.file_type().is_none() {
        return Err(Error::NoSelection).with_context(|| {
            format!(
                "Pass --bank and --file-type or set defaultBank/defaultFileType (banks: {}; file types: {})",
                ctx.registry.banks().join(", "),
                ctx.registry.file_types().join(", ")
            )
        });
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file path: {}", path.display()))?;
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(session.upload(file_name, &bytes)?)
}

/// First 8 characters of an id, for tables
pub fn short_id(id: &uuid::Uuid) -> String {
    id.to_string().chars().take(8).collect()
}
