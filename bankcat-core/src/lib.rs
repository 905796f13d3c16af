//! bankcat core - bank statement normalization and categorization
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Transaction, Amount, BankProfile)
//! - **ports**: Trait definitions for external dependencies (Categorizer)
//! - **services**: Ingestion, category merge, export, session workflow, logging
//! - **adapters**: Concrete implementations (HTTP categorization service)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::http::HttpCategorizer;
use config::Config;
use services::{ExportOptions, Session};

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{AccountFilter, Amount, BankProfile, ColumnMappings, ProfileRegistry, Transaction};
pub use ports::Categorizer;
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for bankcat operations
///
/// Holds the configuration and the profile registry, and builds sessions
/// and categorizers from them.
pub struct BankcatContext {
    pub config: Config,
    pub registry: Arc<ProfileRegistry>,
    dir: PathBuf,
}

impl BankcatContext {
    /// Load the context from a bankcat directory, creating it if needed
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create bankcat directory: {:?}", dir))?;
        let config = Config::load(dir)?;

        Ok(Self {
            config,
            registry: Arc::new(ProfileRegistry::builtin()),
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// New session, preselected with the configured defaults
    pub fn session(&self) -> Session {
        let mut session = Session::new(Arc::clone(&self.registry))
            .with_verification(self.config.verify_categorization);
        if let Some(bank) = &self.config.default_bank {
            session.select_bank(bank.as_str());
        }
        if let Some(file_type) = &self.config.default_file_type {
            session.select_file_type(file_type.as_str());
        }
        session
    }

    /// HTTP categorizer for the effective service URL
    pub fn categorizer(&self) -> domain::result::Result<HttpCategorizer> {
        HttpCategorizer::new(&self.config.effective_categorizer_url())
    }

    pub fn export_options(&self) -> ExportOptions {
        self.config.export
    }
}
