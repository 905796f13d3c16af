//! Config command - view and change settings.json

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::{get_bankcat_dir, get_context};
use crate::output;
use bankcat_core::config::{Config, SETTABLE_KEYS};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change one setting
    Set {
        /// Setting key (e.g. categorizerUrl, export.quoting)
        key: String,
        /// New value
        value: String,
    },
}

fn lowercase_json(value: impl serde::Serialize) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { json } => {
            let ctx = get_context()?;
            let config = &ctx.config;
            let url = config.effective_categorizer_url();

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "directory": ctx.dir().to_string_lossy(),
                        "categorizerUrl": url,
                        "defaultBank": config.default_bank,
                        "defaultFileType": config.default_file_type,
                        "verifyCategorization": config.verify_categorization,
                        "export": config.export,
                    }))?
                );
                return Ok(());
            }

            let unset = || "(not set)".dimmed().to_string();
            println!("{}", "bankcat settings".bold());
            println!("  Directory:             {}", ctx.dir().display());
            println!(
                "  categorizerUrl:        {}{}",
                url,
                if config.categorizer_url_from_env() {
                    " (from BANKCAT_API_URL)".dimmed().to_string()
                } else {
                    String::new()
                }
            );
            println!(
                "  defaultBank:           {}",
                config.default_bank.clone().unwrap_or_else(unset)
            );
            println!(
                "  defaultFileType:       {}",
                config.default_file_type.clone().unwrap_or_else(unset)
            );
            println!("  verifyCategorization:  {}", config.verify_categorization);
            println!(
                "  export.uncategorized:  {}",
                lowercase_json(config.export.uncategorized)
            );
            println!("  export.quoting:        {}", lowercase_json(config.export.quoting));
        }
        ConfigCommands::Set { key, value } => {
            let dir = get_bankcat_dir()?;
            std::fs::create_dir_all(&dir)?;
            let mut config = Config::load(&dir)?;

            if let Err(e) = config.set(&key, &value) {
                output::info(&format!("Settable keys: {}", SETTABLE_KEYS.join(", ")));
                return Err(e);
            }
            config.save(&dir)?;
            output::success(&format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}
