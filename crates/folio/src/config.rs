//! Command-line configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FOLIO_METADATA_DB` | none | Catalog `metadata.db` providing custom fields and virtual libraries |
//! | `FOLIO_LOG_LEVEL` | warn | Log level |
//! | `FOLIO_DOCS_PER_PAGE` | 24 | Page size of new query options |
//! | `FOLIO_BUSY_TIMEOUT_MS` | 5000 | SQLite busy timeout (milliseconds) |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Log levels accepted by `--log-level`.
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Command line of the `folio` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "folio")]
#[command(about = "Compile catalog search text and manage query options records")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings shared by all subcommands.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Catalog database to read field metadata and virtual libraries from.
    #[arg(long, env = "FOLIO_METADATA_DB", global = true)]
    pub metadata_db: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "FOLIO_LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Documents per page for new query options.
    #[arg(long, env = "FOLIO_DOCS_PER_PAGE", default_value = "24", global = true)]
    pub docs_per_page: i64,

    /// SQLite busy timeout in milliseconds.
    #[arg(long, env = "FOLIO_BUSY_TIMEOUT_MS", default_value = "5000", global = true)]
    pub busy_timeout_ms: u64,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Compile search text into a WHERE clause.
    Search {
        /// The search text, e.g. `title:"=Dune" AND tags:"~scifi"`.
        text: String,

        /// Print the parsed terms and the clause as JSON.
        #[arg(long)]
        explain: bool,
    },

    /// Work with serialized query options records.
    Options {
        #[command(subcommand)]
        action: OptionsCommand,
    },
}

/// Query options subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum OptionsCommand {
    /// Print the record of a new session.
    New,

    /// Decode a record and print it as JSON.
    Decode {
        /// The `|`-delimited record.
        record: String,
    },

    /// Merge form values into a record and print the new record.
    Update {
        /// The `|`-delimited record.
        record: String,

        /// Form value as `name=value` (guilang, layout, limitlength, matching,
        /// order, sortby, theme, virtlib). May be repeated.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
}

/// Parses a `name=value` pair.
fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metadata_db: None,
            log_level: "warn".to_string(),
            docs_per_page: 24,
            busy_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Log level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.log_level
            ));
        }

        if self.docs_per_page <= 0 {
            errors.push("Docs per page must be positive".to_string());
        }

        if self.busy_timeout_ms == 0 {
            errors.push("Busy timeout cannot be 0".to_string());
        }

        if let Some(path) = &self.metadata_db {
            if !path.is_file() {
                errors.push(format!("Metadata database not found: {}", path.display()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Self {
            metadata_db: None,
            log_level: "debug".to_string(),
            docs_per_page: 9,
            busy_timeout_ms: 100,
        }
    }
}
