//! Folio command-line front end
//!
//! Compiles catalog search text into a `WHERE` clause and works with
//! serialized query options records.

mod config;

use std::collections::BTreeMap;

use clap::Parser;
use serde_json::{Value, json};
use tracing::{debug, info};

use folio_catalog::error::MetadataResult;
use folio_catalog::metadata::{FieldMetadata, InMemoryMetadata, VirtualLibraries};
use folio_catalog::query::{FieldResolver, SearchRequest, scan_remainder, scan_structured};
use folio_catalog::types::{QueryOptions, QueryOptionsForm};

#[cfg(feature = "sqlite")]
use folio_catalog::metadata::{SqliteMetadata, SqliteMetadataConfig};

use config::{Cli, Command, Config, OptionsCommand};

/// Metadata source selected by the configuration.
enum CatalogMetadata {
    /// No catalog database: built-in fields only, no virtual libraries.
    Empty(InMemoryMetadata),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteMetadata),
}

impl FieldMetadata for CatalogMetadata {
    fn lookup_field_property(&self, field_key: &str, property: &str) -> MetadataResult<Value> {
        match self {
            CatalogMetadata::Empty(metadata) => {
                metadata.lookup_field_property(field_key, property)
            }
            #[cfg(feature = "sqlite")]
            CatalogMetadata::Sqlite(metadata) => {
                metadata.lookup_field_property(field_key, property)
            }
        }
    }
}

impl VirtualLibraries for CatalogMetadata {
    fn virtual_libraries(&self) -> MetadataResult<BTreeMap<String, String>> {
        match self {
            CatalogMetadata::Empty(metadata) => metadata.virtual_libraries(),
            #[cfg(feature = "sqlite")]
            CatalogMetadata::Sqlite(metadata) => metadata.virtual_libraries(),
        }
    }

    fn virtual_library_query(&self, name: &str) -> MetadataResult<Option<String>> {
        match self {
            CatalogMetadata::Empty(metadata) => metadata.virtual_library_query(name),
            #[cfg(feature = "sqlite")]
            CatalogMetadata::Sqlite(metadata) => metadata.virtual_library_query(name),
        }
    }
}

/// Opens the configured catalog database, if any.
#[cfg(feature = "sqlite")]
fn open_metadata(config: &Config) -> anyhow::Result<CatalogMetadata> {
    let Some(path) = &config.metadata_db else {
        return Ok(CatalogMetadata::Empty(InMemoryMetadata::new()));
    };

    info!(database = %path.display(), "Opening catalog metadata");
    let sqlite_config = SqliteMetadataConfig {
        busy_timeout_ms: config.busy_timeout_ms,
        read_only: true,
    };
    let metadata = SqliteMetadata::with_config(path, sqlite_config)?;
    Ok(CatalogMetadata::Sqlite(metadata))
}

/// Fallback when the sqlite feature is not enabled.
#[cfg(not(feature = "sqlite"))]
fn open_metadata(config: &Config) -> anyhow::Result<CatalogMetadata> {
    if config.metadata_db.is_some() {
        anyhow::bail!(
            "Reading a catalog database requires the 'sqlite' feature. \
             Build with: cargo build -p folio --features sqlite"
        );
    }
    Ok(CatalogMetadata::Empty(InMemoryMetadata::new()))
}

/// Initializes the tracing subscriber, honouring `RUST_LOG` when set.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("folio={level},folio_catalog={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn search(text: &str, explain: bool, metadata: &CatalogMetadata) -> anyhow::Result<()> {
    let resolver = FieldResolver::new(metadata);
    let request = SearchRequest::new(text);
    let clause = request.clause(&resolver);
    debug!(request = %request, "Compiled search");

    if explain {
        let input = text.trim();
        let scan = scan_structured(input);
        let remainder = if scan.is_empty() {
            None
        } else {
            scan_remainder(&input[scan.cursor..])
        };
        let report = json!({
            "raw": request.raw(),
            "terms": scan.expressions,
            "remainder": remainder,
            "clause": clause,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{clause}");
    }
    Ok(())
}

fn options(
    action: OptionsCommand,
    config: &Config,
    metadata: &CatalogMetadata,
) -> anyhow::Result<()> {
    match action {
        OptionsCommand::New => {
            println!("{}", QueryOptions::new(config.docs_per_page));
        }
        OptionsCommand::Decode { record } => {
            let options: QueryOptions = record.parse()?;
            let resolver = FieldResolver::new(metadata);
            let clause = options.where_clause(&resolver);
            let report = json!({
                "options": options,
                "clause": clause,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OptionsCommand::Update { record, fields } => {
            let mut options: QueryOptions = record.parse()?;
            let mut form = QueryOptionsForm::new();
            for (name, value) in fields {
                form.set(&name, value)?;
            }
            options.update(&form, metadata);
            println!("{options}");
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.config.log_level);

    if let Err(errors) = cli.config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let metadata = open_metadata(&cli.config)?;

    match cli.command {
        Command::Search { text, explain } => search(&text, explain, &metadata),
        Command::Options { action } => options(action, &cli.config, &metadata),
    }
}
