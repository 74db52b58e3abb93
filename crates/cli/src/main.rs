use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cma_api::CmaClient;
use cma_engine::{CatalogScan, EntriesService, plan_write};
use cma_types::{CONTENT_MEDIA_TYPE, Entry, PageRequest};
use cma_util::{ClientConfig, redact_sensitive};
use serde_json::{Value, json};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "cma", version, about = "Read and write content management entries")]
struct Cli {
    /// Space to operate on. Falls back to CMA_SPACE_ID or the config file.
    #[arg(long, global = true)]
    space: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Entry operations
    #[command(subcommand)]
    Entries(EntriesCommand),
}

#[derive(Debug, Subcommand)]
enum EntriesCommand {
    /// List entries, one page by default
    List {
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        skip: Option<u64>,
        /// Only entries of this content type
        #[arg(long = "content-type")]
        content_type: Option<String>,
        /// Follow pagination to the end
        #[arg(long)]
        all: bool,
    },
    /// Fetch a single entry
    Get {
        #[arg(long)]
        entry: String,
    },
    /// Create or update an entry from a JSON file
    Upsert {
        #[arg(long = "content-type")]
        content_type: String,
        #[arg(long)]
        file: PathBuf,
        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Show a field's value and declared type
    FieldType {
        #[arg(long)]
        entry: String,
        #[arg(long)]
        field: String,
        /// Read every page of content types instead of the first
        #[arg(long)]
        all_pages: bool,
    },
    Publish {
        #[arg(long)]
        entry: String,
    },
    Unpublish {
        #[arg(long)]
        entry: String,
    },
    Archive {
        #[arg(long)]
        entry: String,
    },
    Unarchive {
        #[arg(long)]
        entry: String,
    },
    Delete {
        #[arg(long)]
        entry: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = ClientConfig::load().context("load client config")?;
    let space = cli
        .space
        .or_else(|| config.default_space.clone())
        .context("no space given; pass --space or set CMA_SPACE_ID")?;

    let Command::Entries(command) = cli.command;
    if let EntriesCommand::Upsert {
        content_type,
        file,
        dry_run: true,
    } = &command
    {
        return print_dry_run(&config, &space, content_type, file);
    }

    let client = Arc::new(CmaClient::new(&config)?);
    let entries = EntriesService::new(client);
    run_entries_command(&entries, &space, command).await
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_entries_command(entries: &EntriesService<Arc<CmaClient>>, space: &str, command: EntriesCommand) -> Result<()> {
    match command {
        EntriesCommand::List {
            limit,
            skip,
            content_type,
            all,
        } => {
            let mut page = limit.map(PageRequest::with_limit).unwrap_or_default();
            page.skip = skip.unwrap_or(0);
            let query = content_type
                .map(|content_type| vec![("content_type".to_string(), content_type)])
                .unwrap_or_default();
            let mut listing = entries.list_with(space, page, query);
            let items = if all {
                listing.collect_remaining().await?
            } else {
                listing.next_page().await?.unwrap_or_default()
            };
            debug!(count = items.len(), total = ?listing.total(), "entries listed");
            print_json(&json!({ "total": listing.total(), "items": items }))
        }
        EntriesCommand::Get { entry } => {
            let entry = entries.get(space, &entry).await?;
            print_json(&entry)
        }
        EntriesCommand::Upsert { content_type, file, .. } => {
            let mut entry = read_entry(&file)?;
            entries.upsert(space, &content_type, &mut entry).await?;
            print_json(&entry)
        }
        EntriesCommand::FieldType {
            entry,
            field,
            all_pages,
        } => {
            let entry = entries.get(space, &entry).await?;
            let scan = if all_pages { CatalogScan::AllPages } else { CatalogScan::FirstPage };
            let resolved = entries.schema_resolver(scan).resolve(&entry, &field).await?;
            print_json(&json!({
                "field": field,
                "type": resolved.data_type().map(|data_type| data_type.as_str()),
                "value": resolved.value(),
            }))
        }
        EntriesCommand::Publish { entry } => {
            let mut entry = entries.get(space, &entry).await?;
            entries.publish(space, &mut entry).await?;
            print_json(&entry)
        }
        EntriesCommand::Unpublish { entry } => {
            let mut entry = entries.get(space, &entry).await?;
            entries.unpublish(space, &mut entry).await?;
            print_json(&entry)
        }
        EntriesCommand::Archive { entry } => {
            let mut entry = entries.get(space, &entry).await?;
            entries.archive(space, &mut entry).await?;
            print_json(&entry)
        }
        EntriesCommand::Unarchive { entry } => {
            let mut entry = entries.get(space, &entry).await?;
            entries.unarchive(space, &mut entry).await?;
            print_json(&entry)
        }
        EntriesCommand::Delete { entry } => {
            let entry = entries.get(space, &entry).await?;
            entries.delete(space, &entry).await?;
            print_json(&json!({ "deleted": entry.id() }))
        }
    }
}

fn read_entry(path: &Path) -> Result<Entry> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse entry JSON in {}", path.display()))
}

fn print_dry_run(config: &ClientConfig, space: &str, content_type: &str, file: &Path) -> Result<()> {
    let entry = read_entry(file)?;
    let plan = plan_write(space, content_type, &entry)?;

    let mut header_lines = vec![
        ("accept".to_string(), CONTENT_MEDIA_TYPE.to_string()),
        ("content-type".to_string(), CONTENT_MEDIA_TYPE.to_string()),
        (cma_types::VERSION_HEADER.to_string(), plan.version.to_string()),
        (cma_types::CONTENT_TYPE_HEADER.to_string(), plan.content_type.clone()),
    ];
    if let Some(token) = config.access_token.as_deref() {
        header_lines.push(("authorization".to_string(), format!("Bearer {}", token)));
    }

    let mut headers_out = serde_json::Map::new();
    for (name, value) in header_lines {
        let line = format!("{}: {}", name, value);
        let redacted = redact_sensitive(&line);
        let out_val = redacted
            .split_once(':')
            .map(|(_, value)| value.trim())
            .unwrap_or("")
            .to_string();
        headers_out.insert(name, Value::String(out_val));
    }

    print_json(&json!({
        "kind": format!("{:?}", plan.kind),
        "method": plan.method.as_str(),
        "url": format!("{}{}", config.base_url().trim_end_matches('/'), plan.path),
        "headers": headers_out,
        "body": entry,
    }))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
