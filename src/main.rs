mod db;
mod error;
mod parser;
mod postprocess;
mod record;
mod settings;
mod table;
mod triples;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use error::ConfigurationError;
use parser::{ExtractContext, RecordBatch};
use settings::Settings;

#[derive(Parser)]
#[command(name = "findhelp_extract", about = "FindHelp directory pages → service records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract records from saved directory pages into a CSV table
    Extract {
        /// Directory of saved *.html result pages
        #[arg(short, long)]
        input: PathBuf,
        /// Output CSV
        #[arg(short, long)]
        output: PathBuf,
        /// Service category stamped on every record
        #[arg(long)]
        service_type: Option<String>,
        /// Places CSV holding the zipcode allow-list
        #[arg(long)]
        zipcodes: Option<PathBuf>,
        /// Column of the places CSV to read zipcodes from
        #[arg(long)]
        column: Option<String>,
        /// Skip the zipcode filter and de-duplication
        #[arg(long)]
        no_filter: bool,
        /// Write skipped listings as JSON
        #[arg(long)]
        skipped: Option<PathBuf>,
    },
    /// Build Subject,Relationship,Object triples from extracted tables
    Triples {
        #[arg(short, long)]
        output: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Load a triples CSV into the SQLite graph
    Load {
        #[arg(short, long)]
        triples: PathBuf,
        /// Clear the graph first
        #[arg(long)]
        fresh: bool,
    },
    /// Show graph statistics
    Stats {
        /// Number of relationship labels to list
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,
        /// Also list the outgoing relationships of this node
        #[arg(long)]
        node: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(Path::new(settings::CONFIG_FILE))
        .with_context(|| format!("Failed to load {}", settings::CONFIG_FILE))?;
    info!(?settings, "Loaded settings");

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            service_type,
            zipcodes,
            column,
            no_filter,
            skipped,
        } => {
            let ctx = ExtractContext::new(
                settings.source_offset_hours,
                service_type.as_deref().unwrap_or(&settings.service_type),
                &settings.base_url,
            )
            .with_context(|| format!("Invalid base_url '{}'", settings.base_url))?;

            let allowed = if no_filter {
                None
            } else {
                let path = zipcodes
                    .or_else(|| settings.zipcodes_path.clone())
                    .ok_or(ConfigurationError::NoAllowList)?;
                let column = column.unwrap_or_else(|| settings.zipcode_column.clone());
                Some(postprocess::load_allow_list(&path, &column)?)
            };

            let pages = list_pages(&input)?;
            if pages.is_empty() {
                println!("No *.html files in {}.", input.display());
                return Ok(());
            }
            println!("Extracting {} pages...", pages.len());
            let batch = extract_pages(&pages, &ctx)?;

            let extracted = batch.records.len();
            let records = match &allowed {
                Some(allowed) => postprocess::process(batch.records, allowed)?,
                None => batch.records,
            };
            table::write_records_to_path(&output, &records)?;

            if let Some(path) = skipped {
                let json = serde_json::to_string_pretty(&batch.skipped)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }

            println!(
                "{} documents, {} listings: {} extracted, {} skipped, {} written to {}.",
                batch.documents,
                batch.listings,
                extracted,
                batch.skipped.len(),
                records.len(),
                output.display()
            );
            Ok(())
        }
        Commands::Triples { output, inputs } => {
            let triples = triples::TripleBuilder::default().from_files(&inputs)?;
            triples::write_triples(&output, &triples)?;
            println!("Wrote {} triples to {}.", triples.len(), output.display());
            Ok(())
        }
        Commands::Load { triples, fresh } => {
            let rows = triples::read_triples(&triples)?;
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            if fresh {
                db::clear(&conn)?;
            }
            let stats = db::load_triples(&conn, &rows)?;
            println!(
                "Loaded {} relationships ({} new nodes) into {}.",
                stats.triples,
                stats.new_nodes,
                settings.db_path.display()
            );
            Ok(())
        }
        Commands::Stats { top, node } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::graph_stats(&conn, top)?;
            println!("Nodes:         {}", s.nodes);
            println!("Relationships: {}", s.relationships);
            if !s.top_labels.is_empty() {
                println!("\n--- Labels ---");
                for (label, n) in &s.top_labels {
                    println!("  {:<32} {:>6}", label, n);
                }
            }
            if let Some(name) = node {
                let edges = db::neighbors(&conn, &name)?;
                println!("\n--- {} ({} relationships) ---", name, edges.len());
                for (label, object) in &edges {
                    println!("  {} -> {}", label, object);
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// `*.html` files directly under `dir`, sorted by file name.
fn list_pages(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut pages = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e.eq_ignore_ascii_case("html")) {
            pages.push(path);
        }
    }
    pages.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(pages)
}

/// Documents are parsed in parallel; outcomes are absorbed in file order.
fn extract_pages(pages: &[PathBuf], ctx: &ExtractContext) -> anyhow::Result<RecordBatch> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let outcomes = pages
        .par_iter()
        .map(|path| {
            let html = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let outcome = parser::extract_document(&source, &html, ctx);
            pb.inc(1);
            Ok::<_, anyhow::Error>(outcome)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    pb.finish_and_clear();

    let mut batch = RecordBatch::default();
    for outcome in outcomes {
        batch.absorb(outcome);
    }
    Ok(batch)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
