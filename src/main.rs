//! Sawdesk admin tool
//!
//! Works directly against the local database:
//! - Write a default config file
//! - Seed demo data
//! - Record or correct a sharpening
//! - Print reports as JSON without a running server

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use sawdesk::config::{generate_default_config, Config};
use sawdesk::report::{ReportEngine, ReportWindow};
use sawdesk::store::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sawdesk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Saw-sharpening shop administration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate default config file
    Init {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fill an empty database with demo clients, blades and history
    ///
    /// Refuses to run against a database that already holds data.
    Seed {
        /// Number of clients
        #[arg(long, default_value = "5")]
        clients: usize,
        /// Days of history to generate
        #[arg(long, default_value = "90")]
        days: i64,
    },

    /// Record a sharpening
    Record {
        blade: i64,
        /// EDGE, FACE or FULL
        kind: String,
        #[arg(long)]
        operator: i64,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Correct the kind and notes of a recorded sharpening
    Correct {
        record: i64,
        kind: String,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Print the dashboard summary
    Dashboard,

    /// Print a blade report
    Blade { id: i64 },

    /// Print a client report
    Client { id: i64 },

    /// Print statistics
    Stats {
        #[arg(long)]
        since: Option<String>,
        #[arg(long)]
        until: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { output } = &cli.command {
        let config = generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &config)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", config),
        }
        return Ok(());
    }

    let (config, source) = match &cli.config {
        Some(path) => (Config::load_with_env(path)?, Some(path.clone())),
        None => Config::load_default()?,
    };
    config
        .logging
        .init_subscriber()
        .context("Failed to initialize logging")?;
    match &source {
        Some(path) => tracing::info!(path = ?path, "Loaded config"),
        None => tracing::info!("Using default config with environment overrides"),
    }

    let db_path = config.store.resolved_path();
    let store = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?,
    );
    let engine = ReportEngine::new(store.clone());
    let now = Utc::now();

    match cli.command {
        Commands::Init { .. } => {}

        Commands::Seed { clients, days } => {
            if !store.is_empty()? {
                anyhow::bail!(
                    "Database {:?} already holds data; seed expects an empty database",
                    db_path
                );
            }
            let summary = seed_demo(&store, clients, days)?;
            tracing::info!(
                clients = summary.clients,
                blades = summary.blades,
                records = summary.records,
                path = ?db_path,
                "Seeded demo data"
            );
            println!(
                "Seeded {} clients, {} blades, {} sharpenings into {:?}",
                summary.clients, summary.blades, summary.records, db_path
            );
        }

        Commands::Record {
            blade,
            kind,
            operator,
            notes,
        } => {
            let kind: SharpenKind = kind.parse().map_err(anyhow::Error::msg)?;
            let mut new = NewSharpening::new(blade, kind, operator);
            if let Some(notes) = notes {
                new = new.notes(notes);
            }
            let record = store.record_sharpening(&new)?;
            println!("Recorded sharpening {} ({}) on blade {}", record.id, record.kind, blade);
        }

        Commands::Correct { record, kind, notes } => {
            let kind: SharpenKind = kind.parse().map_err(anyhow::Error::msg)?;
            let record = store.correct_record(record, kind, notes.as_deref())?;
            println!("Record {} is now {}", record.id, record.kind);
        }

        Commands::Dashboard => print_json(&engine.dashboard_summary(now).await?)?,

        Commands::Blade { id } => print_json(&engine.blade_report(id).await?)?,

        Commands::Client { id } => print_json(&engine.client_report(id).await?)?,

        Commands::Stats { since, until } => {
            let window = ReportWindow::resolve(since.as_deref(), until.as_deref(), now)?;
            print_json(&engine.statistics(window).await?)?
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

struct SeedSummary {
    clients: usize,
    blades: usize,
    records: usize,
}

/// Deterministic demo data: each client gets a few blades with a
/// sharpening cadence that depends on its position, so the dashboard shows
/// fresh, regular, overdue and never-sharpened blades.
fn seed_demo(store: &SqliteStore, clients: usize, days: i64) -> StoreResult<SeedSummary> {
    const NAMES: [&str; 8] = [
        "Acme Lumber",
        "Birch & Sons",
        "Cedar Works",
        "Dovetail Joinery",
        "Elm Street Carpentry",
        "Fjord Timber",
        "Grainline Cabinets",
        "Hollow Oak Mill",
    ];

    let types = [
        store.insert_blade_type(&BladeType::new("RIP", "Ripsaw").description("Ripping blade"))?,
        store.insert_blade_type(&BladeType::new("XCUT", "Crosscut"))?,
        store.insert_blade_type(&BladeType::new("BAND", "Band saw"))?,
    ];
    let operators = [
        store.insert_operator(&Operator::new("Marta", Role::Manager))?,
        store.insert_operator(&Operator::new("Olek", Role::Operator))?,
        store.insert_operator(&Operator::new("Ines", Role::Operator))?,
    ];

    let kinds = SharpenKind::all();
    let now = Utc::now();
    let mut summary = SeedSummary {
        clients: 0,
        blades: 0,
        records: 0,
    };

    for c in 0..clients {
        let name = match NAMES.get(c) {
            Some(name) => name.to_string(),
            None => format!("Client {}", c + 1),
        };
        let client = store.insert_client(&Client::new(name).phone(format!("555-01{:02}", c)))?;
        summary.clients += 1;

        for b in 0..(2 + c % 3) {
            let blade_type = &types[(c + b) % types.len()];
            let blade = store.insert_blade(&Blade::new(
                format!("{}-{:03}", blade_type.code, c * 10 + b + 1),
                client.id,
                blade_type.id,
            ))?;
            summary.blades += 1;

            // Last blade of every third client is never sharpened
            if c % 3 == 2 && b == 1 + c % 3 {
                continue;
            }

            let cadence = 5 + ((c * 7 + b * 11) % 40) as i64;
            let mut age = ((c + b) % 5) as i64 * 15;
            let mut n = 0;
            while age < days {
                let record = NewSharpening::new(
                    blade.id,
                    kinds[(n + b) % kinds.len()],
                    operators[(n + c) % operators.len()].id,
                )
                .at(now - Duration::days(age) - Duration::hours((n % 8) as i64));
                store.record_sharpening(&record)?;
                summary.records += 1;

                age += cadence;
                n += 1;
            }
        }
    }

    Ok(summary)
}
