//! Haven CLI
//!
//! Operational tool for the protection engine: check URLs against the
//! protected set, run an allowlist sync, inspect snapshots, and time the
//! decision hot path.

mod store;

use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use haven_core::{DomainIndex, FuzzyMatchEvent, MatchEventSink, ProtectionEngine, BUNDLED_DOMAINS};
use haven_sync::{merge_with_defaults, SnapshotStore, SyncClient, SyncOutcome};

use crate::store::FileStore;

#[derive(Parser)]
#[command(name = "haven-cli")]
#[command(about = "Haven crisis-domain protection tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether URLs belong to the protected set
    Check {
        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,

        /// Snapshot file to seed the index from (bundled defaults are
        /// always included)
        #[arg(short, long)]
        snapshot: Option<String>,
    },

    /// Refresh the protected set from an allowlist endpoint
    Sync {
        /// Allowlist endpoint URL
        #[arg(short, long)]
        endpoint: String,

        /// Snapshot file path
        #[arg(short, long, default_value = "allowlist.json")]
        snapshot: String,
    },

    /// Show index and snapshot info
    Info {
        /// Snapshot file to inspect
        #[arg(short, long)]
        snapshot: Option<String>,
    },

    /// Time the decision hot path
    Bench {
        /// Iterations per scenario
        #[arg(short, long, default_value_t = 100_000)]
        iterations: u32,
    },
}

/// Sink that surfaces fuzzy hits on the log; stands in for the batched
/// telemetry uploader a host application would inject.
struct LogSink;

impl MatchEventSink for LogSink {
    fn post(&self, event: FuzzyMatchEvent) {
        log::info!(
            "fuzzy match: {} ~ {} (d={})",
            event.candidate,
            event.matched_domain,
            event.distance
        );
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { urls, snapshot } => cmd_check(&urls, snapshot.as_deref()),
        Commands::Sync { endpoint, snapshot } => cmd_sync(&endpoint, &snapshot),
        Commands::Info { snapshot } => cmd_info(snapshot.as_deref()),
        Commands::Bench { iterations } => cmd_bench(iterations),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))
}

/// Build an engine from bundled defaults plus an optional snapshot file.
fn load_engine(snapshot: Option<&str>) -> Result<ProtectionEngine, String> {
    let engine = ProtectionEngine::with_sink(Box::new(LogSink));

    if let Some(path) = snapshot {
        let rt = runtime()?;
        let stored = rt
            .block_on(FileStore::new(path).load())
            .map_err(|e| format!("Failed to read snapshot '{path}': {e}"))?;
        if let Some(stored) = stored {
            let domains = merge_with_defaults(stored.domains);
            engine.install_index(Arc::new(DomainIndex::build(&domains)));
        }
    }

    Ok(engine)
}

fn cmd_check(urls: &[String], snapshot: Option<&str>) -> Result<(), String> {
    let engine = load_engine(snapshot)?;

    for url in urls {
        let verdict = if engine.is_url_protected(url) {
            "PROTECTED"
        } else {
            "-"
        };
        println!("{verdict:9}  {url}");
    }

    Ok(())
}

fn cmd_sync(endpoint: &str, snapshot: &str) -> Result<(), String> {
    let rt = runtime()?;

    let engine = Arc::new(ProtectionEngine::with_sink(Box::new(LogSink)));
    let store: Arc<dyn SnapshotStore> = Arc::new(FileStore::new(snapshot));
    let client = SyncClient::new(endpoint, Arc::clone(&engine), Arc::clone(&store))
        .map_err(|e| format!("Failed to build sync client: {e}"))?;

    rt.block_on(async {
        client.bootstrap().await;
        let before = engine.current_index().len();

        match client.sync().await {
            Ok(SyncOutcome::Changed) => {
                let index = engine.current_index();
                println!("Allowlist updated ({} -> {} index entries)", before, index.len());
                println!("  Snapshot: {snapshot}");
                Ok(())
            }
            Ok(SyncOutcome::Unchanged) => {
                println!("Allowlist unchanged ({before} index entries)");
                Ok(())
            }
            Err(e) => Err(format!("Sync failed, protection unchanged: {e}")),
        }
    })
}

fn cmd_info(snapshot: Option<&str>) -> Result<(), String> {
    let engine = load_engine(snapshot)?;
    let index = engine.current_index();

    println!("Bundled defaults: {} domains", BUNDLED_DOMAINS.len());
    println!("Live index:       {} entries ({} base domains)", index.len(), index.base_len());

    if let Some(path) = snapshot {
        let rt = runtime()?;
        match rt.block_on(FileStore::new(path).load()) {
            Ok(Some(s)) => {
                println!("Snapshot:         {path}");
                println!("  Version:        {}", s.version);
                println!("  Last updated:   {} (epoch ms)", s.last_updated);
                println!("  Domains:        {}", s.domains.len());
            }
            Ok(None) => println!("Snapshot:         {path} (not found)"),
            Err(e) => println!("Snapshot:         {path} (unreadable: {e})"),
        }
    }

    Ok(())
}

fn cmd_bench(iterations: u32) -> Result<(), String> {
    let engine = ProtectionEngine::new();

    let scenarios: &[(&str, String)] = &[
        ("exact match", "https://www.thehotline.org/help".to_string()),
        ("miss", "https://news.example.com/article?id=1".to_string()),
        ("fuzzy hit", "https://thehotlien.org".to_string()),
        ("adversarial", format!("https://{}.org", "a".repeat(10_000))),
    ];

    println!("Benchmarking {iterations} iterations per scenario");
    for (name, url) in scenarios {
        let start = Instant::now();
        let mut hits = 0u32;
        for _ in 0..iterations {
            if engine.is_url_protected(url) {
                hits += 1;
            }
        }
        let elapsed = start.elapsed();
        let per_call = elapsed.as_nanos() as f64 / f64::from(iterations);
        println!(
            "  {name:12} {:>10.0} ns/call  ({:.1}ms total, {} hits)",
            per_call,
            elapsed.as_secs_f64() * 1000.0,
            hits
        );
    }

    Ok(())
}
