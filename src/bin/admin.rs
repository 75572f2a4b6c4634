//! FeedStore Admin Binary
//!
//! Inspects and maintains a file-backed feed store.

use clap::{Parser, Subcommand};
use feedstore::blob::WalBlobStore;
use feedstore::{ActionKind, Config, FeedStore, FeedStoreError};
use tracing_subscriber::{fmt, EnvFilter};

/// FeedStore admin
#[derive(Parser, Debug)]
#[command(name = "feedstore-admin")]
#[command(about = "Inspect and maintain a feed store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./feedstore_data")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print entry counts per namespace
    Stats,

    /// Evict cached content, sessions and uploadable actions
    Clear,

    /// List session names
    Sessions,

    /// Print the current item order of a session
    Session {
        /// Session name
        name: String,
    },

    /// List local actions of one kind (dismiss, view, click)
    LocalActions {
        /// Action kind
        kind: String,
    },

    /// Rewrite both blob WALs as snapshots
    Compact,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,feedstore=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    let config = Config::builder().data_dir(&args.data_dir).build();

    tracing::debug!("FeedStore admin v{}", feedstore::VERSION);

    if let Err(e) = run(config, args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: Config, command: Commands) -> feedstore::Result<()> {
    let open = || FeedStore::open(config.clone());

    match command {
        Commands::Stats => {
            let stats = open()?.stats()?;
            println!("payloads:            {}", stats.payloads);
            println!("shared states:       {}", stats.shared_states);
            println!("semantic properties: {}", stats.semantic_properties);
            println!("sessions:            {}", stats.sessions);
            println!("local actions:       {}", stats.local_actions);
            println!("uploadable actions:  {}", stats.uploadable_actions);
        }
        Commands::Clear => {
            let report = open()?.clear_with_report();
            println!(
                "{:?}: {} content keys, {} sessions, {} uploadable actions deleted",
                report.state,
                report.content_keys_deleted,
                report.sessions_deleted,
                report.uploadable_actions_deleted
            );
            if let Some(step) = report.failed_step {
                println!("failed at {:?}; earlier steps remain applied", step);
                std::process::exit(2);
            }
        }
        Commands::Sessions => {
            for name in open()?.sessions().get_all()? {
                println!("{}", name);
            }
        }
        Commands::Session { name } => {
            for id in open()?.sessions().item_order(&name)? {
                println!("{}", id);
            }
        }
        Commands::LocalActions { kind } => {
            let Some(kind) = ActionKind::parse(&kind) else {
                return Err(FeedStoreError::Config(format!("unknown action kind: {}", kind)));
            };
            for (id, _) in open()?.local_actions().get_all_of_kind(kind)? {
                println!("{}", id);
            }
        }
        Commands::Compact => {
            config.validate()?;
            for path in [config.content_wal_path(), config.uploads_wal_path()] {
                WalBlobStore::open(
                    &path,
                    config.wal_sync_strategy,
                    config.wal_compaction_threshold,
                )?
                .compact()?;
            }
        }
    }

    Ok(())
}
