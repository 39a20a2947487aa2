use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use pi_events_pipeline::logging;
use pi_events_pipeline::pipeline::{self, SnapshotStore};

#[derive(Parser)]
#[command(name = "pi-events")]
#[command(about = "Accessible-events reconciliation pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    /// Directory holding the JSON snapshot files
    #[arg(long, default_value = "snapshots")]
    snapshots: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile sources, enrich and validate the staged set
    Run {
        /// Also export the approved subset to the public snapshot
        #[arg(long)]
        export: bool,
    },
    /// Export the approved subset from the current staged snapshot
    Export,
    /// Admit scraped events into the live staging snapshot and prune both
    /// live destinations
    Sync,
}

fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let store = SnapshotStore::new(&cli.snapshots);

    match cli.command {
        Commands::Run { export } => {
            println!("🔄 Running reconciliation pipeline...");
            match pipeline::run(&store, export) {
                Ok(result) => {
                    println!("\n📊 Pipeline Results:");
                    println!("   Source events: {}", result.reconcile.total_in);
                    println!("   Staged: {}", result.reconcile.kept);
                    println!("   Duplicates dropped: {}", result.reconcile.duplicates_dropped);
                    println!("   Approvals carried: {}", result.reconcile.approvals_carried);
                    println!("   Venues unmatched: {}", result.enrich.venues_unmatched);
                    println!(
                        "   Validation: {} OK / {} warnings / {} errors",
                        result.validate.ok, result.validate.warnings, result.validate.errors
                    );
                    if let Some(publish) = result.publish {
                        println!("   Published: {}", publish.published);
                    }
                    println!("✅ Pipeline run completed successfully");
                }
                Err(e) => {
                    error!("Pipeline run failed: {}", e);
                    println!("❌ Pipeline run failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Export => {
            println!("📤 Exporting public snapshot...");
            match pipeline::export(&store) {
                Ok(summary) => {
                    println!("\n📊 Export Results:");
                    println!("   Approved: {}", summary.approved);
                    println!("   Pruned outdated: {}", summary.pruned_outdated);
                    println!("   Published: {}", summary.published);
                    println!("✅ Export completed successfully");
                }
                Err(e) => {
                    error!("Export failed: {}", e);
                    println!("❌ Export failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Sync => {
            println!("🔄 Running live sync...");
            match pipeline::run_sync(&store) {
                Ok(summary) => {
                    println!("\n📊 Sync Results:");
                    println!("   Incoming: {}", summary.incoming);
                    println!("   Admitted: {}", summary.admitted);
                    println!(
                        "   Skipped duplicates: {} ({} by URL, {} by key)",
                        summary.skipped_duplicates, summary.url_matches, summary.composite_matches
                    );
                    println!("   Pruned staging rows: {}", summary.pruned_staging);
                    println!("   Pruned public rows: {}", summary.pruned_public);
                    println!("✅ Sync completed successfully");
                }
                Err(e) => {
                    error!("Sync failed: {}", e);
                    println!("❌ Sync failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}
