use anyhow::Context;
use clap::Parser;
use rf_inventory::cli::{args::Args, commands};
use rf_inventory::error::InventoryError;
use std::process;

fn main() {
    let args = Args::parse();

    // No subcommand: show help and available commands
    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(command) => {
                result.context("Run failed")
            }
            signal = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                let reason = match signal {
                    Ok(()) => "Processing interrupted by user".to_string(),
                    Err(e) => format!("Failed to listen for CTRL+C: {}", e),
                };
                Err(InventoryError::Interrupted { reason }.into())
            }
        }
    });

    match result {
        // Skipped files are soft errors; stats have already been reported by the processor
        Ok(_stats) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("RF Inventory - RF-EMF exposure inventory builder");
    println!("================================================");
    println!();
    println!("Summarize exposimeter excursion files into a per-file inventory and");
    println!("statistics pooled globally, per region and per environment.");
    println!();
    println!("USAGE:");
    println!("    rf-inventory <COMMAND> [OPTIONS] <INPUTS>...");
    println!();
    println!("COMMANDS:");
    println!("    inventory   Build inventory.csv and summary.csv (main command)");
    println!("    composites  Write per-row category composites (<name>_agg.csv)");
    println!("    convert     Convert raw ExpoM logs into CSV measurement tables");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Inventory of every excursion under a folder:");
    println!("    rf-inventory inventory ./excursions -o ./results");
    println!();
    println!("    # Add a new week to an existing inventory, region pools only:");
    println!("    rf-inventory inventory ./week7 -o ./results --append --pool region");
    println!();
    println!("    # Convert raw logs first:");
    println!("    rf-inventory convert ./raw/*.txt -o ./excursions");
    println!();
    println!("For detailed help on any command, use:");
    println!("    rf-inventory <COMMAND> --help");
}
