//! Command implementations for the RF inventory CLI
//!
//! Sets up logging, builds the configuration from the parsed arguments and
//! hands off to the processor.

use crate::cli::args::{CommonArgs, Commands};
use crate::config::InventoryConfig;
use crate::error::{InventoryError, Result};
use crate::models::ProcessingStats;
use crate::processor::InventoryProcessor;
use tracing::{debug, info};

/// Run one subcommand to completion
pub async fn run(command: Commands) -> Result<ProcessingStats> {
    let common = command.common();
    setup_logging(common)?;
    common.validate()?;
    debug!("Command line arguments: {:?}", command);

    let stats = match &command {
        Commands::Inventory(args) => {
            let config = args.to_config();
            info!("Building inventory with {:?} pooling", config.pooling);
            processor(common, config)?
                .with_append(args.append)
                .with_parquet(args.parquet)
                .process()
                .await?
        }
        Commands::Composites(args) => {
            processor(args, args.to_config())?
                .export_composites()
                .await?
        }
        Commands::Convert(args) => processor(args, args.to_config())?.convert_logs().await?,
    };

    Ok(stats)
}

fn processor(common: &CommonArgs, config: InventoryConfig) -> Result<InventoryProcessor> {
    InventoryProcessor::new(common.inputs.clone(), common.output.clone(), config)?
        .with_pattern(common.pattern.as_deref())
        .map(|processor| processor.with_quiet(common.quiet))
}

/// Set up tracing to stderr; `RUST_LOG` overrides the verbosity flags
fn setup_logging(args: &CommonArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rf_inventory={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| InventoryError::configuration(format!("Failed to set up logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
