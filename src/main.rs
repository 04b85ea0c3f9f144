use anyhow::{bail, Result};
use camwatch::common::logging_setup;
use camwatch::{cli, config_loader, operations};
use log::{error, info};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or("config/camwatch.yaml");

    let master_config = match config_loader::load_config(config_path) {
        Ok(cfg) => {
            logging_setup::initialize_logging(Some(&cfg), &matches);
            cfg
        }
        Err(e) => {
            logging_setup::initialize_logging(None, &matches);
            error!(
                "❌ Failed to load master configuration from '{}': {:#}. Exiting.",
                config_path, e
            );
            return Err(e.context(format!(
                "Failed to load master configuration from '{}'",
                config_path
            )));
        }
    };

    if let Some((operation_name, sub_matches)) = matches.subcommand() {
        let op_start_time = Instant::now();
        let op_result: Result<()> = match operation_name {
            "capture" => operations::capture_op::handle_capture_cli(&master_config, sub_matches).await,
            "serve" => operations::serve_op::handle_serve_cli(&master_config, sub_matches).await,
            other => bail!("Subcommand '{}' not implemented.", other),
        };

        if let Err(e) = op_result {
            error!(
                "❌ Operation '{}' failed after {:?}: {:#}",
                operation_name,
                op_start_time.elapsed(),
                e
            );
            return Err(e);
        }
        info!(
            "✅ Operation '{}' completed in {:?}.",
            operation_name,
            op_start_time.elapsed()
        );
    } else {
        info!("🤔 No subcommand provided. Use 'capture' or 'serve'.");
    }

    Ok(())
}
