use crate::common::jpeg_utils::load_placeholder_jpeg;
use crate::config_loader::MasterConfig;
use crate::core::source_selector::SourceSelector;
use crate::vision::client::AzureVisionClient;
use crate::vision::gateway::AnalysisGateway;
use crate::vision::worker::AnalysisWorker;
use crate::web::restart::CommandRestarter;
use crate::web::{create_router, AppState};
use anyhow::{Context, Result};
use bytes::Bytes;
use clap::ArgMatches;
use log::info;
use std::path::Path;
use std::sync::Arc;

/// Run the web tier (streaming + analysis gateways) until SIGINT.
pub async fn handle_serve_cli(master_config: &MasterConfig, args: &ArgMatches) -> Result<()> {
    let listen_addr = args
        .get_one::<String>("listen")
        .cloned()
        .unwrap_or_else(|| master_config.app_settings.listen_addr.clone());

    let placeholder = load_placeholder_jpeg(
        Path::new(&master_config.app_settings.placeholder_image),
        master_config.frame.width,
        master_config.frame.height,
        master_config.stream.jpeg_quality,
    )
    .context("Failed to prepare the placeholder image")?;

    // Analysis is optional: without credentials the endpoint reports the
    // misconfiguration on every attempt while streaming stays up.
    let analyzer = match AzureVisionClient::from_env(master_config.vision.request_timeout())? {
        Some(client) => {
            let worker = AnalysisWorker::spawn(client, master_config.vision.analysis_timeout());
            Some(Arc::new(AnalysisGateway::new(
                worker,
                master_config.frame.clone(),
                master_config.stream.jpeg_quality,
                master_config.vision.target_labels.clone(),
            )))
        }
        None => None,
    };

    let state = AppState {
        frame: master_config.frame.clone(),
        stream: master_config.stream.clone(),
        placeholder: Bytes::from(placeholder),
        selector: Arc::new(SourceSelector::new(
            master_config.capture.selector_path.clone(),
        )),
        restarter: Arc::new(CommandRestarter::new(
            master_config.capture.restart_command.clone(),
        )?),
        analyzer,
    };

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind web tier to {}", listen_addr))?;
    info!("🌐 Web tier listening on {}", listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("🛑 Shutdown signal received; stopping web tier.");
        })
        .await
        .context("Web server error")?;

    info!("🏁 Web tier exited cleanly.");
    Ok(())
}
