use crate::capture::supervisor::{CaptureSupervisor, SupervisorSettings};
use crate::capture::OpenCvOpener;
use crate::config_loader::MasterConfig;
use crate::core::source_selector::SourceSelector;
use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Run the capture supervisor until SIGINT. The OpenCV work is blocking by
/// nature, so the whole loop lives on a blocking task while the async side
/// only watches for the shutdown signal.
pub async fn handle_capture_cli(master_config: &MasterConfig, _args: &ArgMatches) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));

    let signal_flag = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("🛑 Shutdown signal received; stopping capture supervisor.");
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    let opener = OpenCvOpener::new(
        master_config.capture.clone(),
        master_config.frame.width,
        master_config.frame.height,
    );
    let selector = SourceSelector::new(master_config.capture.selector_path.clone());
    let settings = SupervisorSettings {
        width: master_config.frame.width,
        height: master_config.frame.height,
        reconnect_backoff: master_config.capture.reconnect_backoff(),
        write_interval: master_config.capture.write_interval(),
    };

    let supervisor = CaptureSupervisor::new(
        opener,
        selector,
        master_config.frame.buffer_path.clone(),
        settings,
        shutdown,
    );

    tokio::task::spawn_blocking(move || supervisor.run())
        .await
        .context("Capture supervisor task panicked")??;

    info!("🏁 Capture supervisor exited cleanly.");
    Ok(())
}
