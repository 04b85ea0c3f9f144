//! Single-slot analysis worker: the one place in the web tier where true
//! serialization is required. One spawned task owns the vision backend and
//! drains a request channel, so the remote API never sees more than one
//! concurrent call from this process. Additional callers queue behind the
//! channel rather than being rejected, each bounded by its own wait.
//!
//! A caller that times out abandons its reply channel only; the in-flight
//! remote call still runs to completion. There is no cancellation path.

use crate::errors::AppError;
use crate::vision::client::VisionBackend;
use crate::vision::types::RawAnalysis;
use log::{debug, error, info};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

struct AnalysisRequest {
    jpeg: Vec<u8>,
    reply: oneshot::Sender<Result<RawAnalysis, AppError>>,
}

#[derive(Clone)]
pub struct AnalysisWorker {
    tx: mpsc::Sender<AnalysisRequest>,
    wait_timeout: Duration,
}

impl AnalysisWorker {
    /// Spawn the worker task. The backend is moved into the task and owned
    /// there for the life of the process; no teardown is needed beyond
    /// process exit.
    pub fn spawn<B>(backend: B, wait_timeout: Duration) -> Self
    where
        B: VisionBackend + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<AnalysisRequest>(16);
        tokio::spawn(async move {
            info!("🧠 Analysis worker started (single-slot).");
            while let Some(request) = rx.recv().await {
                debug!("🔬 Analysis worker picked up a frame ({} bytes).", request.jpeg.len());
                let result = backend.analyze(&request.jpeg).await;
                if let Err(e) = &result {
                    error!("❌ Analysis failed: {}", e);
                }
                // The caller may have timed out and dropped its receiver.
                let _ = request.reply.send(result);
            }
            info!("🧠 Analysis worker channel closed; exiting.");
        });
        AnalysisWorker { tx, wait_timeout }
    }

    /// Queue one frame for analysis and wait for the result. The timeout
    /// covers the whole wait, queue admission included, so a caller stuck
    /// behind a full queue is bounded the same as one waiting on a slow
    /// remote call.
    pub async fn analyze(&self, jpeg: Vec<u8>) -> Result<RawAnalysis, AppError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = AnalysisRequest {
            jpeg,
            reply: reply_tx,
        };

        let submit_and_wait = async {
            self.tx
                .send(request)
                .await
                .map_err(|_| AppError::Vision("Analysis worker is not running".to_string()))?;
            reply_rx
                .await
                .map_err(|_| AppError::Vision("Analysis worker dropped the request".to_string()))?
        };

        match tokio::time::timeout(self.wait_timeout, submit_and_wait).await {
            Err(_) => Err(AppError::AnalysisTimeout(self.wait_timeout)),
            Ok(result) => result,
        }
    }
}
