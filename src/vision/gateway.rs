//! Analysis gateway: snapshot one frame from the shared buffer, encode it,
//! and hand it to the single-slot worker. Distinguishes "capture process
//! down" (buffer absent) from "capture up but nothing written yet" (blank
//! frame) before any remote call is made.

use crate::capture_config::FrameConfig;
use crate::common::jpeg_utils::encode_rgb_to_jpeg;
use crate::core::frame_buffer::{is_blank_frame, FrameBufferReader};
use crate::errors::AppError;
use crate::vision::types::Analysis;
use crate::vision::worker::AnalysisWorker;
use log::debug;

pub struct AnalysisGateway {
    worker: AnalysisWorker,
    frame: FrameConfig,
    jpeg_quality: u8,
    target_labels: Vec<String>,
}

impl AnalysisGateway {
    pub fn new(
        worker: AnalysisWorker,
        frame: FrameConfig,
        jpeg_quality: u8,
        target_labels: Vec<String>,
    ) -> Self {
        AnalysisGateway {
            worker,
            frame,
            jpeg_quality,
            target_labels,
        }
    }

    pub async fn analyze_current_frame(&self) -> Result<Analysis, AppError> {
        let reader = FrameBufferReader::attach(&self.frame.buffer_path, self.frame.frame_len())
            .map_err(|e| AppError::BufferUnavailable(e.to_string()))?;
        let snapshot = reader
            .snapshot()
            .map_err(|e| AppError::BufferUnavailable(e.to_string()))?;

        if is_blank_frame(&snapshot) {
            return Err(AppError::EmptyFrame(
                "frame buffer exists but holds no frame yet".to_string(),
            ));
        }

        let jpeg = encode_rgb_to_jpeg(
            &snapshot,
            self.frame.width,
            self.frame.height,
            self.jpeg_quality,
        )?;
        debug!("🔬 Snapshot encoded to {} JPEG bytes; queueing for analysis.", jpeg.len());

        let raw = self.worker.analyze(jpeg).await?;
        Ok(Analysis::from_raw(raw, &self.target_labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame_buffer::FrameBufferWriter;
    use crate::errors::AppError;
    use crate::vision::client::VisionBackend;
    use crate::vision::types::{BoundingBox, DetectedObject, RawAnalysis};
    use async_trait::async_trait;
    use std::path::Path;
    use std::time::Duration;

    struct StaticBackend {
        objects: Vec<DetectedObject>,
    }

    #[async_trait]
    impl VisionBackend for StaticBackend {
        async fn analyze(&self, _jpeg: &[u8]) -> Result<RawAnalysis, AppError> {
            Ok(RawAnalysis {
                objects: self.objects.clone(),
                ..RawAnalysis::default()
            })
        }
    }

    fn object(label: &str, confidence: f64) -> DetectedObject {
        DetectedObject {
            label: label.to_string(),
            confidence,
            rectangle: BoundingBox { x: 1, y: 2, w: 3, h: 4 },
        }
    }

    fn gateway(buffer_path: &Path, objects: Vec<DetectedObject>) -> AnalysisGateway {
        let frame = FrameConfig {
            width: 4,
            height: 4,
            buffer_path: buffer_path.to_path_buf(),
        };
        let worker = AnalysisWorker::spawn(StaticBackend { objects }, Duration::from_secs(5));
        AnalysisGateway::new(
            worker,
            frame,
            80,
            vec!["hat".to_string(), "cap".to_string(), "headwear".to_string()],
        )
    }

    #[tokio::test]
    async fn absent_buffer_is_camera_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let gw = gateway(&dir.path().join("missing"), Vec::new());
        match gw.analyze_current_frame().await {
            Err(AppError::BufferUnavailable(_)) => {}
            other => panic!("expected BufferUnavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn blank_frame_is_no_frame_yet_not_a_remote_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame");
        let _writer = FrameBufferWriter::create(&path, 4 * 4 * 3).unwrap();
        let gw = gateway(&path, Vec::new());
        match gw.analyze_current_frame().await {
            Err(AppError::EmptyFrame(_)) => {}
            other => panic!("expected EmptyFrame, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn written_frame_produces_partitioned_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame");
        let mut writer = FrameBufferWriter::create(&path, 4 * 4 * 3).unwrap();
        writer.write(&vec![120u8; 4 * 4 * 3]).unwrap();

        let gw = gateway(&path, vec![object("hat", 0.91), object("shirt", 0.80)]);
        let analysis = gw.analyze_current_frame().await.unwrap();
        assert_eq!(analysis.objects.len(), 2);
        assert_eq!(analysis.hat_objects.len(), 1);
        assert_eq!(analysis.hat_objects[0].label, "hat");
    }
}
