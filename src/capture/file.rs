use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backend::{CaptureBackend, CaptureConfig, MediaChunk, MediaStream, VideoFrame};

/// Bytes per emitted chunk when replaying a file
const REPLAY_CHUNK_BYTES: usize = 16 * 1024;

/// File-backed capture backend
///
/// Replays an encoded media file from disk as a sequence of timed chunks,
/// for tests and offline runs. Optionally publishes a still video frame so
/// the expression sampler has something to look at.
pub struct FileCaptureBackend {
    path: PathBuf,
    config: CaptureConfig,
    data: Vec<u8>,
    still_frame: Option<VideoFrame>,
    running: Arc<AtomicBool>,
    replay_task: Option<JoinHandle<()>>,
}

impl FileCaptureBackend {
    pub fn new(path: impl AsRef<Path>, config: CaptureConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = std::fs::read(&path)
            .with_context(|| format!("Failed to read media file: {}", path.display()))?;

        info!(
            "File capture backend initialized: {} ({} bytes)",
            path.display(),
            data.len()
        );

        Ok(Self {
            path,
            config,
            data,
            still_frame: None,
            running: Arc::new(AtomicBool::new(false)),
            replay_task: None,
        })
    }

    /// Publish this frame on every chunk interval while capturing
    pub fn with_still_frame(mut self, data: Vec<u8>, width: u32, height: u32) -> Self {
        self.still_frame = Some(VideoFrame {
            data,
            width,
            height,
            timestamp_ms: 0,
        });
        self
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileCaptureBackend {
    async fn start(&mut self) -> Result<MediaStream> {
        if self.running.load(Ordering::SeqCst) {
            anyhow::bail!("Already capturing");
        }

        info!("Starting file capture replay: {}", self.path.display());

        let (chunk_tx, chunk_rx) = mpsc::channel(64);
        let (frame_tx, frame_rx) = watch::channel(None);

        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let data = self.data.clone();
        let still_frame = self.still_frame.clone();
        let interval_ms = self.config.chunk_interval_ms;

        let task = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_millis(interval_ms.max(1)));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            let mut offset = 0usize;
            let mut sequence = 0u64;
            let mut timestamp_ms = 0u64;

            while running.load(Ordering::SeqCst) {
                interval.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                if let Some(frame) = &still_frame {
                    let mut frame = frame.clone();
                    frame.timestamp_ms = timestamp_ms;
                    let _ = frame_tx.send(Some(frame));
                }

                if offset >= data.len() {
                    // Media exhausted; the frame feed stays live so the
                    // sampler keeps running on the last frame
                    timestamp_ms += interval_ms;
                    continue;
                }

                let end = (offset + REPLAY_CHUNK_BYTES).min(data.len());
                let chunk = MediaChunk {
                    data: data[offset..end].to_vec(),
                    timestamp_ms,
                    sequence,
                };
                offset = end;
                sequence += 1;
                timestamp_ms += interval_ms;

                if chunk_tx.send(chunk).await.is_err() {
                    debug!("Chunk receiver dropped, stopping file replay");
                    break;
                }
            }

            debug!("File capture replay task stopped");
        });

        self.replay_task = Some(task);

        Ok(MediaStream {
            chunks: chunk_rx,
            frames: frame_rx,
        })
    }

    async fn stop(&mut self) -> Result<()> {
        info!("Stopping file capture replay");
        self.running.store(false, Ordering::SeqCst);

        if let Some(task) = self.replay_task.take() {
            let _ = task.await;
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "file"
    }
}
