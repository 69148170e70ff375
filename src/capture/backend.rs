use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::{mpsc, watch};

/// One encoded media chunk emitted by the capture pipeline.
///
/// Chunks are opaque to this service: the encoder decides the container
/// format, we only preserve emission order and byte content.
#[derive(Debug, Clone)]
pub struct MediaChunk {
    /// Encoded bytes (may be empty; empty chunks are dropped by the recorder)
    pub data: Vec<u8>,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
    /// Sequence number for ordering
    pub sequence: u64,
}

/// A single video frame, ready for expression detection.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Encoded image bytes (e.g. JPEG), passed verbatim to the expression service
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Live handles produced by a successful acquisition.
pub struct MediaStream {
    /// Ordered encoded chunks (the recorder feed)
    pub chunks: mpsc::Receiver<MediaChunk>,
    /// Latest video frame (the expression-sampler feed); `None` until the
    /// first frame arrives
    pub frames: watch::Receiver<Option<VideoFrame>>,
}

/// Configuration for a capture backend
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Request the camera track
    pub video: bool,
    /// Request the microphone track
    pub audio: bool,
    /// Interval between emitted chunks in milliseconds
    pub chunk_interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
            chunk_interval_ms: 1000, // one chunk per second
        }
    }
}

/// Camera + microphone capture backend trait
///
/// Implementations:
/// - File: replay an encoded recording from disk (tests/offline runs)
/// - Device: a live capture pipeline attached out of process
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Acquire the devices and start producing media.
    ///
    /// Returns the live stream handles, or an acquisition error when
    /// permission is denied or no device is present.
    async fn start(&mut self) -> Result<MediaStream>;

    /// Release the devices and stop producing media.
    async fn stop(&mut self) -> Result<()>;

    /// Check if the backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Capture source type
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Live camera + microphone
    Device,
    /// Encoded media file (replayed as timed chunks)
    File(PathBuf),
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    /// Create a capture backend for the given source
    pub fn create(source: CaptureSource, config: CaptureConfig) -> Result<Box<dyn CaptureBackend>> {
        match source {
            CaptureSource::File(path) => {
                let backend = super::file::FileCaptureBackend::new(path, config)?;
                Ok(Box::new(backend))
            }

            CaptureSource::Device => {
                anyhow::bail!(
                    "Live device capture requires an external capture pipeline; \
                    use a file source"
                )
            }
        }
    }
}

/// Mock capture backend for testing
pub struct MockCaptureBackend {
    chunks: Vec<MediaChunk>,
    frame: Option<VideoFrame>,
    capturing: bool,
    fail_start: Option<String>,
    // Senders are held so the stream stays open until stop()
    chunk_tx: Option<mpsc::Sender<MediaChunk>>,
    frame_tx: Option<watch::Sender<Option<VideoFrame>>>,
}

impl MockCaptureBackend {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            frame: None,
            capturing: false,
            fail_start: None,
            chunk_tx: None,
            frame_tx: None,
        }
    }

    /// Configure the chunks delivered after start
    pub fn with_chunks(mut self, chunks: Vec<MediaChunk>) -> Self {
        self.chunks = chunks;
        self
    }

    /// Configure a still frame published for the sampler
    pub fn with_frame(mut self, frame: VideoFrame) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Configure the mock to fail acquisition
    pub fn with_start_failure(mut self, message: &str) -> Self {
        self.fail_start = Some(message.to_string());
        self
    }

    /// Push another chunk into the live stream (after start)
    pub async fn push_chunk(&self, chunk: MediaChunk) {
        if let Some(tx) = &self.chunk_tx {
            let _ = tx.send(chunk).await;
        }
    }

    /// Publish a new latest frame (after start)
    pub fn publish_frame(&self, frame: VideoFrame) {
        if let Some(tx) = &self.frame_tx {
            let _ = tx.send(Some(frame));
        }
    }
}

impl Default for MockCaptureBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CaptureBackend for MockCaptureBackend {
    async fn start(&mut self) -> Result<MediaStream> {
        if let Some(message) = &self.fail_start {
            anyhow::bail!("{}", message.clone());
        }

        let (chunk_tx, chunk_rx) = mpsc::channel(self.chunks.len().max(16));
        for chunk in self.chunks.clone() {
            let _ = chunk_tx.try_send(chunk);
        }
        let (frame_tx, frame_rx) = watch::channel(self.frame.clone());

        self.chunk_tx = Some(chunk_tx);
        self.frame_tx = Some(frame_tx);
        self.capturing = true;

        Ok(MediaStream {
            chunks: chunk_rx,
            frames: frame_rx,
        })
    }

    async fn stop(&mut self) -> Result<()> {
        self.chunk_tx = None;
        self.frame_tx = None;
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "mock"
    }
}
