use anyhow::{Context, Result};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::capture::MediaChunk;

/// Summary of an export written to disk
#[derive(Debug, Clone)]
pub struct ExportInfo {
    pub path: std::path::PathBuf,
    pub bytes: u64,
    pub chunk_count: usize,
}

/// In-memory chunk recorder
///
/// Collects the encoded chunks of one take, in emission order. Zero-length
/// chunks are dropped. The sequence is frozen when the session stops and
/// cleared on the next start, before any new chunk arrives.
pub struct ChunkRecorder {
    chunks: Mutex<Vec<MediaChunk>>,
}

impl ChunkRecorder {
    pub fn new() -> Self {
        Self {
            chunks: Mutex::new(Vec::new()),
        }
    }

    /// Drop all chunks from the previous take
    pub async fn clear(&self) {
        let mut chunks = self.chunks.lock().await;
        if !chunks.is_empty() {
            debug!("Clearing {} chunks from previous take", chunks.len());
        }
        chunks.clear();
    }

    /// Append a chunk in emission order.
    ///
    /// Returns false when the chunk is empty and was dropped.
    pub async fn append(&self, chunk: MediaChunk) -> bool {
        if chunk.data.is_empty() {
            debug!("Dropping empty chunk (sequence {})", chunk.sequence);
            return false;
        }

        let mut chunks = self.chunks.lock().await;
        chunks.push(chunk);
        true
    }

    /// Number of chunks recorded so far
    pub async fn chunk_count(&self) -> usize {
        self.chunks.lock().await.len()
    }

    /// Total recorded bytes
    pub async fn recorded_bytes(&self) -> u64 {
        let chunks = self.chunks.lock().await;
        chunks.iter().map(|c| c.data.len() as u64).sum()
    }

    /// Concatenate all chunks into one exportable blob
    pub async fn export(&self) -> Vec<u8> {
        let chunks = self.chunks.lock().await;
        let total: usize = chunks.iter().map(|c| c.data.len()).sum();

        let mut blob = Vec::with_capacity(total);
        for chunk in chunks.iter() {
            blob.extend_from_slice(&chunk.data);
        }
        blob
    }

    /// Write the concatenated take to disk
    pub async fn export_to(&self, path: impl AsRef<Path>) -> Result<ExportInfo> {
        let path = path.as_ref();
        let chunk_count = self.chunk_count().await;
        let blob = self.export().await;

        tokio::fs::write(path, &blob)
            .await
            .with_context(|| format!("Failed to write recording to {}", path.display()))?;

        info!(
            "Exported recording: {} ({} chunks, {} bytes)",
            path.display(),
            chunk_count,
            blob.len()
        );

        Ok(ExportInfo {
            path: path.to_path_buf(),
            bytes: blob.len() as u64,
            chunk_count,
        })
    }
}

impl Default for ChunkRecorder {
    fn default() -> Self {
        Self::new()
    }
}
