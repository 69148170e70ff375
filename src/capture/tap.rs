use anyhow::{Context, Result};
use hound::WavReader;
use std::path::{Path, PathBuf};
use tracing::info;

/// Number of frequency bins per snapshot (half of a 256-point FFT window)
pub const FREQUENCY_BINS: usize = 128;

/// Audio analysis tap
///
/// A tap is a second, independent microphone acquisition used only for volume
/// analysis; it never feeds the recorder. Each read returns one
/// frequency-domain snapshot with per-bin magnitudes scaled to 0-255.
pub trait AudioTap: Send {
    /// Read the current frequency-bin magnitudes.
    fn read_bins(&mut self) -> Result<Vec<u8>>;
}

/// Opens a fresh tap for each recording run.
///
/// Acquisition can fail independently of the main capture stream (the tap is
/// its own microphone grab), so opening is fallible and retried on the next
/// recording start.
pub trait AudioTapSource: Send + Sync {
    fn open(&self) -> Result<Box<dyn AudioTap>>;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// WAV-file-backed tap
///
/// Loads a WAV fixture and serves successive sample windows as magnitude
/// snapshots, looping at the end so long-running monitors stay fed.
pub struct WavFileTap {
    samples: Vec<i16>,
    cursor: usize,
}

impl WavFileTap {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio tap fixture: {}", path.display());

        let reader = WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;

        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        if samples.is_empty() {
            anyhow::bail!("WAV file contains no samples: {}", path.display());
        }

        Ok(Self { samples, cursor: 0 })
    }
}

impl AudioTap for WavFileTap {
    fn read_bins(&mut self) -> Result<Vec<u8>> {
        let mut bins = Vec::with_capacity(FREQUENCY_BINS);

        for _ in 0..FREQUENCY_BINS {
            let sample = self.samples[self.cursor];
            // i16 amplitude to the analyser's 0-255 magnitude scale
            bins.push((sample.unsigned_abs() >> 7).min(255) as u8);
            self.cursor = (self.cursor + 1) % self.samples.len();
        }

        Ok(bins)
    }
}

/// Tap source backed by a WAV fixture on disk
pub struct WavTapSource {
    path: PathBuf,
}

impl WavTapSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl AudioTapSource for WavTapSource {
    fn open(&self) -> Result<Box<dyn AudioTap>> {
        Ok(Box::new(WavFileTap::open(&self.path)?))
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}

/// Mock tap for testing: serves a fixed bin snapshot forever
pub struct MockTap {
    bins: Vec<u8>,
    fail_read: bool,
}

impl MockTap {
    pub fn new(bins: Vec<u8>) -> Self {
        Self {
            bins,
            fail_read: false,
        }
    }

    /// Configure the mock to fail on read
    pub fn with_read_failure(mut self) -> Self {
        self.fail_read = true;
        self
    }
}

impl AudioTap for MockTap {
    fn read_bins(&mut self) -> Result<Vec<u8>> {
        if self.fail_read {
            anyhow::bail!("mock tap read failure");
        }
        Ok(self.bins.clone())
    }
}

/// Mock tap source for testing
pub struct MockTapSource {
    bins: Vec<u8>,
    fail_open: bool,
}

impl MockTapSource {
    pub fn new(bins: Vec<u8>) -> Self {
        Self {
            bins,
            fail_open: false,
        }
    }

    /// Configure the source to fail on open (acquisition denied)
    pub fn with_open_failure(mut self) -> Self {
        self.fail_open = true;
        self
    }
}

impl AudioTapSource for MockTapSource {
    fn open(&self) -> Result<Box<dyn AudioTap>> {
        if self.fail_open {
            anyhow::bail!("mock tap acquisition denied");
        }
        Ok(Box::new(MockTap::new(self.bins.clone())))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
