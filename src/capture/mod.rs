pub mod backend;
pub mod file;
pub mod tap;

#[cfg(feature = "microphone")]
pub mod mic;

pub use backend::{
    CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource, MediaChunk, MediaStream,
    MockCaptureBackend, VideoFrame,
};
pub use file::FileCaptureBackend;
pub use tap::{
    AudioTap, AudioTapSource, MockTap, MockTapSource, WavFileTap, WavTapSource, FREQUENCY_BINS,
};

#[cfg(feature = "microphone")]
pub use mic::{MicrophoneTap, MicrophoneTapSource};
