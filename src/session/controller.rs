use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::state::{PlaybackState, SessionEvent, SessionState};
use super::stats::{SessionStats, TranscriptSegment};
use crate::analysis;
use crate::capture::{AudioTap, AudioTapSource, CaptureBackend, MediaChunk, MediaStream};
use crate::error::SessionError;
use crate::expression::{ExpressionSampler, ExpressionService};
use crate::recognition::{partition_event, RecognitionEventMessage, RecognitionService};
use crate::recording::{ChunkRecorder, ExportInfo};

/// Apply one event to the shared state snapshot.
fn apply_event(state: &watch::Sender<SessionState>, event: SessionEvent) {
    state.send_modify(|s| *s = s.apply(&event));
}

/// A recording session
///
/// Owns the session state machine and wires the capture stream, recorder,
/// recognition subscription, volume monitor, expression sampler and elapsed
/// timer together. The recording subsystems are armed and disarmed as one
/// unit through a shared watch flag; every spawned loop checks the flag
/// before applying work, so stopping is deterministic and late results are
/// discarded instead of landing on stale state.
pub struct SessionController {
    config: SessionConfig,

    /// When the session was created
    started_at: chrono::DateTime<chrono::Utc>,

    /// The single state snapshot; all mutation goes through `apply_event`
    state: Arc<watch::Sender<SessionState>>,

    /// True while a take records; gates recorder, timer, volume, recognition
    armed: Arc<watch::Sender<bool>>,

    /// True while the capture stream is live; gates pump and sampler
    live: watch::Sender<bool>,

    /// Capture backend; acquired on the first successful start
    backend: Mutex<Box<dyn CaptureBackend>>,

    /// External recognition service, if configured
    recognition: Option<Arc<dyn RecognitionService>>,

    /// External expression service, if configured
    expression: Option<Arc<dyn ExpressionService>>,

    /// Volume tap opener; a fresh tap is acquired per take
    tap_source: Option<Arc<dyn AudioTapSource>>,

    /// Recorded chunks of the current take
    recorder: Arc<ChunkRecorder>,

    /// Tasks tied to one take (timer, volume monitor, recognition listener)
    take_tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Tasks tied to the capture stream (chunk pump, expression sampler)
    capture_tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        backend: Box<dyn CaptureBackend>,
        recognition: Option<Arc<dyn RecognitionService>>,
        expression: Option<Arc<dyn ExpressionService>>,
        tap_source: Option<Arc<dyn AudioTapSource>>,
    ) -> Self {
        info!("Creating session: {}", config.session_id);

        let (state, _) = watch::channel(SessionState::new());
        let (armed, _) = watch::channel(false);
        let (live, _) = watch::channel(false);

        Self {
            config,
            started_at: Utc::now(),
            state: Arc::new(state),
            armed: Arc::new(armed),
            live,
            backend: Mutex::new(backend),
            recognition,
            expression,
            tap_source,
            recorder: Arc::new(ChunkRecorder::new()),
            take_tasks: Mutex::new(Vec::new()),
            capture_tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Watch the state snapshot
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Current state snapshot
    pub fn state_snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Start recording a take.
    ///
    /// The first start acquires the capture stream; acquisition failure is
    /// reported and leaves the session idle with zero elapsed time. A
    /// successful start clears the previous take's chunks, resets the timer
    /// and arms recorder, volume monitor, recognition and timer together.
    pub async fn start_recording(&self) -> Result<(), SessionError> {
        if self.state.borrow().is_recording() {
            warn!("Recording already started");
            return Ok(());
        }

        info!("Starting recording session: {}", self.config.session_id);

        // Acquire on first start; the stream then stays live across
        // stop/start so the expression sampler keeps running between takes.
        let mut acquired: Option<MediaStream> = None;
        if !*self.live.borrow() {
            let stream = {
                let mut backend = self.backend.lock().await;
                backend
                    .start()
                    .await
                    .map_err(|e| SessionError::Acquisition {
                        message: e.to_string(),
                    })?
            };
            self.live.send_replace(true);
            apply_event(&self.state, SessionEvent::CaptureAcquired);
            acquired = Some(stream);
        }

        // Reset the take: prior chunks are gone before any new chunk arrives
        self.recorder.clear().await;
        apply_event(&self.state, SessionEvent::RecordingStarted);
        self.armed.send_replace(true);

        // Pump and sampler live as long as the capture stream. They are
        // spawned after arming so the first chunks of this take land armed.
        if let Some(MediaStream { chunks, frames }) = acquired {
            let mut capture_tasks = self.capture_tasks.lock().await;
            capture_tasks.push(self.spawn_chunk_pump(chunks));

            if let Some(expression) = &self.expression {
                let state = Arc::clone(&self.state);
                capture_tasks.push(ExpressionSampler::spawn(
                    Arc::clone(expression),
                    frames,
                    self.live.subscribe(),
                    self.config.sample_interval,
                    move |sample| {
                        apply_event(&state, SessionEvent::EmotionSampled { sample });
                    },
                ));
            } else {
                debug!("No expression service configured; sampling disabled");
            }
        }

        let mut take_tasks = self.take_tasks.lock().await;
        take_tasks.push(self.spawn_timer());

        // The volume tap is its own microphone acquisition; denial disables
        // monitoring for this take without touching the rest of the session
        match &self.tap_source {
            Some(source) => match source.open() {
                Ok(tap) => take_tasks.push(self.spawn_volume_monitor(tap)),
                Err(e) => warn!("Volume tap acquisition failed, monitoring disabled: {}", e),
            },
            None => debug!("No audio tap configured; volume monitoring disabled"),
        }

        match &self.recognition {
            Some(service) => {
                match service
                    .start(&self.config.session_id, &self.config.recognition)
                    .await
                {
                    Ok(events) => {
                        take_tasks.push(self.spawn_recognition_listener(events, Arc::clone(service)))
                    }
                    Err(e) => {
                        warn!("Recognition unavailable, speech features disabled: {}", e);
                        apply_event(
                            &self.state,
                            SessionEvent::SpeechDisabled {
                                message: format!("Speech recognition unavailable: {}", e),
                            },
                        );
                    }
                }
            }
            None => {
                apply_event(
                    &self.state,
                    SessionEvent::SpeechDisabled {
                        message: "Speech recognition not configured".to_string(),
                    },
                );
            }
        }

        info!("Recording session started successfully");
        Ok(())
    }

    /// Stop the current take.
    ///
    /// Disarms all recording subsystems together and freezes the chunk
    /// sequence for export.
    pub async fn stop_recording(&self) -> SessionStats {
        if self.state.borrow().is_recording() {
            info!("Stopping recording session: {}", self.config.session_id);

            self.armed.send_replace(false);
            apply_event(&self.state, SessionEvent::RecordingStopped);

            if let Some(service) = &self.recognition {
                if let Err(e) = service.stop(&self.config.session_id).await {
                    warn!("Failed to stop recognition run: {}", e);
                }
            }

            info!("Recording session stopped successfully");
        } else {
            warn!("Recording not active");
        }

        self.drain_take_tasks().await;
        self.get_stats()
    }

    /// Toggle play/pause on the recorded take
    pub fn toggle_playback(&self) -> PlaybackState {
        apply_event(&self.state, SessionEvent::PlaybackToggled);
        self.state.borrow().playback
    }

    /// Get current session statistics
    pub fn get_stats(&self) -> SessionStats {
        let state = self.state.borrow();

        SessionStats {
            session_id: self.config.session_id.clone(),
            is_recording: state.is_recording(),
            started_at: self.started_at,
            elapsed_seconds: state.elapsed_seconds,
            chunks_count: state.chunk_count,
            recorded_bytes: state.recorded_bytes,
            transcript_segments_count: state.transcript.len(),
            current_line: state.current_line.clone(),
            speech_enabled: state.speech_enabled,
            report: state.report.clone(),
            last_error: state.last_error.clone(),
        }
    }

    /// Get the accumulated transcript
    pub fn get_transcript(&self) -> Vec<TranscriptSegment> {
        self.state.borrow().transcript.clone()
    }

    /// Cumulative transcript as plain text
    pub fn transcript_text(&self) -> String {
        let state = self.state.borrow();
        state
            .transcript
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Recorded take as one concatenated blob
    pub async fn export_recording(&self) -> Vec<u8> {
        self.recorder.export().await
    }

    /// Write the recorded take to disk
    pub async fn export_recording_to(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<ExportInfo, SessionError> {
        self.recorder
            .export_to(path)
            .await
            .map_err(|e| SessionError::Export {
                message: e.to_string(),
            })
    }

    /// Tear the session down: stop the take, release the capture stream and
    /// join every task.
    pub async fn shutdown(&self) {
        info!("Shutting down session: {}", self.config.session_id);

        if self.state.borrow().is_recording() {
            let _ = self.stop_recording().await;
        } else {
            self.drain_take_tasks().await;
        }

        self.live.send_replace(false);

        {
            let mut backend = self.backend.lock().await;
            if backend.is_capturing() {
                if let Err(e) = backend.stop().await {
                    error!("Failed to stop capture backend: {}", e);
                }
            }
        }

        let tasks: Vec<JoinHandle<()>> = {
            let mut capture_tasks = self.capture_tasks.lock().await;
            capture_tasks.drain(..).collect()
        };
        for task in tasks {
            if let Err(e) = task.await {
                error!("Capture task panicked: {}", e);
            }
        }

        info!("Session shut down: {}", self.config.session_id);
    }

    /// Join the tasks of the finished take
    async fn drain_take_tasks(&self) {
        let tasks: Vec<JoinHandle<()>> = {
            let mut take_tasks = self.take_tasks.lock().await;
            take_tasks.drain(..).collect()
        };
        for task in tasks {
            if let Err(e) = task.await {
                error!("Session task panicked: {}", e);
            }
        }
    }

    /// Forward capture chunks into the recorder while armed.
    ///
    /// Lives as long as the capture stream; chunks arriving while disarmed
    /// (before a take, between takes, after a stop raced an emission) are
    /// discarded.
    fn spawn_chunk_pump(&self, mut chunks: mpsc::Receiver<MediaChunk>) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let recorder = Arc::clone(&self.recorder);
        let armed = self.armed.subscribe();
        let mut live = self.live.subscribe();

        tokio::spawn(async move {
            debug!("Media chunk pump started");

            loop {
                tokio::select! {
                    maybe = chunks.recv() => {
                        let Some(chunk) = maybe else {
                            debug!("Capture stream ended");
                            break;
                        };
                        if !*armed.borrow() {
                            continue;
                        }
                        let bytes = chunk.data.len();
                        if recorder.append(chunk).await {
                            apply_event(&state, SessionEvent::RecorderChunk { bytes });
                        }
                    }
                    _ = live.changed() => {
                        if !*live.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("Media chunk pump stopped");
        })
    }

    /// Count elapsed whole seconds while the take records.
    fn spawn_timer(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let mut armed = self.armed.subscribe();
        let interval = self.config.timer_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // Consume the immediate first tick; the first second elapses later
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !*armed.borrow() {
                            break;
                        }
                        apply_event(&state, SessionEvent::TimerTick);
                    }
                    _ = armed.changed() => {
                        if !*armed.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("Timer stopped");
        })
    }

    /// Poll the volume tap and republish the band on every poll.
    fn spawn_volume_monitor(&self, tap: Box<dyn AudioTap>) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let mut armed = self.armed.subscribe();
        let interval = self.config.volume_poll_interval;

        tokio::spawn(async move {
            debug!("Volume monitor started");
            let mut tap = tap;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !*armed.borrow() {
                            break;
                        }
                        match tap.read_bins() {
                            Ok(bins) => {
                                let band = analysis::classify_bins(&bins);
                                apply_event(&state, SessionEvent::VolumeSample { band });
                            }
                            Err(e) => {
                                warn!("Volume tap read failed, monitoring stopped: {}", e);
                                break;
                            }
                        }
                    }
                    _ = armed.changed() => {
                        if !*armed.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("Volume monitor stopped");
        })
    }

    /// Consume recognition events for the running take.
    ///
    /// A terminal error or a natural end while recording disarms the whole
    /// take (joint stop); recognition is never restarted automatically.
    fn spawn_recognition_listener(
        &self,
        mut events: mpsc::Receiver<RecognitionEventMessage>,
        service: Arc<dyn RecognitionService>,
    ) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let armed = Arc::clone(&self.armed);
        let session_id = self.config.session_id.clone();

        tokio::spawn(async move {
            debug!("Recognition listener started");
            let mut armed_rx = armed.subscribe();

            loop {
                tokio::select! {
                    maybe = events.recv() => {
                        let Some(event) = maybe else {
                            debug!("Recognition event stream closed");
                            break;
                        };
                        // An event landing after stop is discarded, never
                        // applied to the frozen take
                        if !*armed.borrow() {
                            break;
                        }

                        match event {
                            RecognitionEventMessage::Result { result_index, results, .. } => {
                                let partition = partition_event(result_index, &results);
                                let finalized: Vec<TranscriptSegment> = partition
                                    .finalized
                                    .into_iter()
                                    .map(|f| TranscriptSegment {
                                        text: f.text,
                                        is_final: true,
                                        timestamp: Utc::now(),
                                        confidence: f.confidence,
                                    })
                                    .collect();
                                apply_event(&state, SessionEvent::RecognitionResult {
                                    interim_line: partition.interim_line,
                                    finalized,
                                });
                            }
                            RecognitionEventMessage::Error { message, .. } => {
                                error!("Speech recognition error: {}", message);
                                apply_event(&state, SessionEvent::RecognitionError {
                                    message: format!("Speech recognition error: {}", message),
                                });
                                armed.send_replace(false);
                                if let Err(e) = service.stop(&session_id).await {
                                    warn!("Failed to stop recognition run: {}", e);
                                }
                                break;
                            }
                            RecognitionEventMessage::End { .. } => {
                                warn!("Speech recognition ended while recording");
                                apply_event(&state, SessionEvent::RecognitionEnded);
                                armed.send_replace(false);
                                break;
                            }
                        }
                    }
                    _ = armed_rx.changed() => {
                        if !*armed.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("Recognition listener stopped");
        })
    }
}
