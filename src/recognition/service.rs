use anyhow::{Context, Result};
use futures::stream::StreamExt;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::messages::{
    RecognitionConfig, RecognitionEventMessage, StartRecognitionMessage, StopRecognitionMessage,
};

/// External speech-recognition service
///
/// The engine itself is a black box living out of process; this trait covers
/// starting a run, receiving its events and ending the run. Events stop
/// flowing when the returned receiver is dropped.
#[async_trait::async_trait]
pub trait RecognitionService: Send + Sync {
    /// Begin a recognition run for the session.
    ///
    /// Returns a channel receiver that will receive recognition events.
    async fn start(
        &self,
        session_id: &str,
        config: &RecognitionConfig,
    ) -> Result<mpsc::Receiver<RecognitionEventMessage>>;

    /// End the recognition run and release the subscription.
    async fn stop(&self, session_id: &str) -> Result<()>;
}

/// NATS-backed recognition service client
///
/// Publishes start/stop control messages and forwards the session's event
/// stream from the shared event subject.
pub struct NatsRecognitionService {
    client: async_nats::Client,
}

impl NatsRecognitionService {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }

    fn start_subject(session_id: &str) -> String {
        format!("asr.session.start.{}", session_id)
    }

    fn stop_subject(session_id: &str) -> String {
        format!("asr.session.stop.{}", session_id)
    }
}

#[async_trait::async_trait]
impl RecognitionService for NatsRecognitionService {
    async fn start(
        &self,
        session_id: &str,
        config: &RecognitionConfig,
    ) -> Result<mpsc::Receiver<RecognitionEventMessage>> {
        // Subscribe before announcing the session so no event is missed.
        // Events for all sessions share one subject; we filter by payload.
        let mut subscriber = self
            .client
            .subscribe("asr.events.>")
            .await
            .context("Failed to subscribe to recognition events")?;

        let message = StartRecognitionMessage {
            session_id: session_id.to_string(),
            config: config.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(Self::start_subject(session_id), payload.into())
            .await
            .context("Failed to publish recognition start")?;

        info!("Recognition run started for session: {}", session_id);

        let (event_tx, event_rx) = mpsc::channel(100);
        let session_id = session_id.to_string();

        tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<RecognitionEventMessage>(&msg.payload) {
                    Ok(event) => {
                        if event.session_id() != session_id {
                            continue;
                        }
                        if event_tx.send(event).await.is_err() {
                            // Receiver dropped: the run is over
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse recognition event: {}", e);
                    }
                }
            }
        });

        Ok(event_rx)
    }

    async fn stop(&self, session_id: &str) -> Result<()> {
        let message = StopRecognitionMessage {
            session_id: session_id.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(Self::stop_subject(session_id), payload.into())
            .await
            .context("Failed to publish recognition stop")?;

        info!("Recognition run stopped for session: {}", session_id);
        Ok(())
    }
}

/// Mock recognition service for testing
///
/// Replays a scripted sequence of events after start.
pub struct MockRecognitionService {
    events: Vec<RecognitionEventMessage>,
    fail_start: bool,
    started: std::sync::atomic::AtomicUsize,
    stopped: std::sync::atomic::AtomicUsize,
}

impl MockRecognitionService {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            fail_start: false,
            started: std::sync::atomic::AtomicUsize::new(0),
            stopped: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Configure the events replayed after start
    pub fn with_events(mut self, events: Vec<RecognitionEventMessage>) -> Self {
        self.events = events;
        self
    }

    /// Configure the service to fail on start (transport unavailable)
    pub fn with_start_failure(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Number of runs started so far
    pub fn runs_started(&self) -> usize {
        self.started.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of runs stopped so far
    pub fn runs_stopped(&self) -> usize {
        self.stopped.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Default for MockRecognitionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RecognitionService for MockRecognitionService {
    async fn start(
        &self,
        _session_id: &str,
        _config: &RecognitionConfig,
    ) -> Result<mpsc::Receiver<RecognitionEventMessage>> {
        if self.fail_start {
            anyhow::bail!("mock recognition transport unavailable");
        }

        self.started
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let (event_tx, event_rx) = mpsc::channel(self.events.len().max(1));
        let events = self.events.clone();
        tokio::spawn(async move {
            for event in events {
                if event_tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(event_rx)
    }

    async fn stop(&self, _session_id: &str) -> Result<()> {
        self.stopped
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
