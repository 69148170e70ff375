use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::sample::{Emotion, EmotionSample};
use crate::capture::VideoFrame;

/// One detected face with its expression distribution
#[derive(Debug, Clone)]
pub struct FaceDetection {
    pub expressions: EmotionSample,
}

/// External face-expression service
///
/// Input is one video frame; output is the ordered detection list. An empty
/// list means no face was visible. The model and its runtime are a black box.
#[async_trait::async_trait]
pub trait ExpressionService: Send + Sync {
    async fn detect(&self, frame: &VideoFrame) -> Result<Vec<FaceDetection>>;
}

/// Frame payload sent to the expression service
#[derive(Debug, Serialize, Deserialize)]
pub struct DetectRequestMessage {
    /// Base64-encoded image bytes
    pub frame: String,
    pub width: u32,
    pub height: u32,
    pub timestamp_ms: u64,
}

/// One detection in the service reply
#[derive(Debug, Serialize, Deserialize)]
pub struct DetectionMessage {
    pub expressions: BTreeMap<Emotion, f32>,
}

/// NATS request/reply expression service client
pub struct NatsExpressionService {
    client: async_nats::Client,
    subject: String,
}

impl NatsExpressionService {
    pub fn new(client: async_nats::Client) -> Self {
        Self {
            client,
            subject: "vision.expressions.detect".to_string(),
        }
    }

    /// Override the detection subject
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }
}

#[async_trait::async_trait]
impl ExpressionService for NatsExpressionService {
    async fn detect(&self, frame: &VideoFrame) -> Result<Vec<FaceDetection>> {
        let request = DetectRequestMessage {
            frame: base64::engine::general_purpose::STANDARD.encode(&frame.data),
            width: frame.width,
            height: frame.height,
            timestamp_ms: frame.timestamp_ms,
        };
        let payload = serde_json::to_vec(&request)?;

        let reply = self
            .client
            .request(self.subject.clone(), payload.into())
            .await
            .context("Expression detection request failed")?;

        let detections: Vec<DetectionMessage> = serde_json::from_slice(&reply.payload)
            .context("Failed to parse expression detections")?;

        Ok(detections
            .into_iter()
            .map(|d| FaceDetection {
                expressions: EmotionSample::new(d.expressions),
            })
            .collect())
    }
}

/// Mock expression service for testing
///
/// Replays a scripted sequence of detection outcomes, one per call; the last
/// outcome repeats once the script is exhausted.
pub struct MockExpressionService {
    outcomes: std::sync::Mutex<Vec<Result<Vec<FaceDetection>, String>>>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockExpressionService {
    pub fn new() -> Self {
        Self {
            outcomes: std::sync::Mutex::new(Vec::new()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Append a successful detection outcome
    pub fn with_detections(self, detections: Vec<FaceDetection>) -> Self {
        self.outcomes
            .lock()
            .expect("mock outcomes poisoned")
            .push(Ok(detections));
        self
    }

    /// Append a failing tick
    pub fn with_failure(self, message: &str) -> Self {
        self.outcomes
            .lock()
            .expect("mock outcomes poisoned")
            .push(Err(message.to_string()));
        self
    }

    /// Number of detect calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Default for MockExpressionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ExpressionService for MockExpressionService {
    async fn detect(&self, _frame: &VideoFrame) -> Result<Vec<FaceDetection>> {
        let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let outcomes = self.outcomes.lock().expect("mock outcomes poisoned");

        if outcomes.is_empty() {
            return Ok(Vec::new());
        }

        let outcome = outcomes.get(call).unwrap_or_else(|| {
            outcomes.last().expect("checked non-empty")
        });

        match outcome {
            Ok(detections) => Ok(detections.clone()),
            Err(message) => anyhow::bail!("{}", message.clone()),
        }
    }
}
