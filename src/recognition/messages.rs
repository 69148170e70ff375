use serde::{Deserialize, Serialize};

/// Recognition engine configuration, sent with the start control message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Keep recognizing across pauses instead of stopping at the first result
    pub continuous: bool,
    /// Emit interim (unsettled) results between finals
    pub interim_results: bool,
    /// BCP-47 language tag
    pub language: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: true,
            language: "en-US".to_string(),
        }
    }
}

/// Control message published to start a recognition run
#[derive(Debug, Serialize, Deserialize)]
pub struct StartRecognitionMessage {
    pub session_id: String,
    pub config: RecognitionConfig,
    pub timestamp: String, // RFC3339 timestamp
}

/// Control message published to end a recognition run
#[derive(Debug, Serialize, Deserialize)]
pub struct StopRecognitionMessage {
    pub session_id: String,
    pub timestamp: String,
}

/// One alternative transcription of a result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeMessage {
    pub transcript: String,
    pub confidence: Option<f32>,
}

/// One result in an event: a list of alternatives plus the finality flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMessage {
    pub alternatives: Vec<AlternativeMessage>,
    #[serde(rename = "final")]
    pub is_final: bool,
}

/// Event received from the recognition service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecognitionEventMessage {
    /// New or updated results from the cursor index onward
    Result {
        session_id: String,
        /// Index of the first result that changed in this event
        result_index: usize,
        /// The full result list; entries before `result_index` are unchanged
        results: Vec<ResultMessage>,
    },
    /// Terminal service error; recognition has stopped and will not restart
    Error { session_id: String, message: String },
    /// Natural end of recognition (e.g. silence timeout)
    End { session_id: String },
}

impl RecognitionEventMessage {
    /// Session this event belongs to
    pub fn session_id(&self) -> &str {
        match self {
            Self::Result { session_id, .. } => session_id,
            Self::Error { session_id, .. } => session_id,
            Self::End { session_id } => session_id,
        }
    }
}
