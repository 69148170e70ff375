use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::recognition::RecognitionConfig;

/// Configuration for a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g. "interview-2026-08-06-practice")
    pub session_id: String,

    /// Recognition engine configuration sent on each recording start
    pub recognition: RecognitionConfig,

    /// Elapsed-time tick interval (one second; shortened only in tests)
    #[serde(with = "duration_millis")]
    pub timer_interval: Duration,

    /// Expression sampling interval
    #[serde(with = "duration_millis")]
    pub sample_interval: Duration,

    /// Volume tap poll interval (the animation-frame analogue)
    #[serde(with = "duration_millis")]
    pub volume_poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("interview-{}", uuid::Uuid::new_v4()),
            recognition: RecognitionConfig::default(),
            timer_interval: Duration::from_secs(1),
            sample_interval: Duration::from_secs(1), // 1 sample/second
            volume_poll_interval: Duration::from_millis(16), // ~60Hz
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
