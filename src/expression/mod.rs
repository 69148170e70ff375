//! Face-expression sampling
//!
//! The expression model runs out of process; this module carries the emotion
//! types, the service trait with its NATS request/reply implementation, the
//! periodic sampler and the chart payload derived from the latest sample.

pub mod chart;
pub mod sample;
pub mod sampler;
pub mod service;

pub use chart::{ChartSlice, EmotionChart};
pub use sample::{Emotion, EmotionSample};
pub use sampler::ExpressionSampler;
pub use service::{
    DetectRequestMessage, DetectionMessage, ExpressionService, FaceDetection,
    MockExpressionService, NatsExpressionService,
};
