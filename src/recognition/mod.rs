//! External speech-recognition service integration
//!
//! The recognition engine runs out of process; this module carries the wire
//! messages, the service trait with its NATS implementation, and the
//! partitioning of result events into interim and finalized text.

pub mod listener;
pub mod messages;
pub mod service;

pub use listener::{partition_event, EventPartition, FinalizedResult};
pub use messages::{
    AlternativeMessage, RecognitionConfig, RecognitionEventMessage, ResultMessage,
    StartRecognitionMessage, StopRecognitionMessage,
};
pub use service::{MockRecognitionService, NatsRecognitionService, RecognitionService};
