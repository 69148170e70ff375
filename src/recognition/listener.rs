//! Partitioning of recognition result events.
//!
//! Each event carries the full result list plus a cursor marking the first
//! result that changed. Everything from the cursor onward is split by the
//! finality flag: interim results are concatenated into the current display
//! line (replaced on every event), final results become settled transcript
//! segments in arrival order.

use super::messages::ResultMessage;

/// A settled result extracted from an event
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedResult {
    pub text: String,
    pub confidence: Option<f32>,
}

/// Outcome of partitioning one result event
#[derive(Debug, Clone, PartialEq)]
pub struct EventPartition {
    /// Concatenation of all interim results from the cursor onward
    pub interim_line: String,
    /// All final results from the cursor onward, in arrival order
    pub finalized: Vec<FinalizedResult>,
}

/// Partition the results of one event from its cursor onward.
///
/// Results before `result_index` were already delivered by earlier events and
/// are skipped. Only the first alternative of each result is used.
pub fn partition_event(result_index: usize, results: &[ResultMessage]) -> EventPartition {
    let mut interim_line = String::new();
    let mut finalized = Vec::new();

    for result in results.iter().skip(result_index) {
        let Some(alternative) = result.alternatives.first() else {
            continue;
        };

        if result.is_final {
            finalized.push(FinalizedResult {
                text: alternative.transcript.clone(),
                confidence: alternative.confidence,
            });
        } else {
            interim_line.push_str(&alternative.transcript);
        }
    }

    EventPartition {
        interim_line,
        finalized,
    }
}
