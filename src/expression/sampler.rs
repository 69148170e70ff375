use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::sample::EmotionSample;
use super::service::ExpressionService;
use crate::capture::VideoFrame;

/// Periodic expression sampler
///
/// Ticks at a fixed interval while the capture stream is live, independent of
/// the recording state. Each tick submits the latest video frame to the
/// expression service and publishes the resulting distribution:
///
/// - no frame yet, zero faces, an invalid distribution or a failed call all
///   leave the previously published sample in place,
/// - with multiple faces only the first is used,
/// - ticks are serialized (the next tick fires only after the current
///   detection returned), so calls never overlap,
/// - a result arriving after the live flag cleared is discarded, never
///   published against stale state.
pub struct ExpressionSampler;

impl ExpressionSampler {
    /// Spawn the sampling task.
    ///
    /// The task runs until `live` turns false and hands each accepted sample
    /// to `publish`.
    pub fn spawn(
        service: Arc<dyn ExpressionService>,
        frames: watch::Receiver<Option<VideoFrame>>,
        live: watch::Receiver<bool>,
        interval: Duration,
        publish: impl Fn(EmotionSample) + Send + Sync + 'static,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The immediate first tick would sample before any frame exists
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if !*live.borrow() {
                    break;
                }

                let frame = frames.borrow().clone();
                let Some(frame) = frame else {
                    continue;
                };

                let result = service.detect(&frame).await;

                // Stopped while the call was in flight: discard the result
                if !*live.borrow() {
                    break;
                }

                let detections = match result {
                    Ok(detections) => detections,
                    Err(e) => {
                        // One bad tick never halts sampling
                        debug!("Expression sampling tick failed: {}", e);
                        continue;
                    }
                };

                // No face: keep the previous sample, no flicker to empty
                let Some(first) = detections.into_iter().next() else {
                    continue;
                };

                if !first.expressions.is_valid() {
                    debug!("Discarding expression sample with out-of-range probabilities");
                    continue;
                }

                publish(first.expressions);
            }

            debug!("Expression sampler stopped");
        })
    }
}
