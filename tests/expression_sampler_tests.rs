// Tests for the expression sampler and chart payload
//
// The sampler must retain the previous sample on empty detections (no
// flicker to empty), use only the first face, swallow per-tick failures,
// reject out-of-range probabilities and stop when the stream goes down.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use interview_studio::capture::VideoFrame;
use interview_studio::expression::{
    Emotion, EmotionChart, EmotionSample, ExpressionSampler, FaceDetection,
    MockExpressionService,
};
use tokio::sync::watch;

fn frame() -> VideoFrame {
    VideoFrame {
        data: vec![0xFF, 0xD8, 0xFF],
        width: 640,
        height: 480,
        timestamp_ms: 0,
    }
}

fn detection(happy: f32, neutral: f32) -> FaceDetection {
    let mut probabilities = BTreeMap::new();
    probabilities.insert(Emotion::Happy, happy);
    probabilities.insert(Emotion::Neutral, neutral);
    FaceDetection {
        expressions: EmotionSample::new(probabilities),
    }
}

/// Run the sampler against a scripted service and collect what it publishes.
async fn run_sampler(
    service: MockExpressionService,
    frame: Option<VideoFrame>,
    ticks: u64,
) -> Vec<EmotionSample> {
    let service = Arc::new(service);
    let (_frame_tx, frame_rx) = watch::channel(frame);
    let (live_tx, live_rx) = watch::channel(true);

    let published = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&published);

    let interval = Duration::from_millis(10);
    let task = ExpressionSampler::spawn(service, frame_rx, live_rx, interval, move |sample| {
        sink.lock().unwrap().push(sample);
    });

    tokio::time::sleep(interval * (ticks as u32 + 2)).await;
    live_tx.send_replace(false);
    let _ = tokio::time::timeout(Duration::from_secs(1), task).await;

    let samples = published.lock().unwrap().clone();
    samples
}

#[tokio::test]
async fn test_sampler_publishes_first_face_only() {
    let service = MockExpressionService::new()
        .with_detections(vec![detection(0.8, 0.1), detection(0.1, 0.9)]);

    let samples = run_sampler(service, Some(frame()), 1).await;

    assert!(!samples.is_empty());
    assert_eq!(samples[0].probabilities[&Emotion::Happy], 0.8);
}

#[tokio::test]
async fn test_empty_detection_retains_previous_sample() {
    // First tick sees a face, every following tick sees none: exactly one
    // sample is ever published and it is never replaced by an empty one
    let service = MockExpressionService::new()
        .with_detections(vec![detection(0.7, 0.2)])
        .with_detections(vec![]);

    let samples = run_sampler(service, Some(frame()), 5).await;

    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].probabilities[&Emotion::Happy], 0.7);
}

#[tokio::test]
async fn test_failed_tick_does_not_stop_sampling() {
    let service = MockExpressionService::new()
        .with_failure("inference backend hiccup")
        .with_detections(vec![detection(0.6, 0.3)]);

    let samples = run_sampler(service, Some(frame()), 5).await;

    assert!(
        !samples.is_empty(),
        "sampling must continue after a failed tick"
    );
    assert_eq!(samples[0].probabilities[&Emotion::Happy], 0.6);
}

#[tokio::test]
async fn test_out_of_range_probabilities_are_never_published() {
    let service = MockExpressionService::new()
        .with_detections(vec![detection(1.5, -0.2)]);

    let samples = run_sampler(service, Some(frame()), 5).await;

    assert!(samples.is_empty());
}

#[tokio::test]
async fn test_nan_probabilities_are_never_published() {
    let service = MockExpressionService::new()
        .with_detections(vec![detection(f32::NAN, 0.5)]);

    let samples = run_sampler(service, Some(frame()), 5).await;

    assert!(samples.is_empty());
}

#[tokio::test]
async fn test_no_frame_means_no_detection_calls() {
    let service = MockExpressionService::new().with_detections(vec![detection(0.9, 0.1)]);
    let service_ref = Arc::new(service);

    let (_frame_tx, frame_rx) = watch::channel(None);
    let (live_tx, live_rx) = watch::channel(true);

    let task = ExpressionSampler::spawn(
        service_ref.clone(),
        frame_rx,
        live_rx,
        Duration::from_millis(10),
        |_| {},
    );

    tokio::time::sleep(Duration::from_millis(60)).await;
    live_tx.send_replace(false);
    let _ = tokio::time::timeout(Duration::from_secs(1), task).await;

    assert_eq!(service_ref.call_count(), 0);
}

#[tokio::test]
async fn test_sampler_stops_when_stream_goes_down() {
    let service = MockExpressionService::new().with_detections(vec![detection(0.5, 0.5)]);
    let service = Arc::new(service);

    let (_frame_tx, frame_rx) = watch::channel(Some(frame()));
    let (live_tx, live_rx) = watch::channel(true);

    let task = ExpressionSampler::spawn(
        service,
        frame_rx,
        live_rx,
        Duration::from_millis(10),
        |_| {},
    );

    live_tx.send_replace(false);

    let joined = tokio::time::timeout(Duration::from_secs(1), task).await;
    assert!(joined.is_ok(), "the sampler must exit once the stream is down");
}

// ── Chart payload ────────────────────────────────────────────────────────

#[test]
fn test_chart_labels_and_two_decimal_values() {
    let mut probabilities = BTreeMap::new();
    probabilities.insert(Emotion::Happy, 0.12345f32);
    probabilities.insert(Emotion::Sad, 0.5f32);
    let sample = EmotionSample::new(probabilities);

    let chart = EmotionChart::from_sample(Some(&sample));

    assert_eq!(chart.slices.len(), 2);
    let happy = chart
        .slices
        .iter()
        .find(|s| s.label.starts_with("Happy"))
        .unwrap();
    assert_eq!(happy.label, "Happy: 12.35%");
    assert!((happy.value - 12.35).abs() < 1e-9);

    let sad = chart.slices.iter().find(|s| s.label.starts_with("Sad")).unwrap();
    assert_eq!(sad.label, "Sad: 50.00%");
    assert!((sad.value - 50.0).abs() < 1e-9);
}

#[test]
fn test_chart_without_a_sample_is_empty() {
    let chart = EmotionChart::from_sample(None);
    assert!(chart.slices.is_empty());
}

#[test]
fn test_sample_validation() {
    let valid = detection(0.3, 0.7).expressions;
    assert!(valid.is_valid());

    let empty = EmotionSample::new(BTreeMap::new());
    assert!(!empty.is_valid());
}
