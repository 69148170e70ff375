// Tests for volume-band classification and the WAV-backed audio tap
//
// The classification boundaries come straight from the feedback rules:
// below 50 is Low, 50 through 150 inclusive is Good, above 150 is High.

use interview_studio::analysis::{classify, classify_bins, mean_magnitude, VolumeBand};
use interview_studio::capture::{AudioTap, WavFileTap, FREQUENCY_BINS};
use tempfile::TempDir;

#[test]
fn test_classification_boundaries() {
    assert_eq!(classify(49.0), VolumeBand::Low);
    assert_eq!(classify(50.0), VolumeBand::Good);
    assert_eq!(classify(150.0), VolumeBand::Good);
    assert_eq!(classify(151.0), VolumeBand::High);
}

#[test]
fn test_classification_extremes() {
    assert_eq!(classify(0.0), VolumeBand::Low);
    assert_eq!(classify(255.0), VolumeBand::High);
}

#[test]
fn test_mean_magnitude() {
    assert_eq!(mean_magnitude(&[100, 100, 100, 100]), 100.0);
    assert_eq!(mean_magnitude(&[0, 200]), 100.0);
}

#[test]
fn test_mean_magnitude_empty_snapshot() {
    assert_eq!(mean_magnitude(&[]), 0.0);
}

#[test]
fn test_classify_bins() {
    assert_eq!(classify_bins(&[40u8; 128]), VolumeBand::Low);
    assert_eq!(classify_bins(&[100u8; 128]), VolumeBand::Good);
    assert_eq!(classify_bins(&[200u8; 128]), VolumeBand::High);
}

#[test]
fn test_band_feedback_lines() {
    assert_eq!(VolumeBand::Low.feedback(), "The voice is too low. Speak up!");
    assert_eq!(VolumeBand::Good.feedback(), "Voice level is good.");
    assert_eq!(
        VolumeBand::High.feedback(),
        "The voice is too loud. Please lower your volume."
    );
}

/// Write a mono 16kHz WAV with a constant sample value.
fn write_wav(path: &std::path::Path, value: i16, count: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..count {
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_wav_tap_serves_magnitude_snapshots() {
    let temp_dir = TempDir::new().unwrap();
    let wav_path = temp_dir.path().join("tone.wav");

    // 12800 >> 7 = 100: squarely in the Good band
    write_wav(&wav_path, 12800, 1600);

    let mut tap = WavFileTap::open(&wav_path).unwrap();
    let bins = tap.read_bins().unwrap();

    assert_eq!(bins.len(), FREQUENCY_BINS);
    assert!(bins.iter().all(|&b| b == 100));
    assert_eq!(classify_bins(&bins), VolumeBand::Good);
}

#[test]
fn test_wav_tap_loops_at_end_of_file() {
    let temp_dir = TempDir::new().unwrap();
    let wav_path = temp_dir.path().join("short.wav");

    // Fewer samples than one snapshot: the tap must wrap around
    write_wav(&wav_path, 6400, 50);

    let mut tap = WavFileTap::open(&wav_path).unwrap();
    for _ in 0..10 {
        let bins = tap.read_bins().unwrap();
        assert_eq!(bins.len(), FREQUENCY_BINS);
        assert!(bins.iter().all(|&b| b == 50));
    }
}

#[test]
fn test_wav_tap_missing_file() {
    let result = WavFileTap::open("/nonexistent/missing.wav");
    assert!(result.is_err());
}

#[test]
fn test_wav_tap_rejects_empty_file() {
    let temp_dir = TempDir::new().unwrap();
    let wav_path = temp_dir.path().join("empty.wav");
    write_wav(&wav_path, 0, 0);

    let result = WavFileTap::open(&wav_path);
    assert!(result.is_err(), "a WAV with no samples cannot back a tap");
}
