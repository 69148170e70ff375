// Tests for the in-memory chunk recorder
//
// The recorder preserves emission order, drops zero-length chunks, clears on
// a new take and concatenates everything into one exportable blob.

use interview_studio::capture::MediaChunk;
use interview_studio::recording::ChunkRecorder;
use tempfile::TempDir;

fn chunk(data: &[u8], sequence: u64) -> MediaChunk {
    MediaChunk {
        data: data.to_vec(),
        timestamp_ms: sequence * 1000,
        sequence,
    }
}

#[tokio::test]
async fn test_append_preserves_emission_order() {
    let recorder = ChunkRecorder::new();

    assert!(recorder.append(chunk(b"first", 0)).await);
    assert!(recorder.append(chunk(b"second", 1)).await);
    assert!(recorder.append(chunk(b"third", 2)).await);

    assert_eq!(recorder.chunk_count().await, 3);
    assert_eq!(recorder.export().await, b"firstsecondthird".to_vec());
}

#[tokio::test]
async fn test_zero_length_chunks_are_dropped() {
    let recorder = ChunkRecorder::new();

    assert!(recorder.append(chunk(b"data", 0)).await);
    assert!(!recorder.append(chunk(b"", 1)).await);
    assert!(recorder.append(chunk(b"more", 2)).await);

    assert_eq!(recorder.chunk_count().await, 2);
    assert_eq!(recorder.recorded_bytes().await, 8);
}

#[tokio::test]
async fn test_clear_resets_the_sequence() {
    let recorder = ChunkRecorder::new();

    recorder.append(chunk(b"old take", 0)).await;
    assert_eq!(recorder.chunk_count().await, 1);

    recorder.clear().await;

    assert_eq!(recorder.chunk_count().await, 0);
    assert_eq!(recorder.recorded_bytes().await, 0);
    assert!(recorder.export().await.is_empty());
}

#[tokio::test]
async fn test_export_empty_recorder() {
    let recorder = ChunkRecorder::new();
    assert!(recorder.export().await.is_empty());
}

#[tokio::test]
async fn test_export_to_disk() {
    let temp_dir = TempDir::new().unwrap();
    let out_path = temp_dir.path().join("interview-recording.webm");

    let recorder = ChunkRecorder::new();
    recorder.append(chunk(b"abc", 0)).await;
    recorder.append(chunk(b"def", 1)).await;

    let info = recorder.export_to(&out_path).await.unwrap();

    assert_eq!(info.chunk_count, 2);
    assert_eq!(info.bytes, 6);
    assert_eq!(std::fs::read(&out_path).unwrap(), b"abcdef".to_vec());
}

#[tokio::test]
async fn test_export_to_invalid_path_fails() {
    let recorder = ChunkRecorder::new();
    recorder.append(chunk(b"abc", 0)).await;

    let result = recorder.export_to("/nonexistent/dir/out.webm").await;
    assert!(result.is_err());
}
