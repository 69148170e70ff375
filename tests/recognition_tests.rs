// Tests for recognition wire messages and result-event partitioning

use interview_studio::recognition::{
    partition_event, AlternativeMessage, RecognitionConfig, RecognitionEventMessage,
    ResultMessage, StartRecognitionMessage,
};

fn result(transcript: &str, is_final: bool) -> ResultMessage {
    ResultMessage {
        alternatives: vec![AlternativeMessage {
            transcript: transcript.to_string(),
            confidence: Some(0.9),
        }],
        is_final,
    }
}

#[test]
fn test_recognition_config_defaults() {
    let config = RecognitionConfig::default();

    assert!(config.continuous);
    assert!(config.interim_results);
    assert_eq!(config.language, "en-US");
}

#[test]
fn test_start_message_serialization() {
    let msg = StartRecognitionMessage {
        session_id: "interview-42".to_string(),
        config: RecognitionConfig::default(),
        timestamp: "2026-08-06T10:00:00Z".to_string(),
    };

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("interview-42"));
    assert!(json.contains("\"continuous\":true"));
    assert!(json.contains("\"interim_results\":true"));
    assert!(json.contains("en-US"));
}

#[test]
fn test_result_finality_flag_uses_final_on_the_wire() {
    let msg = result("hello", true);

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"final\":true"));

    let deserialized: ResultMessage = serde_json::from_str(&json).unwrap();
    assert!(deserialized.is_final);
}

#[test]
fn test_event_kind_tagging() {
    let json = r#"{
        "kind": "result",
        "session_id": "interview-1",
        "result_index": 1,
        "results": [
            {"alternatives": [{"transcript": "hello", "confidence": 0.95}], "final": true}
        ]
    }"#;

    let event: RecognitionEventMessage = serde_json::from_str(json).unwrap();
    match event {
        RecognitionEventMessage::Result {
            session_id,
            result_index,
            results,
        } => {
            assert_eq!(session_id, "interview-1");
            assert_eq!(result_index, 1);
            assert_eq!(results.len(), 1);
        }
        other => panic!("Expected a result event, got {:?}", other),
    }

    let error: RecognitionEventMessage =
        serde_json::from_str(r#"{"kind": "error", "session_id": "s", "message": "boom"}"#).unwrap();
    assert_eq!(error.session_id(), "s");

    let end: RecognitionEventMessage =
        serde_json::from_str(r#"{"kind": "end", "session_id": "s"}"#).unwrap();
    assert!(matches!(end, RecognitionEventMessage::End { .. }));
}

#[test]
fn test_partition_splits_by_finality() {
    let results = vec![
        result("all good ", true),
        result("and then", false),
        result(" some more", false),
    ];

    let partition = partition_event(0, &results);

    assert_eq!(partition.finalized.len(), 1);
    assert_eq!(partition.finalized[0].text, "all good ");
    assert_eq!(partition.interim_line, "and then some more");
}

#[test]
fn test_partition_skips_results_before_the_cursor() {
    // Results before the cursor were delivered by earlier events
    let results = vec![
        result("already seen", true),
        result("new final", true),
        result("new interim", false),
    ];

    let partition = partition_event(1, &results);

    assert_eq!(partition.finalized.len(), 1);
    assert_eq!(partition.finalized[0].text, "new final");
    assert_eq!(partition.interim_line, "new interim");
}

#[test]
fn test_partition_preserves_arrival_order_of_finals() {
    let results = vec![result("first", true), result("second", true)];

    let partition = partition_event(0, &results);

    let texts: Vec<_> = partition.finalized.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
}

#[test]
fn test_partition_with_cursor_past_the_end() {
    let results = vec![result("old", true)];

    let partition = partition_event(5, &results);

    assert!(partition.finalized.is_empty());
    assert!(partition.interim_line.is_empty());
}

#[test]
fn test_partition_skips_results_without_alternatives() {
    let results = vec![
        ResultMessage {
            alternatives: vec![],
            is_final: true,
        },
        result("kept", false),
    ];

    let partition = partition_event(0, &results);

    assert!(partition.finalized.is_empty());
    assert_eq!(partition.interim_line, "kept");
}

#[test]
fn test_partition_uses_first_alternative_only() {
    let results = vec![ResultMessage {
        alternatives: vec![
            AlternativeMessage {
                transcript: "primary".to_string(),
                confidence: Some(0.9),
            },
            AlternativeMessage {
                transcript: "secondary".to_string(),
                confidence: Some(0.3),
            },
        ],
        is_final: true,
    }];

    let partition = partition_event(0, &results);

    assert_eq!(partition.finalized[0].text, "primary");
}
