use crate::e2e::helpers;

use helpers::fakes::{
    mock_audio_bytes, RecordingAudioOutput, RecordingClipboard, ScriptedTtsRepository,
};
use helpers::payload_message;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use tts_bridge::domain::message::{
    MessageProcessor, MessageProcessorApi, MessageProcessorError, ProcessOutcome,
};
use tts_bridge::domain::tts::SynthesisRequest;

struct Pipeline {
    processor: MessageProcessor,
    clipboard: Arc<RecordingClipboard>,
    tts: Arc<ScriptedTtsRepository>,
    audio: Arc<RecordingAudioOutput>,
}

fn pipeline(
    clipboard: RecordingClipboard,
    tts: ScriptedTtsRepository,
    audio: RecordingAudioOutput,
) -> Pipeline {
    let clipboard = Arc::new(clipboard);
    let tts = Arc::new(tts);
    let audio = Arc::new(audio);
    Pipeline {
        processor: MessageProcessor::new(clipboard.clone(), tts.clone(), audio.clone()),
        clipboard,
        tts,
        audio,
    }
}

fn working_pipeline() -> Pipeline {
    pipeline(
        RecordingClipboard::default(),
        ScriptedTtsRepository::returning(mock_audio_bytes()),
        RecordingAudioOutput::default(),
    )
}

#[tokio::test]
async fn it_should_copy_synthesize_and_play_a_japanese_payload() {
    let p = working_pipeline();

    let outcome = assert_ok!(p.processor.process(&payload_message("こんにちは")).await);

    assert_eq!(
        outcome,
        ProcessOutcome::Played {
            audio_size_bytes: mock_audio_bytes().len()
        }
    );
    assert_eq!(p.clipboard.copied(), vec!["こんにちは"]);
    assert_eq!(p.tts.requests(), vec![SynthesisRequest::new("こんにちは")]);

    let request = &p.tts.requests()[0];
    assert_eq!(request.voice, "ja-JP-NanamiNeural");
    assert_eq!(request.speed_offset, -10);
    assert!(request.trim_silence);

    assert_eq!(p.audio.played(), vec![mock_audio_bytes()]);
}

#[tokio::test]
async fn it_should_ignore_fields_other_than_payload() {
    let p = working_pipeline();

    let raw = r#"{"Type": "Chat", "Payload": "テスト", "Sender": {"Name": "bot"}}"#;
    assert_ok!(p.processor.process(raw).await);

    assert_eq!(p.clipboard.copied(), vec!["テスト"]);
}

#[tokio::test]
async fn it_should_skip_messages_without_payload() {
    let p = working_pipeline();

    for raw in [
        r#"{}"#,
        r#"{"Payload": ""}"#,
        r#"{"Payload": null}"#,
        r#"{"Payload": []}"#,
        r#"{"Payload": {}}"#,
        r#"{"Payload": 0}"#,
        r#"{"Payload": false}"#,
    ] {
        let err = assert_err!(p.processor.process(raw).await);
        assert!(
            matches!(err, MessageProcessorError::MissingPayload),
            "{} should be reported as missing payload, got {:?}",
            raw,
            err
        );
    }

    assert!(p.clipboard.copied().is_empty());
    assert!(p.tts.requests().is_empty());
    assert!(p.audio.played().is_empty());
}

#[tokio::test]
async fn it_should_reject_malformed_json() {
    let p = working_pipeline();

    let err = assert_err!(p.processor.process("{\"Payload\": ").await);
    assert!(matches!(err, MessageProcessorError::InvalidJson(_)));

    let err = assert_err!(p.processor.process("[1, 2, 3]").await);
    assert!(matches!(err, MessageProcessorError::NotAnObject));

    let err = assert_err!(p.processor.process(r#"{"Payload": 42}"#).await);
    assert!(matches!(err, MessageProcessorError::InvalidPayload("number")));

    assert!(p.clipboard.copied().is_empty());
    assert!(p.tts.requests().is_empty());
}

#[tokio::test]
async fn it_should_not_play_empty_audio() {
    for bytes in [Vec::new(), vec![0xFF]] {
        let p = pipeline(
            RecordingClipboard::default(),
            ScriptedTtsRepository::returning(bytes.clone()),
            RecordingAudioOutput::default(),
        );

        let outcome = assert_ok!(p.processor.process(&payload_message("無音")).await);

        assert_eq!(
            outcome,
            ProcessOutcome::EmptyAudio {
                audio_size_bytes: bytes.len()
            }
        );
        // The text still reaches the clipboard
        assert_eq!(p.clipboard.copied(), vec!["無音"]);
        assert!(p.audio.played().is_empty());
    }
}

#[tokio::test]
async fn it_should_report_synthesis_failures() {
    let p = pipeline(
        RecordingClipboard::default(),
        ScriptedTtsRepository::failing("space is sleeping"),
        RecordingAudioOutput::default(),
    );

    let err = assert_err!(p.processor.process(&payload_message("失敗")).await);

    assert!(matches!(err, MessageProcessorError::Synthesis(_)));
    assert!(err.to_string().contains("space is sleeping"));
    assert_eq!(p.clipboard.copied(), vec!["失敗"]);
    assert!(p.audio.played().is_empty());
}

#[tokio::test]
async fn it_should_report_playback_failures() {
    let p = pipeline(
        RecordingClipboard::default(),
        ScriptedTtsRepository::returning(mock_audio_bytes()),
        RecordingAudioOutput::failing(),
    );

    let err = assert_err!(p.processor.process(&payload_message("再生")).await);

    assert!(matches!(err, MessageProcessorError::Playback(_)));
    assert_eq!(p.tts.requests().len(), 1);
}

#[tokio::test]
async fn it_should_stop_before_synthesis_when_clipboard_fails() {
    let p = pipeline(
        RecordingClipboard::failing(),
        ScriptedTtsRepository::returning(mock_audio_bytes()),
        RecordingAudioOutput::default(),
    );

    let err = assert_err!(p.processor.process(&payload_message("コピー")).await);

    assert!(matches!(err, MessageProcessorError::Clipboard(_)));
    assert!(p.tts.requests().is_empty());
    assert!(p.audio.played().is_empty());
}

#[tokio::test]
async fn it_should_swallow_errors_when_handling() {
    let p = pipeline(
        RecordingClipboard::default(),
        ScriptedTtsRepository::failing("boom"),
        RecordingAudioOutput::default(),
    );

    // Never panics or propagates; the receive loop relies on this
    p.processor.handle("not json").await;
    p.processor.handle(r#"{"Other": 1}"#).await;
    p.processor.handle(&payload_message("エラー")).await;

    assert_eq!(p.clipboard.copied(), vec!["エラー"]);
}
