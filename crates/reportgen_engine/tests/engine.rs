use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reportgen_engine::{
    ClientSettings, EngineEvent, EngineHandle, EngineSettings, PacingSettings, PipelineClient,
    PipelineRequest, PipelineStage, ReportPayload, StageProgress, SubmitError, TokioPacer,
    TransportKind, UploadSource,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn collect_until_completed(engine: &EngineHandle, deadline: Duration) -> Vec<EngineEvent> {
    let start = Instant::now();
    let mut events = Vec::new();
    while start.elapsed() < deadline {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
            let done = matches!(event, EngineEvent::Completed { .. });
            events.push(event);
            if done {
                break;
            }
        }
    }
    events
}

fn request(file: &tempfile::NamedTempFile, request_id: u64) -> PipelineRequest {
    PipelineRequest {
        request_id,
        upload: UploadSource {
            path: file.path().to_path_buf(),
            file_name: "notes.txt".into(),
            media_type: Some("text/plain".into()),
        },
        topic: "ai ethics".into(),
    }
}

fn upload() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"AI ethics notes").unwrap();
    file
}

fn settings(server: &MockServer) -> EngineSettings {
    EngineSettings {
        client: ClientSettings {
            endpoint: format!("{}/process", server.uri()),
            ..ClientSettings::default()
        },
        pacing: PacingSettings::immediate(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_reports_progress_then_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "title": "Artificial Intelligence Ethics",
            "report": {
                "topic": "Artificial Intelligence Ethics",
                "markdown": "# AI Ethics",
                "html": "<h1>AI Ethics</h1>",
                "metadata": {"word_count": 12, "section_count": 2}
            },
            "research_summary": {"sources_found": 3, "confidence": 0.5}
        })))
        .mount(&server)
        .await;

    let engine = EngineHandle::new(settings(&server));
    let file = upload();
    engine.submit(request(&file, 4));

    let events = tokio::task::spawn_blocking(move || {
        collect_until_completed(&engine, Duration::from_secs(10))
    })
    .await
    .unwrap();

    assert_eq!(
        events.first(),
        Some(&EngineEvent::Progress(StageProgress {
            request_id: 4,
            stage: PipelineStage::Processing,
        }))
    );
    let stages: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Progress(progress) => Some(progress.stage),
            _ => None,
        })
        .collect();
    assert!(stages.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(stages.last(), Some(&PipelineStage::Writing));

    match events.last() {
        Some(EngineEvent::Completed { request_id, result }) => {
            assert_eq!(*request_id, 4);
            let payload = result.as_ref().expect("success");
            assert_eq!(payload.title.as_deref(), Some("Artificial Intelligence Ethics"));
            assert_eq!(payload.word_count, 12);
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_cancel_ends_request_as_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(30))
                .set_body_json(json!({"success": true, "report": {}})),
        )
        .mount(&server)
        .await;

    let engine = EngineHandle::new(settings(&server));
    let file = upload();
    engine.submit(request(&file, 7));

    let events = tokio::task::spawn_blocking(move || {
        // Let the request reach the server before cancelling.
        std::thread::sleep(Duration::from_millis(200));
        engine.cancel(7);
        collect_until_completed(&engine, Duration::from_secs(10))
    })
    .await
    .unwrap();

    assert!(matches!(
        events.last(),
        Some(EngineEvent::Completed {
            request_id: 7,
            result: Err(SubmitError::Cancelled),
        })
    ));
}

struct PanickingClient;

#[async_trait::async_trait]
impl PipelineClient for PanickingClient {
    async fn submit(&self, _request: &PipelineRequest) -> Result<ReportPayload, SubmitError> {
        panic!("client blew up");
    }
}

#[test]
fn panicking_request_still_completes() {
    let engine = EngineHandle::with_parts(
        Arc::new(PanickingClient),
        Arc::new(TokioPacer),
        PacingSettings::immediate(),
    );
    let file = upload();
    engine.submit(request(&file, 11));

    let events = collect_until_completed(&engine, Duration::from_secs(10));

    match events.last() {
        Some(EngineEvent::Completed {
            request_id: 11,
            result: Err(err),
        }) => assert_eq!(err.transport_kind(), Some(TransportKind::Io)),
        other => panic!("expected failed completion, got {other:?}"),
    }
}
