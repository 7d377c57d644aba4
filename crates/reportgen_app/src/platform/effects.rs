use std::path::PathBuf;
use std::time::Duration;

use reportgen_core::{
    filename_base_for, Effect, Msg, ReportResult, Stage, SubmissionError, ValidationError,
    GENERIC_FAILURE_MESSAGE,
};
use reportgen_engine::{
    AtomicFileWriter, EngineEvent, EngineHandle, PipelineRequest, PipelineStage, ReportPayload,
    SubmitError, UploadSource,
};
use reportgen_logging::{report_error, report_info, report_warn};

/// Executes core effects against the engine and the filesystem.
pub struct EffectRunner {
    engine: EngineHandle,
    writer: AtomicFileWriter,
    saved: Vec<PathBuf>,
    failures: Vec<String>,
    rejection: Option<ValidationError>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, output_dir: PathBuf) -> Self {
        Self {
            engine,
            writer: AtomicFileWriter::new(output_dir),
            saved: Vec::new(),
            failures: Vec::new(),
            rejection: None,
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitPipeline {
                    request_id,
                    file,
                    topic,
                } => {
                    report_info!(
                        "SubmitPipeline request_id={} file={} size={} topic_len={}",
                        request_id,
                        file.name,
                        file.size,
                        topic.len()
                    );
                    self.engine.submit(PipelineRequest {
                        request_id,
                        upload: UploadSource {
                            path: file.path,
                            file_name: file.name,
                            media_type: file.media_type,
                        },
                        topic,
                    });
                }
                Effect::CancelPipeline { request_id } => {
                    report_info!("CancelPipeline request_id={}", request_id);
                    self.engine.cancel(request_id);
                }
                Effect::SaveArtifact(artifact) => {
                    match self.writer.write(&artifact.filename, &artifact.content) {
                        Ok(path) => {
                            report_info!("Saved {} ({})", artifact.filename, artifact.media_type);
                            self.saved.push(path);
                        }
                        Err(err) => {
                            report_error!(
                                "Failed to save {} into {:?}: {}",
                                artifact.filename,
                                self.writer.dir(),
                                err
                            );
                            self.failures
                                .push(format!("failed to save {}: {err}", artifact.filename));
                        }
                    }
                }
                Effect::FileRejected(err) => {
                    report_warn!("File rejected: {}", err);
                    self.rejection = Some(err);
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event and translates it.
    pub fn next_message(&self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        map_event(event)
    }

    pub fn take_rejection(&mut self) -> Option<ValidationError> {
        self.rejection.take()
    }

    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Progress(progress) => Some(Msg::StageReached {
            request_id: progress.request_id,
            stage: map_stage(progress.stage),
        }),
        EngineEvent::Completed { request_id, result } => match result {
            Ok(payload) => Some(Msg::PipelineSucceeded {
                request_id,
                result: map_payload(payload),
            }),
            Err(SubmitError::Cancelled) => None,
            Err(err) => {
                report_warn!("Request {} failed: {}", request_id, err);
                Some(Msg::PipelineFailed {
                    request_id,
                    error: map_error(err),
                })
            }
        },
    }
}

fn map_stage(stage: PipelineStage) -> Stage {
    match stage {
        PipelineStage::Processing => Stage::Processing,
        PipelineStage::Researching => Stage::Researching,
        PipelineStage::Analyzing => Stage::Analyzing,
        PipelineStage::Writing => Stage::Writing,
    }
}

fn map_error(err: SubmitError) -> SubmissionError {
    match err {
        SubmitError::Backend {
            status: Some(code),
            message: None,
        } => SubmissionError::BackendReported(format!("{GENERIC_FAILURE_MESSAGE} (HTTP {code})")),
        SubmitError::Backend { message, .. } => SubmissionError::backend(message.as_deref()),
        SubmitError::Transport { message, .. } => SubmissionError::Transport(message),
        SubmitError::Cancelled => SubmissionError::Transport(SubmitError::Cancelled.to_string()),
    }
}

fn map_payload(payload: ReportPayload) -> ReportResult {
    let title = payload
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| payload.topic.clone());
    let filename_base = filename_base_for(payload.filename_base.as_deref(), &title);
    ReportResult {
        title,
        topic: payload.topic,
        executive_summary: payload.executive_summary,
        markdown: payload.markdown,
        html: payload.html,
        word_count: payload.word_count,
        section_count: payload.section_count,
        source_count: payload.sources_found,
        confidence: payload.confidence,
        filename_base,
    }
}
