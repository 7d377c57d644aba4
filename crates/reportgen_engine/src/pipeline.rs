use reportgen_logging::{report_debug, report_info, report_warn};
use tokio_util::sync::CancellationToken;

use crate::{
    EngineEvent, Pacer, PacingSettings, PipelineClient, PipelineRequest, PipelineStage,
    ReportPayload, RequestId, StageProgress, SubmitError,
};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Runs one request, emitting stage progress while it is pending.
///
/// Stages advance one per `stage_interval` up to `Writing`. A successful
/// response always passes through `Writing` and then waits `reveal_delay`
/// before returning. Failures return immediately. Cancellation wins over
/// everything else.
pub async fn run_pipeline(
    client: &dyn PipelineClient,
    pacer: &dyn Pacer,
    pacing: &PacingSettings,
    request: &PipelineRequest,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<ReportPayload, SubmitError> {
    let request_id = request.request_id;
    let mut stage = PipelineStage::Processing;
    emit_stage(sink, request_id, stage);

    let submit = client.submit(request);
    tokio::pin!(submit);

    let outcome = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                report_info!("Request {} cancelled at {:?}", request_id, stage);
                return Err(SubmitError::Cancelled);
            }
            result = &mut submit => break result,
            _ = pacer.pause(pacing.stage_interval), if stage.next().is_some() => {
                if let Some(next) = stage.next() {
                    stage = next;
                    emit_stage(sink, request_id, stage);
                }
            }
        }
    };

    let payload = match outcome {
        Ok(payload) => payload,
        Err(err) => {
            report_warn!("Request {} failed at {:?}: {}", request_id, stage, err);
            return Err(err);
        }
    };

    if stage != PipelineStage::Writing {
        stage = PipelineStage::Writing;
        emit_stage(sink, request_id, stage);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(SubmitError::Cancelled),
        _ = pacer.pause(pacing.reveal_delay) => {}
    }

    report_info!(
        "Request {} complete: {} words, {} sections",
        request_id,
        payload.word_count,
        payload.section_count
    );
    Ok(payload)
}

fn emit_stage(sink: &dyn ProgressSink, request_id: RequestId, stage: PipelineStage) {
    report_debug!("Request {} reached {:?}", request_id, stage);
    sink.emit(EngineEvent::Progress(StageProgress { request_id, stage }));
}
