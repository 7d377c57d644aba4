use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use reportgen_logging::{report_error, report_info};
use tokio_util::sync::CancellationToken;

use crate::pipeline::{run_pipeline, ChannelProgressSink};
use crate::{
    ClientSettings, EngineEvent, Pacer, PacingSettings, PipelineClient, PipelineRequest,
    ReqwestPipelineClient, RequestId, SubmitError, TokioPacer, TransportKind,
};

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub client: ClientSettings,
    pub pacing: PacingSettings,
}

enum EngineCommand {
    Submit(PipelineRequest),
    Cancel { request_id: RequestId },
}

type CancelRegistry = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// Background worker that runs pipeline requests on its own tokio runtime.
///
/// Commands go in through [`EngineHandle::submit`] and [`EngineHandle::cancel`];
/// progress and completion come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Self {
        let client = Arc::new(ReqwestPipelineClient::new(settings.client));
        Self::with_parts(client, Arc::new(TokioPacer), settings.pacing)
    }

    pub fn with_parts(
        client: Arc<dyn PipelineClient>,
        pacer: Arc<dyn Pacer>,
        pacing: PacingSettings,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || run_worker(cmd_rx, event_tx, client, pacer, pacing));

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, request: PipelineRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Submit(request));
    }

    pub fn cancel(&self, request_id: RequestId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { request_id });
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn run_worker(
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    client: Arc<dyn PipelineClient>,
    pacer: Arc<dyn Pacer>,
    pacing: PacingSettings,
) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            report_error!("Failed to start engine runtime: {}", err);
            refuse_all(cmd_rx, event_tx, &err.to_string());
            return;
        }
    };
    let registry: CancelRegistry = Arc::default();

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Submit(request) => {
                let token = CancellationToken::new();
                if let Ok(mut tokens) = registry.lock() {
                    tokens.insert(request.request_id, token.clone());
                }
                let client = client.clone();
                let pacer = pacer.clone();
                let pacing = pacing.clone();
                let event_tx = event_tx.clone();
                let registry = registry.clone();
                let request_id = request.request_id;
                let sink = ChannelProgressSink::new(event_tx.clone());
                let job = runtime.spawn(async move {
                    run_pipeline(
                        client.as_ref(),
                        pacer.as_ref(),
                        &pacing,
                        &request,
                        &sink,
                        &token,
                    )
                    .await
                });
                runtime.spawn(async move {
                    // Every request ends with a completion, even when its task panics.
                    let result = job.await.unwrap_or_else(|err| {
                        report_error!("Request {} task failed: {}", request_id, err);
                        Err(SubmitError::transport(
                            TransportKind::Io,
                            format!("request task failed: {err}"),
                        ))
                    });
                    if let Ok(mut tokens) = registry.lock() {
                        tokens.remove(&request_id);
                    }
                    let _ = event_tx.send(EngineEvent::Completed { request_id, result });
                });
            }
            EngineCommand::Cancel { request_id } => {
                let token = registry
                    .lock()
                    .ok()
                    .and_then(|mut tokens| tokens.remove(&request_id));
                match token {
                    Some(token) => {
                        report_info!("Cancelling request {}", request_id);
                        token.cancel();
                    }
                    None => report_info!("Cancel for finished request {} ignored", request_id),
                }
            }
        }
    }
}

fn refuse_all(
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    reason: &str,
) {
    while let Ok(command) = cmd_rx.recv() {
        if let EngineCommand::Submit(request) = command {
            let _ = event_tx.send(EngineEvent::Completed {
                request_id: request.request_id,
                result: Err(SubmitError::transport(
                    TransportKind::Io,
                    format!("engine unavailable: {reason}"),
                )),
            });
        }
    }
}
