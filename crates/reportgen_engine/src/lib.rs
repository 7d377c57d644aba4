//! Reportgen engine: pipeline-service IO and effect execution.
mod client;
mod engine;
mod health;
mod pacing;
mod persist;
mod pipeline;
mod response;
mod types;

pub use client::{ClientSettings, PipelineClient, ReqwestPipelineClient};
pub use engine::{EngineHandle, EngineSettings};
pub use health::{check_health, check_health_blocking, HealthReport};
pub use pacing::{Pacer, PacingSettings, TokioPacer};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{run_pipeline, ChannelProgressSink, ProgressSink};
pub use response::decode_response;
pub use types::{
    EngineEvent, PipelineRequest, PipelineStage, ReportPayload, RequestId, StageProgress,
    SubmitError, TransportKind, UploadSource,
};
