//! Reportgen core: pure pipeline-client state machine and view-model helpers.
mod artifact;
mod effect;
mod filename;
mod msg;
mod report;
mod state;
mod update;
mod validation;
mod view_model;

pub use artifact::{Artifact, ExportFormat};
pub use effect::Effect;
pub use filename::{filename_base_for, DEFAULT_FILENAME_BASE};
pub use msg::Msg;
pub use report::{ReportResult, SubmissionError, GENERIC_FAILURE_MESSAGE};
pub use state::{AppState, Phase, RequestId, Stage};
pub use update::update;
pub use validation::{
    media_type_for_name, validate_file, FileDescriptor, ValidationError, MAX_UPLOAD_BYTES,
};
pub use view_model::{
    confidence_label, AppViewModel, CandidateView, PhaseView, ReportStatsView,
};
