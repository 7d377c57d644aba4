use std::path::PathBuf;

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Processing,
    Researching,
    Analyzing,
    Writing,
}

impl PipelineStage {
    pub fn next(self) -> Option<Self> {
        match self {
            PipelineStage::Processing => Some(PipelineStage::Researching),
            PipelineStage::Researching => Some(PipelineStage::Analyzing),
            PipelineStage::Analyzing => Some(PipelineStage::Writing),
            PipelineStage::Writing => None,
        }
    }
}

/// The document to upload, read from disk when the request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSource {
    pub path: PathBuf,
    pub file_name: String,
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub request_id: RequestId,
    pub upload: UploadSource,
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageProgress {
    pub request_id: RequestId,
    pub stage: PipelineStage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Progress(StageProgress),
    Completed {
        request_id: RequestId,
        result: Result<ReportPayload, SubmitError>,
    },
}

/// Decoded success response of the pipeline service.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportPayload {
    pub title: Option<String>,
    pub filename_base: Option<String>,
    pub topic: String,
    pub executive_summary: String,
    pub markdown: String,
    pub html: String,
    pub word_count: u64,
    pub section_count: u64,
    pub sources_found: u64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    InvalidEndpoint,
    Connect,
    Timeout,
    Decode,
    TooLarge,
    Io,
    Network,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The service answered and reported failure, with its `error` text if it gave one.
    #[error("{}", describe_backend(.status, .message))]
    Backend {
        status: Option<u16>,
        message: Option<String>,
    },
    /// No structured answer was obtained.
    #[error("{message}")]
    Transport {
        kind: TransportKind,
        message: String,
    },
    #[error("request cancelled")]
    Cancelled,
}

impl SubmitError {
    pub(crate) fn transport(kind: TransportKind, message: impl Into<String>) -> Self {
        SubmitError::Transport {
            kind,
            message: message.into(),
        }
    }

    pub fn transport_kind(&self) -> Option<TransportKind> {
        match self {
            SubmitError::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

fn describe_backend(status: &Option<u16>, message: &Option<String>) -> String {
    match (message, status) {
        (Some(message), _) => message.clone(),
        (None, Some(code)) => format!("service answered HTTP {code} without an error message"),
        (None, None) => "service reported failure without an error message".to_string(),
    }
}
