/// Shown when the pipeline service fails without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate report";

/// A finished report as returned by the pipeline service.
///
/// Counts and confidence are taken as delivered; the client only rounds them for display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportResult {
    pub title: String,
    pub topic: String,
    pub executive_summary: String,
    pub markdown: String,
    pub html: String,
    pub word_count: u64,
    pub section_count: u64,
    pub source_count: u64,
    /// Research confidence in `0..=1`.
    pub confidence: f64,
    pub filename_base: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// The service ran and reported a failure.
    #[error("{0}")]
    BackendReported(String),
    /// No structured response was obtained (network, timeout, undecodable body).
    #[error("{0}")]
    Transport(String),
}

impl SubmissionError {
    pub fn backend(message: Option<&str>) -> Self {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_FAILURE_MESSAGE);
        SubmissionError::BackendReported(message.to_string())
    }

    pub fn message(&self) -> &str {
        match self {
            SubmissionError::BackendReported(message) | SubmissionError::Transport(message) => {
                message
            }
        }
    }
}
