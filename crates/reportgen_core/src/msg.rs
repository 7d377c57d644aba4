#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked or dropped a file.
    FileSelected(crate::FileDescriptor),
    /// User cleared the current file.
    FileCleared,
    /// User edited the topic box.
    TopicChanged(String),
    /// User asked for a report.
    SubmitClicked,
    /// User abandoned the in-flight request.
    CancelClicked,
    /// Engine progress for a request.
    StageReached {
        request_id: crate::RequestId,
        stage: crate::Stage,
    },
    /// Engine delivered a finished report.
    PipelineSucceeded {
        request_id: crate::RequestId,
        result: crate::ReportResult,
    },
    /// Engine gave up on a request.
    PipelineFailed {
        request_id: crate::RequestId,
        error: crate::SubmissionError,
    },
    /// User dismissed the success or failure display.
    ResetClicked,
    /// User asked to download the report.
    ExportRequested(crate::ExportFormat),
    /// User opened the report viewer.
    ViewResultClicked,
    /// User closed the viewer with its close control.
    OverlayClosed,
    /// User clicked outside the viewer.
    OverlayClickedOutside,
    /// UI/render tick to coalesce rendering.
    Tick,
}
