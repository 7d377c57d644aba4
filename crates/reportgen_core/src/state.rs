use crate::artifact::{Artifact, ExportFormat};
use crate::validation::{validate_file, FileDescriptor, ValidationError};
use crate::view_model::AppViewModel;
use crate::{ReportResult, SubmissionError};

pub type RequestId = u64;

/// Coarse progress milestones of one pipeline request, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Processing,
    Researching,
    Analyzing,
    Writing,
}

impl Stage {
    pub const COUNT: u8 = 4;

    /// 1-based position of the stage.
    pub fn index(self) -> u8 {
        match self {
            Stage::Processing => 1,
            Stage::Researching => 2,
            Stage::Analyzing => 3,
            Stage::Writing => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Processing => "Processing document...",
            Stage::Researching => "Researching topic...",
            Stage::Analyzing => "Analyzing content...",
            Stage::Writing => "Writing report...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Stage(Stage),
    Succeeded(ReportResult),
    Failed(SubmissionError),
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Succeeded(_) | Phase::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    candidate: Option<FileDescriptor>,
    topic: String,
    phase: Phase,
    in_flight: Option<RequestId>,
    next_request_id: RequestId,
    overlay_open: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self)
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn candidate(&self) -> Option<&FileDescriptor> {
        self.candidate.as_ref()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub fn overlay_open(&self) -> bool {
        self.overlay_open
    }

    pub fn result(&self) -> Option<&ReportResult> {
        match &self.phase {
            Phase::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    /// Submission gate: a valid candidate, a non-blank topic and nothing in flight.
    pub fn can_submit(&self) -> bool {
        self.candidate.is_some() && !self.topic.trim().is_empty() && self.in_flight.is_none()
    }

    /// Returns true if the state changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Validate and store a candidate. A rejected file leaves state untouched.
    pub fn accept_file(&mut self, file: FileDescriptor) -> Result<(), ValidationError> {
        validate_file(&file)?;
        self.candidate = Some(file);
        self.mark_dirty();
        Ok(())
    }

    /// Named artifact for the held result, or `None` when nothing has succeeded yet.
    pub fn export_artifact(&self, format: ExportFormat) -> Option<Artifact> {
        self.result()
            .map(|result| Artifact::from_result(result, format))
    }

    pub(crate) fn clear_file(&mut self) {
        if self.candidate.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_topic(&mut self, topic: String) {
        if self.topic != topic {
            self.topic = topic;
            self.mark_dirty();
        }
    }

    /// Allocates a request id and moves to `Submitting`.
    pub(crate) fn begin_request(&mut self) -> RequestId {
        self.next_request_id += 1;
        let id = self.next_request_id;
        self.in_flight = Some(id);
        self.phase = Phase::Submitting;
        self.overlay_open = false;
        self.mark_dirty();
        id
    }

    pub(crate) fn is_current(&self, request_id: RequestId) -> bool {
        self.in_flight == Some(request_id)
    }

    pub(crate) fn apply_stage(&mut self, stage: Stage) {
        let advances = match self.phase {
            Phase::Submitting => true,
            Phase::Stage(current) => stage > current,
            _ => false,
        };
        if advances {
            self.phase = Phase::Stage(stage);
            self.mark_dirty();
        }
    }

    pub(crate) fn finish(&mut self, phase: Phase) {
        self.in_flight = None;
        self.phase = phase;
        self.mark_dirty();
    }

    pub(crate) fn abandon_request(&mut self) -> Option<RequestId> {
        let id = self.in_flight.take()?;
        self.phase = Phase::Idle;
        self.mark_dirty();
        Some(id)
    }

    pub(crate) fn reset(&mut self) {
        if self.phase.is_terminal() {
            self.phase = Phase::Idle;
            self.overlay_open = false;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_overlay(&mut self, open: bool) {
        let open = open && self.result().is_some();
        if self.overlay_open != open {
            self.overlay_open = open;
            self.mark_dirty();
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
