use crate::{AppState, Phase, Stage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhaseView {
    #[default]
    Idle,
    Submitting,
    Stage {
        index: u8,
        total: u8,
        label: &'static str,
    },
    Succeeded,
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateView {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStatsView {
    pub word_count: u64,
    pub section_count: u64,
    pub source_count: u64,
    /// Confidence rounded to a whole percent, e.g. `"82%"`.
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: PhaseView,
    pub candidate: Option<CandidateView>,
    pub topic: String,
    pub can_submit: bool,
    pub busy: bool,
    pub title: Option<String>,
    pub stats: Option<ReportStatsView>,
    pub overlay_open: bool,
    /// HTML body to render read-only while the viewer is open.
    pub overlay_html: Option<String>,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState) -> Self {
        let phase = match state.phase() {
            Phase::Idle => PhaseView::Idle,
            Phase::Submitting => PhaseView::Submitting,
            Phase::Stage(stage) => stage_view(*stage),
            Phase::Succeeded(_) => PhaseView::Succeeded,
            Phase::Failed(err) => PhaseView::Failed {
                message: err.message().to_string(),
            },
        };
        let result = state.result();
        let stats = result.map(|r| ReportStatsView {
            word_count: r.word_count,
            section_count: r.section_count,
            source_count: r.source_count,
            confidence: confidence_label(r.confidence),
        });
        let overlay_html = result
            .filter(|_| state.overlay_open())
            .map(|r| r.html.clone());

        Self {
            phase,
            candidate: state.candidate().map(|c| CandidateView {
                name: c.name.clone(),
                size: c.size,
            }),
            topic: state.topic().to_string(),
            can_submit: state.can_submit() && matches!(state.phase(), Phase::Idle),
            busy: state.in_flight().is_some(),
            title: result.map(|r| r.title.clone()),
            stats,
            overlay_open: state.overlay_open(),
            overlay_html,
        }
    }
}

fn stage_view(stage: Stage) -> PhaseView {
    PhaseView::Stage {
        index: stage.index(),
        total: Stage::COUNT,
        label: stage.label(),
    }
}

/// Display rounding only; out-of-range values are shown as delivered.
pub fn confidence_label(confidence: f64) -> String {
    if !confidence.is_finite() {
        return "n/a".to_string();
    }
    format!("{}%", (confidence * 100.0).round() as i64)
}
