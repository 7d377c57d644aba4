use reportgen_core::{AppViewModel, CandidateView, PhaseView, ReportStatsView};

const BAR_WIDTH: usize = 20;

/// Lines describing the current view, top to bottom.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    let file = view
        .candidate
        .as_ref()
        .map(format_candidate)
        .unwrap_or_else(|| "no file".to_string());
    let topic = if view.topic.trim().is_empty() {
        "no topic".to_string()
    } else {
        format!("topic \"{}\"", view.topic.trim())
    };
    lines.push(format!("{file} | {topic}"));

    match &view.phase {
        PhaseView::Idle => {
            let gate = if view.can_submit { "ready" } else { "waiting for input" };
            lines.push(format!("Idle ({gate})"));
        }
        PhaseView::Submitting => lines.push("Submitting...".to_string()),
        PhaseView::Stage {
            index,
            total,
            label,
        } => lines.push(format!(
            "[{index}/{total}] {} {label}",
            progress_bar(*index, *total)
        )),
        PhaseView::Succeeded => {
            let title = view.title.as_deref().unwrap_or("Untitled report");
            lines.push(format!("Report ready: {title}"));
            if let Some(stats) = &view.stats {
                lines.push(format_stats(stats));
            }
        }
        PhaseView::Failed { message } => lines.push(format!("Error: {message}")),
    }

    if let Some(html) = view.overlay_html.as_deref().filter(|_| view.overlay_open) {
        lines.push("----- report -----".to_string());
        lines.extend(html.lines().map(ToOwned::to_owned));
        lines.push("------------------".to_string());
    }

    lines
}

fn format_candidate(candidate: &CandidateView) -> String {
    format!("{} ({})", candidate.name, format_size(candidate.size))
}

fn format_stats(stats: &ReportStatsView) -> String {
    format!(
        "Words: {} | Sections: {} | Sources: {} | Confidence: {}",
        format_with_commas(stats.word_count),
        stats.section_count,
        stats.source_count,
        stats.confidence
    )
}

fn progress_bar(index: u8, total: u8) -> String {
    let total = usize::from(total.max(1));
    let filled = (usize::from(index).min(total) * BAR_WIDTH) / total;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KIB {
        format!("{bytes} B")
    } else if value < KIB * KIB {
        format!("{:.1} KiB", value / KIB)
    } else {
        format!("{:.1} MiB", value / (KIB * KIB))
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
