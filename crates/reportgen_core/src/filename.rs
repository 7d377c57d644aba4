/// Used when neither the service nor the title yields a usable name.
pub const DEFAULT_FILENAME_BASE: &str = "report";

const MAX_BASE_LEN: usize = 80;

/// Filename base for export: the service-provided slug if usable, else a slug of the title.
///
/// A provided slug is kept as-is apart from path-hostile characters, so
/// `"a/b"` can never escape the output directory.
pub fn filename_base_for(provided: Option<&str>, title: &str) -> String {
    if let Some(base) = provided.map(sanitize_provided).filter(|b| !b.is_empty()) {
        return base;
    }
    let slug = slug_from_title(title);
    if slug.is_empty() {
        DEFAULT_FILENAME_BASE.to_string()
    } else {
        slug
    }
}

fn slug_from_title(title: &str) -> String {
    let mut slug: String = title
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    truncate_chars(&mut slug, MAX_BASE_LEN);
    slug
}

fn sanitize_provided(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    truncate_chars(&mut cleaned, MAX_BASE_LEN);
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

fn truncate_chars(value: &mut String, max: usize) {
    if let Some((idx, _)) = value.char_indices().nth(max) {
        value.truncate(idx);
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provided_base_wins() {
        assert_eq!(
            filename_base_for(Some("blockchain_scalability_solutions"), "Ignored"),
            "blockchain_scalability_solutions"
        );
    }

    #[test]
    fn title_slug_when_missing() {
        assert_eq!(
            filename_base_for(None, "Artificial Intelligence Ethics"),
            "artificial_intelligence_ethics"
        );
        assert_eq!(filename_base_for(Some("  "), "AI: Risks?"), "ai_risks");
    }

    #[test]
    fn path_separators_are_neutralised() {
        assert_eq!(filename_base_for(Some("../etc/passwd"), "x"), "etc_passwd");
        assert_eq!(filename_base_for(Some("CON"), "x"), "CON_");
    }

    #[test]
    fn falls_back_to_report() {
        assert_eq!(filename_base_for(None, "!!!"), DEFAULT_FILENAME_BASE);
        assert_eq!(filename_base_for(Some("..."), ""), DEFAULT_FILENAME_BASE);
    }
}
