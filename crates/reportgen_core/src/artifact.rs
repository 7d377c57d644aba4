use crate::ReportResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Markdown,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Html => "text/html",
        }
    }
}

/// A named byte sequence ready to be saved or handed to a viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub media_type: &'static str,
    pub content: Vec<u8>,
}

impl Artifact {
    pub(crate) fn from_result(result: &ReportResult, format: ExportFormat) -> Self {
        let body = match format {
            ExportFormat::Markdown => &result.markdown,
            ExportFormat::Html => &result.html,
        };
        Self {
            filename: format!("{}.{}", result.filename_base, format.extension()),
            media_type: format.media_type(),
            content: body.as_bytes().to_vec(),
        }
    }
}
