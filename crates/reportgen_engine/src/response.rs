use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::{ReportPayload, SubmitError, TransportKind};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireResponse {
    success: Option<bool>,
    error: Option<String>,
    title: Option<String>,
    filename_base: Option<String>,
    report: Option<WireReport>,
    #[serde(deserialize_with = "null_as_default")]
    research_summary: WireResearchSummary,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireReport {
    #[serde(deserialize_with = "null_as_default")]
    topic: String,
    #[serde(deserialize_with = "null_as_default")]
    executive_summary: String,
    #[serde(deserialize_with = "null_as_default")]
    markdown: String,
    #[serde(deserialize_with = "null_as_default")]
    html: String,
    #[serde(deserialize_with = "null_as_default")]
    metadata: WireMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireMetadata {
    #[serde(deserialize_with = "lenient_count")]
    word_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    section_count: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireResearchSummary {
    #[serde(deserialize_with = "lenient_count")]
    sources_found: u64,
    #[serde(deserialize_with = "lenient_ratio")]
    confidence: f64,
}

/// Any JSON value in a numeric slot; the service's numbers are shown as delivered.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireNumber {
    Unsigned(u64),
    Float(f64),
    Other(IgnoredAny),
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(match Option::<WireNumber>::deserialize(deserializer)? {
        Some(WireNumber::Unsigned(n)) => n,
        // Saturating: negatives and NaN become 0, huge values u64::MAX.
        Some(WireNumber::Float(f)) => f.round() as u64,
        Some(WireNumber::Other(_)) | None => 0,
    })
}

fn lenient_ratio<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Option::<WireNumber>::deserialize(deserializer)? {
        Some(WireNumber::Unsigned(n)) => n as f64,
        Some(WireNumber::Float(f)) => f,
        Some(WireNumber::Other(_)) | None => 0.0,
    })
}

/// Interpret a pipeline response from its HTTP status and raw body.
pub fn decode_response(status: u16, body: &[u8]) -> Result<ReportPayload, SubmitError> {
    let parsed = serde_json::from_slice::<WireResponse>(body);

    if !(200..300).contains(&status) {
        let message = parsed.ok().and_then(|wire| wire.error);
        return Err(backend_error(Some(status), message));
    }

    let wire = parsed.map_err(|err| {
        SubmitError::transport(TransportKind::Decode, format!("invalid response body: {err}"))
    })?;

    if wire.success == Some(false) {
        return Err(backend_error(None, wire.error));
    }

    let Some(report) = wire.report else {
        return Err(match wire.success {
            Some(true) => SubmitError::transport(TransportKind::Decode, "response has no report"),
            _ => backend_error(None, wire.error),
        });
    };

    Ok(ReportPayload {
        title: wire.title.filter(|t| !t.trim().is_empty()),
        filename_base: wire.filename_base.filter(|f| !f.trim().is_empty()),
        topic: report.topic,
        executive_summary: report.executive_summary,
        markdown: report.markdown,
        html: report.html,
        word_count: report.metadata.word_count,
        section_count: report.metadata.section_count,
        sources_found: wire.research_summary.sources_found,
        confidence: wire.research_summary.confidence,
    })
}

fn backend_error(status: Option<u16>, message: Option<String>) -> SubmitError {
    let message = message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    SubmitError::Backend { status, message }
}
