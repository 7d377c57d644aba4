use reportgen_logging::report_info;
use serde::Deserialize;

use crate::client::{map_reqwest_error, read_capped, ReqwestPipelineClient};
use crate::{ClientSettings, SubmitError, TransportKind};

const HEALTH_MAX_BYTES: u64 = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Probe the `health` route that sits next to the configured process endpoint.
pub async fn check_health(settings: &ClientSettings) -> Result<HealthReport, SubmitError> {
    let url = reqwest::Url::parse(&settings.endpoint)
        .and_then(|endpoint| endpoint.join("health"))
        .map_err(|err| SubmitError::transport(TransportKind::InvalidEndpoint, err.to_string()))?;
    let client = ReqwestPipelineClient::build_client(settings)?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(map_reqwest_error)?;
    let status = response.status();
    let body = read_capped(response, HEALTH_MAX_BYTES).await?;
    if !status.is_success() {
        return Err(SubmitError::Backend {
            status: Some(status.as_u16()),
            message: Some(format!("health check returned {status}")),
        });
    }

    let report: HealthReport = serde_json::from_slice(&body).map_err(|err| {
        SubmitError::transport(TransportKind::Decode, format!("invalid health body: {err}"))
    })?;
    report_info!("Health of {}: {}", url, report.status);
    Ok(report)
}

/// [`check_health`] for callers without a runtime of their own.
pub fn check_health_blocking(settings: &ClientSettings) -> Result<HealthReport, SubmitError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| SubmitError::transport(TransportKind::Io, err.to_string()))?;
    runtime.block_on(check_health(settings))
}
