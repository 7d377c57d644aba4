use std::error::Error as _;
use std::time::Duration;

use futures_util::StreamExt;
use reportgen_logging::{report_debug, report_info};
use reqwest::multipart::{Form, Part};

use crate::response::decode_response;
use crate::{PipelineRequest, ReportPayload, SubmitError, TransportKind};

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Full URL of the pipeline's process endpoint.
    pub endpoint: String,
    pub connect_timeout: Duration,
    /// Whole-request timeout; report writing runs for minutes.
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4000/process".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
            max_response_bytes: 32 * 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait PipelineClient: Send + Sync {
    async fn submit(&self, request: &PipelineRequest) -> Result<ReportPayload, SubmitError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestPipelineClient {
    settings: ClientSettings,
}

impl ReqwestPipelineClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    pub(crate) fn build_client(settings: &ClientSettings) -> Result<reqwest::Client, SubmitError> {
        reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SubmitError::transport(TransportKind::Network, err.to_string()))
    }

    async fn build_form(request: &PipelineRequest) -> Result<Form, SubmitError> {
        let upload = &request.upload;
        let bytes = tokio::fs::read(&upload.path).await.map_err(|err| {
            SubmitError::transport(
                TransportKind::Io,
                format!("failed to read {}: {err}", upload.path.display()),
            )
        })?;
        let media_type = upload.media_type.as_deref().unwrap_or(FALLBACK_MEDIA_TYPE);
        let part = Part::bytes(bytes)
            .file_name(upload.file_name.clone())
            .mime_str(media_type)
            .map_err(|err| SubmitError::transport(TransportKind::Network, err.to_string()))?;

        Ok(Form::new()
            .part("file", part)
            .text("topic", request.topic.clone()))
    }
}

#[async_trait::async_trait]
impl PipelineClient for ReqwestPipelineClient {
    async fn submit(&self, request: &PipelineRequest) -> Result<ReportPayload, SubmitError> {
        let url = reqwest::Url::parse(&self.settings.endpoint).map_err(|err| {
            SubmitError::transport(TransportKind::InvalidEndpoint, err.to_string())
        })?;
        let client = Self::build_client(&self.settings)?;
        let form = Self::build_form(request).await?;

        report_info!(
            "Submitting request {} file={} topic_len={} to {}",
            request.request_id,
            request.upload.file_name,
            request.topic.len(),
            url
        );

        let response = client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = read_capped(response, self.settings.max_response_bytes).await?;
        report_debug!(
            "Request {} answered {} with {} bytes",
            request.request_id,
            status,
            body.len()
        );

        let mut payload = decode_response(status.as_u16(), &body)?;
        if payload.topic.trim().is_empty() {
            payload.topic = request.topic.clone();
        }
        Ok(payload)
    }
}

pub(crate) async fn read_capped(
    response: reqwest::Response,
    max_bytes: u64,
) -> Result<Vec<u8>, SubmitError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(too_large(max_bytes, content_len));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(too_large(max_bytes, next_len));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn too_large(max_bytes: u64, actual: u64) -> SubmitError {
    SubmitError::transport(
        TransportKind::TooLarge,
        format!("response too large (max {max_bytes}, got {actual} bytes)"),
    )
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> SubmitError {
    let kind = if err.is_timeout() {
        TransportKind::Timeout
    } else if err.is_connect() {
        TransportKind::Connect
    } else if err.is_decode() {
        TransportKind::Decode
    } else {
        TransportKind::Network
    };
    SubmitError::transport(kind, error_chain(&err))
}

// Top-level reqwest messages omit the cause, so append the source chain.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
