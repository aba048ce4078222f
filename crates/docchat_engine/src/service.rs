use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::classify::classify_query_failure;
use crate::{Answer, Attachment, FailureKind, ServiceError, UploadReceipt};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const UPLOAD_PATH: &str = "upload";
const QUERY_PATH: &str = "query";
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    /// Whole-request limit. `None` leaves timing to the transport.
    pub request_timeout: Option<Duration>,
    pub max_response_bytes: u64,
}

impl ServiceSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_response_bytes: 1024 * 1024,
        }
    }
}

/// The two endpoints of the remote document service.
#[async_trait::async_trait]
pub trait DocumentService: Send + Sync {
    async fn upload(&self, attachment: &Attachment) -> Result<UploadReceipt, ServiceError>;

    async fn query(
        &self,
        question: &str,
        document_id: Option<&str>,
    ) -> Result<Answer, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    message: String,
    #[serde(default)]
    document_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    user_question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    response: String,
}

#[derive(Debug, Clone)]
pub struct ReqwestDocumentService {
    settings: ServiceSettings,
    client: reqwest::Client,
}

impl ReqwestDocumentService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    fn endpoint(&self, name: &str) -> Result<Url, ServiceError> {
        let mut base = self.settings.base_url.clone();
        // Without a trailing slash `join` would replace the last path segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(name)
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// Reads the body as a stream, failing once it exceeds `max_response_bytes`.
    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, ServiceError> {
        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ServiceError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ServiceError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl DocumentService for ReqwestDocumentService {
    async fn upload(&self, attachment: &Attachment) -> Result<UploadReceipt, ServiceError> {
        let url = self.endpoint(UPLOAD_PATH)?;
        let fingerprint = fingerprint(&attachment.bytes);
        engine_info!(
            "POST {} file={} bytes={} sha256={}",
            url,
            attachment.file_name,
            attachment.bytes.len(),
            fingerprint
        );

        let part = Part::bytes(attachment.bytes.clone())
            .file_name(attachment.file_name.clone())
            .mime_str(&attachment.media_type)
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = self.read_body(response).await?;
        let parsed: UploadResponse = serde_json::from_slice(&body)
            .map_err(|err| ServiceError::new(FailureKind::MalformedResponse, err.to_string()))?;
        Ok(UploadReceipt {
            message: parsed.message,
            document_id: parsed.document_id,
            fingerprint,
        })
    }

    async fn query(
        &self,
        question: &str,
        document_id: Option<&str>,
    ) -> Result<Answer, ServiceError> {
        let url = self.endpoint(QUERY_PATH)?;
        engine_info!(
            "POST {} question_len={} document_id={:?}",
            url,
            question.len(),
            document_id
        );

        let response = self
            .client
            .post(url)
            .json(&QueryRequest {
                user_question: question,
                document_id,
            })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            // An unreadable error body still gets classified, just without detail.
            let body = self.read_body(response).await.unwrap_or_default();
            let kind = classify_query_failure(status.as_u16(), &body);
            engine_debug!("Query rejected with {} classified as {}", status, kind);
            return Err(ServiceError::new(kind, status.to_string()));
        }

        let body = self.read_body(response).await?;
        let parsed: QueryResponse = serde_json::from_slice(&body)
            .map_err(|err| ServiceError::new(FailureKind::MalformedResponse, err.to_string()))?;
        Ok(Answer {
            response: parsed.response,
        })
    }
}

fn fingerprint(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ServiceError::new(FailureKind::InvalidUrl, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
