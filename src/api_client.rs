use std::path::Path;
use std::time::Duration;

use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::ParseConfig;
use crate::error::ApiError;
use crate::types::{
    JobStatus, JobStatusResponse, MarkdownResult, OutputFormat, TextResult, UploadResponse,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RETRIES: u32 = 3;

// Parse options sent with every upload.
const PREMIUM_MODE: bool = true;
const CONTINUOUS_MODE: bool = true;

pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    job_timeout: Duration,
    poll_interval: Duration,
}

impl ApiClient {
    pub fn new(config: &ParseConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.job_timeout)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            job_timeout: config.job_timeout,
            poll_interval: config.poll_interval,
        })
    }

    /// Run one full parse cycle for a PDF: upload, poll the job to
    /// completion, fetch the result in the requested format.
    pub async fn convert(
        &self,
        pdf_path: &Path,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let pdf_bytes = tokio::fs::read(pdf_path).await.map_err(|e| ApiError::Read {
            path: pdf_path.to_path_buf(),
            source: e,
        })?;

        let filename = pdf_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let mut last_error = None;
        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let backoff = Duration::from_secs(1 << attempt);
                warn!(attempt, backoff_secs = backoff.as_secs(), "Retrying...");
                tokio::time::sleep(backoff).await;
            }

            match self.try_convert(&pdf_bytes, &filename, format).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    if !is_retryable(&e) {
                        return Err(e);
                    }
                    debug!(attempt, error = %e, "Retryable error");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap())
    }

    async fn try_convert(
        &self,
        pdf_bytes: &[u8],
        filename: &str,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let deadline = Instant::now() + self.job_timeout;

        let job_id = self.upload(pdf_bytes, filename).await?;
        debug!(job_id = %job_id, "Upload accepted");

        self.wait_for_job(&job_id, deadline).await?;
        self.fetch_result(&job_id, format).await
    }

    async fn upload(&self, pdf_bytes: &[u8], filename: &str) -> Result<String, ApiError> {
        let part = multipart::Part::bytes(pdf_bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(ApiError::Request)?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("premium_mode", PREMIUM_MODE.to_string())
            .text("continuous_mode", CONTINUOUS_MODE.to_string());

        let url = format!("{}/api/parsing/upload", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let resp: UploadResponse = read_json(response).await?;
        if resp.id.is_empty() {
            return Err(ApiError::InvalidResponse(
                "upload response carried an empty job id".into(),
            ));
        }
        Ok(resp.id)
    }

    async fn wait_for_job(&self, job_id: &str, deadline: Instant) -> Result<(), ApiError> {
        let url = format!("{}/api/parsing/job/{job_id}", self.base_url);

        loop {
            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.api_key)
                .send()
                .await?;
            let resp: JobStatusResponse = read_json(response).await?;

            match resp.status {
                JobStatus::Success => return Ok(()),
                JobStatus::Error | JobStatus::Canceled => {
                    return Err(ApiError::JobFailed {
                        job_id: job_id.to_string(),
                        message: resp
                            .error_message
                            .unwrap_or_else(|| "Unknown server error".into()),
                    });
                }
                JobStatus::Pending | JobStatus::Unknown => {
                    debug!(job_id = %job_id, status = ?resp.status, "Job still running");
                }
            }

            if Instant::now() + self.poll_interval >= deadline {
                return Err(ApiError::Timeout(self.job_timeout.as_secs()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn fetch_result(&self, job_id: &str, format: OutputFormat) -> Result<String, ApiError> {
        let url = format!(
            "{}/api/parsing/job/{job_id}/result/{}",
            self.base_url,
            format.result_path()
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let content = match format {
            OutputFormat::Markdown => read_json::<MarkdownResult>(response).await?.markdown,
            OutputFormat::Text => read_json::<TextResult>(response).await?.text,
            OutputFormat::Json => {
                let value: serde_json::Value = read_json(response).await?;
                serde_json::to_string_pretty(&value)
                    .map_err(|e| ApiError::InvalidResponse(e.to_string()))?
            }
        };

        if content.trim().is_empty() {
            return Err(ApiError::EmptyResult);
        }
        Ok(content)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(ApiError::Request)?;

    if !status.is_success() {
        return Err(ApiError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(format!("{e}: {body}")))
}

fn is_retryable(error: &ApiError) -> bool {
    match error {
        ApiError::Request(_) | ApiError::Timeout(_) => true,
        // 429 and server-side failures may clear on a later attempt;
        // other client errors (401, 404, 422) will not.
        ApiError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}
