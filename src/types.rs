use clap::ValueEnum;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Text,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Text => "txt",
            Self::Json => "json",
        }
    }

    /// Result type segment in the job result URL.
    pub fn result_path(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueueItem {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub filename: String,
}

/// Response to the multipart upload: the id of the parse job to poll.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Success,
    Error,
    Canceled,
    // New server-side states degrade to the poll timeout.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownResult {
    pub markdown: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextResult {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    Pending,
    Processing,
    Completed { duration: Duration },
    Failed { error: String, duration: Duration },
    Skipped,
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub filename: String,
    pub status: FileStatus,
}

#[derive(Debug)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub started_at: Instant,
}

impl Stats {
    pub fn new(total: usize, skipped: usize) -> Self {
        Self {
            total,
            completed: 0,
            failed: 0,
            skipped,
            started_at: Instant::now(),
        }
    }

    pub fn processed(&self) -> usize {
        self.completed + self.failed
    }

    pub fn queue_total(&self) -> usize {
        self.total - self.skipped
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[derive(Debug)]
pub struct AppState {
    pub files: Vec<FileEntry>,
    pub stats: Stats,
}

impl AppState {
    pub fn new(files: Vec<FileEntry>, total: usize, skipped: usize) -> Self {
        Self {
            files,
            stats: Stats::new(total, skipped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extensions() {
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Text.extension(), "txt");
        assert_eq!(OutputFormat::Json.extension(), "json");
    }

    #[test]
    fn test_job_status_parsing() {
        let resp: JobStatusResponse = serde_json::from_str(r#"{"status": "SUCCESS"}"#).unwrap();
        assert_eq!(resp.status, JobStatus::Success);
        assert_eq!(resp.error_message, None);

        let resp: JobStatusResponse =
            serde_json::from_str(r#"{"status": "ERROR", "error_message": "bad page"}"#).unwrap();
        assert_eq!(resp.status, JobStatus::Error);
        assert_eq!(resp.error_message.as_deref(), Some("bad page"));

        let resp: JobStatusResponse =
            serde_json::from_str(r#"{"status": "SOMETHING_NEW"}"#).unwrap();
        assert_eq!(resp.status, JobStatus::Unknown);
    }

    #[test]
    fn test_upload_response_parsing() {
        let resp: UploadResponse =
            serde_json::from_str(r#"{"id": "abc-123", "status": "PENDING"}"#).unwrap();
        assert_eq!(resp.id, "abc-123");
    }

    #[test]
    fn test_stats_counters() {
        let mut stats = Stats::new(5, 2);
        stats.completed = 2;
        stats.failed = 1;
        assert_eq!(stats.processed(), 3);
        assert_eq!(stats.queue_total(), 3);
    }
}
