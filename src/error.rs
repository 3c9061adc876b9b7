use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{var} environment variable is not set")]
    MissingApiKey { var: &'static str },
}

/// Errors while resolving inputs into a work queue.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("Input path does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("Input file must be a PDF: {0}")]
    NotAPdf(PathBuf),

    #[error("Failed to create output directory {path}: {source}")]
    CreateOutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Server returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Parse job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    #[error("Parse job did not finish within {0}s")]
    Timeout(u64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No content was extracted from the document")]
    EmptyResult,
}
