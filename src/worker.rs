use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::api_client::ApiClient;
use crate::types::{OutputFormat, QueueItem};

#[derive(Debug)]
pub enum WorkerEvent {
    Started {
        worker_id: usize,
        filename: String,
    },
    Completed {
        worker_id: usize,
        filename: String,
        bytes: usize,
        elapsed: std::time::Duration,
    },
    Failed {
        worker_id: usize,
        filename: String,
        error: String,
        elapsed: std::time::Duration,
    },
    Finished {
        worker_id: usize,
    },
}

pub async fn run_worker(
    worker_id: usize,
    api_client: Arc<ApiClient>,
    format: OutputFormat,
    mut work_rx: mpsc::Receiver<QueueItem>,
    event_tx: mpsc::UnboundedSender<WorkerEvent>,
    shutdown: Arc<AtomicBool>,
) {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        let item = match work_rx.recv().await {
            Some(item) => item,
            None => break, // Channel closed, no more work
        };

        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        let filename = item.filename.clone();
        let _ = event_tx.send(WorkerEvent::Started {
            worker_id,
            filename: filename.clone(),
        });

        let started = Instant::now();

        match api_client.convert(&item.source_path, format).await {
            Ok(content) => {
                let elapsed = started.elapsed();
                match write_output(&item, &content).await {
                    Ok(()) => {
                        info!(
                            file = %filename,
                            bytes = content.len(),
                            elapsed_secs = elapsed.as_secs_f32(),
                            "Converted"
                        );
                        let _ = event_tx.send(WorkerEvent::Completed {
                            worker_id,
                            filename,
                            bytes: content.len(),
                            elapsed,
                        });
                    }
                    Err(e) => {
                        error!(path = %item.output_path.display(), error = %e, "Failed to write output");
                        let _ = event_tx.send(WorkerEvent::Failed {
                            worker_id,
                            filename,
                            error: format!("Write failed: {e}"),
                            elapsed,
                        });
                    }
                }
            }
            Err(e) => {
                let elapsed = started.elapsed();
                error!(file = %filename, error = %e, "Conversion failed");
                let _ = event_tx.send(WorkerEvent::Failed {
                    worker_id,
                    filename,
                    error: e.to_string(),
                    elapsed,
                });
            }
        }
    }

    let _ = event_tx.send(WorkerEvent::Finished { worker_id });
}

async fn write_output(item: &QueueItem, content: &str) -> std::io::Result<()> {
    if let Some(parent) = item.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&item.output_path, content).await
}
