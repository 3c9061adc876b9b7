use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api_client::ApiClient;
use crate::config::ParseConfig;
use crate::shutdown::Shutdown;
use crate::types::{AppState, FileEntry, FileStatus, OutputFormat, QueueItem};
use crate::worker::{self, WorkerEvent};

pub async fn run(
    queue: Vec<QueueItem>,
    files: Vec<FileEntry>,
    total: usize,
    skipped: usize,
    num_workers: usize,
    format: OutputFormat,
    config: &ParseConfig,
    app_start: Instant,
) -> anyhow::Result<()> {
    if queue.is_empty() {
        info!("No PDFs to process.");
        println!("No PDFs to process. All files already converted or none found.");
        return Ok(());
    }

    let api_client = Arc::new(ApiClient::new(config)?);

    let shutdown = Shutdown::install();

    let mut state = AppState::new(files, total, skipped);

    let num_workers = num_workers.min(queue.len());

    // Work distribution channels - one per worker
    let mut work_txs = Vec::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<WorkerEvent>();

    let mut worker_handles = Vec::new();
    for i in 0..num_workers {
        let (work_tx, work_rx) = mpsc::channel::<QueueItem>(1);
        work_txs.push(work_tx);

        let client = api_client.clone();
        let etx = event_tx.clone();
        let shutdown_flag = shutdown.graceful_flag();

        let handle = tokio::spawn(async move {
            worker::run_worker(i, client, format, work_rx, etx, shutdown_flag).await;
        });
        worker_handles.push(handle);
    }
    drop(event_tx); // Drop our copy so channel closes when all workers done

    // Send work items round-robin to workers. Senders move into the
    // distributor so the channels close once distribution completes,
    // signaling workers there's no more work.
    let graceful_flag = shutdown.graceful_flag();
    tokio::spawn(async move {
        let mut worker_idx = 0;
        for item in queue {
            if graceful_flag.load(Ordering::Relaxed) {
                break;
            }
            let tx = &work_txs[worker_idx % work_txs.len()];
            if tx.send(item).await.is_err() {
                break;
            }
            worker_idx += 1;
        }
        // work_txs dropped here, closing all worker channels
    });

    let mut workers_finished = 0;
    let mut first_processing_logged = false;

    loop {
        let deadline = tokio::time::sleep(Duration::from_millis(200));
        tokio::pin!(deadline);

        tokio::select! {
            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(event) => {
                        if !first_processing_logged {
                            if matches!(event, WorkerEvent::Started { .. }) {
                                let startup_ms = app_start.elapsed().as_millis();
                                info!(startup_to_first_processing_ms = startup_ms as u64, "First PDF started processing");
                                first_processing_logged = true;
                            }
                        }
                        handle_worker_event(&mut state, event, &mut workers_finished);
                    }
                    None => break,
                }
            }
            _ = &mut deadline => {}
        }

        if shutdown.is_force() {
            warn!("Force shutdown");
            break;
        }

        if workers_finished >= num_workers {
            break;
        }
    }

    // Print summary
    let stats = &state.stats;
    let elapsed = stats.elapsed();
    println!();
    if shutdown.is_graceful() {
        println!("Interrupted.");
    }
    println!(
        "Done! Completed: {}, Failed: {}, Skipped: {}, Elapsed: {:.1}s",
        stats.completed,
        stats.failed,
        stats.skipped,
        elapsed.as_secs_f32()
    );

    if stats.failed > 0 {
        println!("Failed files:");
        for f in &state.files {
            if let FileStatus::Failed { error, .. } = &f.status {
                println!("  {} - {}", f.filename, error);
            }
        }
        anyhow::bail!("{} file(s) failed to convert", stats.failed);
    }

    Ok(())
}

fn handle_worker_event(state: &mut AppState, event: WorkerEvent, workers_finished: &mut usize) {
    match event {
        WorkerEvent::Started {
            worker_id,
            filename,
        } => {
            debug!(worker_id, file = %filename, "Worker started file");
            if let Some(f) = state.files.iter_mut().find(|f| f.filename == filename) {
                f.status = FileStatus::Processing;
            }
        }
        WorkerEvent::Completed {
            worker_id,
            filename,
            bytes,
            elapsed,
        } => {
            debug!(worker_id, file = %filename, bytes, "Worker completed file");
            if let Some(f) = state.files.iter_mut().find(|f| f.filename == filename) {
                f.status = FileStatus::Completed { duration: elapsed };
            }
            state.stats.completed += 1;
        }
        WorkerEvent::Failed {
            worker_id,
            filename,
            error,
            elapsed,
        } => {
            debug!(worker_id, file = %filename, "Worker failed file");
            if let Some(f) = state.files.iter_mut().find(|f| f.filename == filename) {
                f.status = FileStatus::Failed {
                    error,
                    duration: elapsed,
                };
            }
            state.stats.failed += 1;
        }
        WorkerEvent::Finished { worker_id } => {
            debug!(worker_id, "Worker finished");
            *workers_finished += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry(name: &str) -> FileEntry {
        FileEntry {
            filename: name.to_string(),
            status: FileStatus::Pending,
        }
    }

    #[test]
    fn test_handle_worker_events() {
        let mut state = AppState::new(vec![entry("a.md"), entry("b.md")], 2, 0);
        let mut finished = 0;

        handle_worker_event(
            &mut state,
            WorkerEvent::Started {
                worker_id: 0,
                filename: "a.md".into(),
            },
            &mut finished,
        );
        assert_eq!(state.files[0].status, FileStatus::Processing);

        handle_worker_event(
            &mut state,
            WorkerEvent::Completed {
                worker_id: 0,
                filename: "a.md".into(),
                bytes: 10,
                elapsed: Duration::from_secs(1),
            },
            &mut finished,
        );
        assert_eq!(state.stats.completed, 1);

        handle_worker_event(
            &mut state,
            WorkerEvent::Failed {
                worker_id: 1,
                filename: "b.md".into(),
                error: "boom".into(),
                elapsed: Duration::from_secs(1),
            },
            &mut finished,
        );
        assert_eq!(state.stats.failed, 1);
        assert!(matches!(state.files[1].status, FileStatus::Failed { .. }));

        handle_worker_event(
            &mut state,
            WorkerEvent::Finished { worker_id: 0 },
            &mut finished,
        );
        assert_eq!(finished, 1);
    }
}
