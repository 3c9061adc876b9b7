use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

/// Two-stage Ctrl-C handling: the first signal drains in-flight work, the
/// second aborts the run.
pub struct Shutdown {
    graceful: Arc<AtomicBool>,
    force: Arc<AtomicBool>,
}

impl Shutdown {
    /// Create the controller and spawn its signal listener.
    pub fn install() -> Self {
        let shutdown = Self {
            graceful: Arc::new(AtomicBool::new(false)),
            force: Arc::new(AtomicBool::new(false)),
        };

        let graceful = shutdown.graceful.clone();
        let force = shutdown.force.clone();
        tokio::spawn(async move {
            let mut first = true;
            loop {
                tokio::signal::ctrl_c().await.ok();
                if first {
                    info!("Graceful shutdown requested. Press Ctrl+C again to force quit.");
                    graceful.store(true, Ordering::Relaxed);
                    first = false;
                } else {
                    info!("Force shutdown.");
                    force.store(true, Ordering::Relaxed);
                    return;
                }
            }
        });

        shutdown
    }

    /// Flag handed to workers and the distributor.
    pub fn graceful_flag(&self) -> Arc<AtomicBool> {
        self.graceful.clone()
    }

    pub fn is_graceful(&self) -> bool {
        self.graceful.load(Ordering::Relaxed)
    }

    pub fn is_force(&self) -> bool {
        self.force.load(Ordering::Relaxed)
    }
}
