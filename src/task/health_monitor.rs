//! Background task that refreshes health check results.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use log::debug;
use log::info;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::service::health_service::HealthService;

/// Task that periodically runs every health check.
pub struct HealthMonitor {
    service: Arc<HealthService>,
    interval: Duration,
    running: AtomicBool,
    /// The single live check loop, if started.
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl HealthMonitor {
    pub fn new(service: Arc<HealthService>, interval: Duration) -> Arc<Self> {
        info!("Initializing HealthMonitor with interval {:?}", interval);
        Arc::new(Self {
            service,
            interval,
            running: AtomicBool::new(false),
            handle: Mutex::new(None),
        })
    }

    /// Starts the check loop. The first round runs immediately.
    pub async fn start(self: Arc<Self>) {
        let mut handle = self.handle.lock().await;
        if handle.is_some() {
            return;
        }
        info!("Starting HealthMonitor check loop.");
        self.running.store(true, Ordering::SeqCst);
        *handle = Some(self.clone().spawn_check_loop());
    }

    /// Stops the check loop, cancelling a round in progress.
    pub async fn stop(&self) {
        let mut handle = self.handle.lock().await;
        if let Some(task) = handle.take() {
            info!("Stopping HealthMonitor check loop.");
            task.abort();
        }
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn spawn_check_loop(self: Arc<Self>) -> JoinHandle<()> {
        let mut interval = tokio::time::interval(self.interval);
        tokio::spawn(async move {
            loop {
                interval.tick().await;
                debug!("Running health checks.");
                self.service.run_checks().await;
            }
        })
    }
}
