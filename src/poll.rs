use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::service::SchemaServiceClient;
use crate::surface::AdminSurface;

/// Shared flag recording whether a poll loop is currently running.
#[derive(Debug, Default)]
pub struct PollState {
    active: AtomicBool,
}

impl PollState {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Watches the schema service for the transition from "nothing loaded" to
/// "at least one schema stored" and reloads the view exactly once when it
/// happens.
///
/// A reload replaces the whole view, so the loop is terminal on success;
/// the restarted view decides for itself whether to poll again.
pub struct PollingMonitor {
    client: SchemaServiceClient,
    surface: Arc<dyn AdminSurface>,
    interval: Duration,
    state: Arc<PollState>,
}

impl PollingMonitor {
    pub fn new(
        client: SchemaServiceClient,
        surface: Arc<dyn AdminSurface>,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            surface,
            interval,
            state: Arc::new(PollState::default()),
        }
    }

    pub fn state(&self) -> Arc<PollState> {
        Arc::clone(&self.state)
    }

    /// Start the poll loop. Returns `None` without polling when schemas are
    /// already loaded, or when a loop is already running.
    pub fn start(&self, already_loaded: bool) -> Option<JoinHandle<()>> {
        if already_loaded {
            return None;
        }
        if self
            .state
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }

        let client = self.client.clone();
        let surface = Arc::clone(&self.surface);
        let state = Arc::clone(&self.state);
        let interval = self.interval;
        Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                t_counter!("mockboard_poll_ticks_total").increment(1);
                match client.list_schemas().await {
                    Ok(schemas) if !schemas.is_empty() => {
                        t_counter!("mockboard_poll_reloads_total").increment(1);
                        tracing::info!(count = schemas.len(), "schemas detected, reloading view");
                        surface.reload();
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        t_counter!("mockboard_poll_failures_total").increment(1);
                        tracing::warn!(error = %err, "schema status poll failed");
                    }
                }
            }
            state.active.store(false, Ordering::SeqCst);
        }))
    }
}
