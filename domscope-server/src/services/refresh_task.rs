//! Background task: periodic refresh of all stored domains

use super::EnrichmentService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Run `refresh_all` every `period`, starting one period from now
///
/// A failed pass is logged and the loop keeps going. Passes never overlap:
/// ticks missed while a pass runs are delayed, not bunched.
pub fn spawn_refresh_task(service: Arc<EnrichmentService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = period.as_secs(), "Periodic refresh started");

        let mut tick = interval(period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        tick.tick().await;

        loop {
            tick.tick().await;

            match service.refresh_all().await {
                Ok(summary) => info!(
                    roots = summary.roots,
                    updated = summary.updated,
                    inserted = summary.inserted,
                    failed = summary.failed,
                    "Periodic refresh finished"
                ),
                Err(e) => error!("Periodic refresh failed: {}", e),
            }
        }
    })
}
