//! Auto-completion sweep job
//!
//! Periodically flips active events whose date has passed to completed.
//! Every transition goes through the same conditional status update as user
//! cancellation, so a concurrent cancel always wins over the sweep.

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::database::repositories::EventRepository;
use crate::models::event::EventStatus;
use crate::utils::errors::Result;

const SWEEP_PAGE_SIZE: i64 = 100;

/// Background job that completes past events in batches
#[derive(Clone)]
pub struct AutoCompletionSweep {
    events: EventRepository,
}

impl AutoCompletionSweep {
    pub fn new(events: EventRepository) -> Self {
        Self { events }
    }

    /// Run the sweep forever on a fixed interval
    pub async fn run(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match self.run_once().await {
                Ok(0) => {}
                Ok(completed) => info!(completed, "Auto-completion sweep finished"),
                Err(e) => error!(error = %e, "Auto-completion sweep failed"),
            }
        }
    }

    /// Sweep every active event dated before now, one page at a time.
    /// Individual transition failures are logged and skipped so one bad row
    /// cannot stall the rest of the batch.
    pub async fn run_once(&self) -> Result<u64> {
        let now = Utc::now();
        let mut completed = 0u64;

        loop {
            let page = self.events.list_past_active(now, SWEEP_PAGE_SIZE).await?;
            if page.is_empty() {
                break;
            }
            let page_len = page.len() as i64;

            let results = join_all(page.into_iter().map(|event| {
                let events = self.events.clone();
                async move {
                    match events
                        .set_status(event.id, EventStatus::Active, EventStatus::Completed)
                        .await
                    {
                        Ok(Some(_)) => true,
                        // Already cancelled or completed by someone else.
                        Ok(None) => false,
                        Err(e) => {
                            error!(event_id = %event.id, error = %e, "Failed to complete event");
                            false
                        }
                    }
                }
            }))
            .await;

            let flipped = results.into_iter().filter(|ok| *ok).count() as u64;
            completed += flipped;

            // A page where nothing moved would repeat forever; leave the
            // stragglers for the next run.
            if flipped == 0 {
                warn!("Sweep made no progress on current page, deferring to next run");
                break;
            }
            if page_len < SWEEP_PAGE_SIZE {
                break;
            }
        }

        Ok(completed)
    }
}
