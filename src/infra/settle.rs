use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::services::{SettleOutcome, SettleStrategy, StabilityProbe};

/// Sleeps for the step's configured pause without looking at the page.
pub struct FixedDelay;

#[async_trait]
impl SettleStrategy for FixedDelay {
    async fn settle(
        &self,
        _probe: &dyn StabilityProbe,
        budget: Duration,
    ) -> AppResult<SettleOutcome> {
        sleep(budget).await;
        Ok(SettleOutcome::Waited(budget))
    }
}

/// Polls the document fingerprint until two consecutive reads match.
pub struct PollForStability {
    interval: Duration,
    max_attempts: u32,
}

impl PollForStability {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }
}

#[async_trait]
impl SettleStrategy for PollForStability {
    async fn settle(
        &self,
        probe: &dyn StabilityProbe,
        _budget: Duration,
    ) -> AppResult<SettleOutcome> {
        let mut previous = probe.fingerprint().await?;

        for attempt in 1..=self.max_attempts {
            sleep(self.interval).await;
            let current = probe.fingerprint().await?;
            if current == previous {
                debug!(attempt, fingerprint = %current, "page settled");
                return Ok(SettleOutcome::Settled { attempts: attempt });
            }
            previous = current;
        }

        warn!(
            attempts = self.max_attempts,
            "page still changing after max attempts, continuing"
        );
        Ok(SettleOutcome::Unsettled {
            attempts: self.max_attempts,
        })
    }
}
