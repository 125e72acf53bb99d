use std::time::Duration;

use async_trait::async_trait;

use crate::domain::page::Fingerprint;
use crate::error::AppResult;

/// Source of the page stability signal.
#[async_trait]
pub trait StabilityProbe: Send + Sync {
    async fn fingerprint(&self) -> AppResult<Fingerprint>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Settled { attempts: u32 },
    Waited(Duration),
    Unsettled { attempts: u32 },
}

/// Waits for the page to stop changing after an interaction.
#[async_trait]
pub trait SettleStrategy: Send + Sync {
    /// `budget` is the configured pause for this step; strategies may ignore it.
    async fn settle(&self, probe: &dyn StabilityProbe, budget: Duration)
    -> AppResult<SettleOutcome>;
}
