use async_trait::async_trait;

use crate::domain::diff::ChangeSummary;
use crate::error::AppResult;

/// Turns change summaries into explanation text. The reply is untrusted and is
/// validated by the popup before use.
#[async_trait]
pub trait ExplanationService: Send + Sync {
    async fn explain(&self, changes: &[ChangeSummary]) -> AppResult<String>;
}
