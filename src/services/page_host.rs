use async_trait::async_trait;

use crate::domain::page::{PageAction, Tab};
use crate::error::AppResult;

/// Browser-side automation the extraction cycle drives.
#[async_trait]
pub trait PageHost: Send + Sync {
    async fn query_active_tab(&self) -> AppResult<Tab>;
    async fn reload(&self, tab: &Tab) -> AppResult<()>;
    /// Returns the document markup as an injected script would see it right now.
    async fn read_document(&self, tab: &Tab) -> AppResult<String>;
    async fn perform(&self, tab: &Tab, action: PageAction) -> AppResult<()>;
}
