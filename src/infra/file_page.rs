use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::domain::page::{PageAction, Tab};
use crate::error::{AppError, AppResult};
use crate::services::PageHost;

/// Serves a saved review page from disk. Every read goes back to the file, so an
/// editor or a sync job rewriting it behaves like a live page.
pub struct FilePageHost {
    path: PathBuf,
}

impl FilePageHost {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PageHost for FilePageHost {
    async fn query_active_tab(&self) -> AppResult<Tab> {
        Ok(Tab {
            id: 1,
            url: format!("file://{}", self.path.display()),
        })
    }

    async fn reload(&self, tab: &Tab) -> AppResult<()> {
        fs::metadata(&self.path).await.map_err(|err| {
            AppError::PageHost(format!("cannot reload {}: {err}", tab.url))
        })?;
        Ok(())
    }

    async fn read_document(&self, tab: &Tab) -> AppResult<String> {
        fs::read_to_string(&self.path)
            .await
            .map_err(|err| AppError::PageHost(format!("cannot read {}: {err}", tab.url)))
    }

    async fn perform(&self, tab: &Tab, action: PageAction) -> AppResult<()> {
        debug!(
            tab = tab.id,
            selector = action.selector(),
            ?action,
            "static page, interaction skipped"
        );
        Ok(())
    }
}
