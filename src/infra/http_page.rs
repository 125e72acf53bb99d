use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::page::{PageAction, Tab};
use crate::error::{AppError, AppResult};
use crate::services::PageHost;

/// Treats a review URL as the active tab. `reload` fetches a fresh copy of the page.
pub struct HttpPageHost {
    http: Client,
    url: String,
    document: RwLock<Option<String>>,
}

impl HttpPageHost {
    pub fn new(url: String) -> Self {
        Self {
            http: Client::new(),
            url,
            document: RwLock::new(None),
        }
    }

    async fn fetch(&self) -> AppResult<String> {
        let response = self
            .http
            .get(&self.url)
            .header(ACCEPT, "text/html")
            .send()
            .await
            .map_err(|err| AppError::PageHost(format!("failed to load {}: {err}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::PageHost(format!(
                "{} responded with {status}",
                self.url
            )));
        }

        response
            .text()
            .await
            .map_err(|err| AppError::PageHost(format!("failed to read {}: {err}", self.url)))
    }
}

#[async_trait]
impl PageHost for HttpPageHost {
    async fn query_active_tab(&self) -> AppResult<Tab> {
        Ok(Tab {
            id: 1,
            url: self.url.clone(),
        })
    }

    async fn reload(&self, tab: &Tab) -> AppResult<()> {
        let body = self.fetch().await?;
        info!(url = %tab.url, bytes = body.len(), "page reloaded");
        *self.document.write().await = Some(body);
        Ok(())
    }

    async fn read_document(&self, _tab: &Tab) -> AppResult<String> {
        if let Some(body) = self.document.read().await.as_ref() {
            return Ok(body.clone());
        }
        let body = self.fetch().await?;
        *self.document.write().await = Some(body.clone());
        Ok(body)
    }

    async fn perform(&self, tab: &Tab, action: PageAction) -> AppResult<()> {
        debug!(
            tab = tab.id,
            selector = action.selector(),
            ?action,
            "fetched page has no live script, interaction skipped"
        );
        Ok(())
    }
}
