//! The page-interaction context: drives the review page into a scrapeable state and
//! reports what it found over the bus.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use tracing::{info, warn};

use crate::bus::{Message, MessageBus};
use crate::config::{PageSelectors, SettleConfig};
use crate::domain::diff::{FileDiff, summarize};
use crate::domain::page::{Fingerprint, PageAction, Tab};
use crate::error::{AppError, AppResult};
use crate::scrape::DiffScraper;
use crate::services::{PageHost, SettleStrategy, StabilityProbe};

pub const FILES_TAB_MISSING: &str =
    "Files tab not found - please make sure you're on the correct page";
pub const VIEWER_MISSING: &str =
    "Viewer element not found - please make sure you're on a diff view";

pub struct PageScript {
    host: Arc<dyn PageHost>,
    settle: Arc<dyn SettleStrategy>,
    scraper: Arc<DiffScraper>,
    selectors: PageSelectors,
    timing: SettleConfig,
}

struct DocumentProbe<'a> {
    host: &'a dyn PageHost,
    tab: &'a Tab,
}

#[async_trait]
impl StabilityProbe for DocumentProbe<'_> {
    async fn fingerprint(&self) -> AppResult<Fingerprint> {
        let markup = self.host.read_document(self.tab).await?;
        Ok(Fingerprint::of(&markup))
    }
}

impl PageScript {
    pub fn new(
        host: Arc<dyn PageHost>,
        settle: Arc<dyn SettleStrategy>,
        scraper: Arc<DiffScraper>,
        selectors: PageSelectors,
        timing: SettleConfig,
    ) -> Self {
        Self {
            host,
            settle,
            scraper,
            selectors,
            timing,
        }
    }

    /// Runs one extraction. Failures are reported as `ERROR` messages, never returned.
    pub async fn run(&self, bus: &MessageBus) {
        match self.extract().await {
            Ok(files) => {
                info!(files = files.len(), "extracted file changes");
                let changes = summarize(&files);
                bus.send(Message::FileChanges { files });
                bus.send(Message::ExplainChanges { changes });
            }
            Err(err) => {
                warn!(error = %err, "extraction failed");
                bus.send(Message::error(user_message(&err)));
            }
        }
    }

    pub async fn extract(&self) -> AppResult<Vec<FileDiff>> {
        let tab = self.host.query_active_tab().await?;
        self.host.reload(&tab).await?;
        self.wait(&tab, self.timing.reload_delay, "reload").await?;

        let document = self.host.read_document(&tab).await?;
        if !self.inspect(&document, DiffScraper::has_files_tab) {
            return Err(AppError::ScrapeTargetMissing(FILES_TAB_MISSING.to_string()));
        }
        self.host
            .perform(&tab, PageAction::Click(self.selectors.files_tab.clone()))
            .await?;
        self.wait(&tab, self.timing.tab_delay, "files tab").await?;

        let document = self.host.read_document(&tab).await?;
        if !self.inspect(&document, DiffScraper::has_changes_viewer) {
            return Err(AppError::ScrapeTargetMissing(VIEWER_MISSING.to_string()));
        }
        let viewer = self.selectors.changes_viewer.clone();
        self.host
            .perform(&tab, PageAction::ScrollToBottom(viewer.clone()))
            .await?;
        self.wait(&tab, self.timing.scroll_delay, "scroll").await?;
        self.host
            .perform(&tab, PageAction::ScrollToTop(viewer))
            .await?;

        let document = self.host.read_document(&tab).await?;
        Ok(self.inspect(&document, DiffScraper::scrape))
    }

    async fn wait(&self, tab: &Tab, budget: Duration, step: &str) -> AppResult<()> {
        let probe = DocumentProbe {
            host: self.host.as_ref(),
            tab,
        };
        let outcome = self.settle.settle(&probe, budget).await?;
        info!(step, ?outcome, "page settle finished");
        Ok(())
    }

    // `Html` is not `Send`, so it never lives across an await point.
    fn inspect<T>(&self, markup: &str, read: impl FnOnce(&DiffScraper, &Html) -> T) -> T {
        let document = Html::parse_document(markup);
        read(&self.scraper, &document)
    }
}

fn user_message(err: &AppError) -> String {
    match err {
        AppError::ScrapeTargetMissing(hint) => hint.clone(),
        other => format!("Error during extraction: {other}"),
    }
}
