use std::sync::Arc;

use crate::config::AppConfig;
use crate::scrape::DiffScraper;
use crate::services::{Clipboard, ExplanationService, PageHost, SettleStrategy};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub page_host: Arc<dyn PageHost>,
    pub explanation: Arc<dyn ExplanationService>,
    pub settle: Arc<dyn SettleStrategy>,
    pub clipboard: Option<Arc<dyn Clipboard>>,
    pub scraper: Arc<DiffScraper>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        page_host: Arc<dyn PageHost>,
        explanation: Arc<dyn ExplanationService>,
        settle: Arc<dyn SettleStrategy>,
        clipboard: Option<Arc<dyn Clipboard>>,
        scraper: Arc<DiffScraper>,
    ) -> Self {
        Self {
            config,
            page_host,
            explanation,
            settle,
            clipboard,
            scraper,
        }
    }
}
