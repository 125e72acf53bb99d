use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::bus::{Inbox, MessageBus};
use crate::context::AppContext;
use crate::popup::Popup;
use crate::workflow::background::ExplanationRelay;
use crate::workflow::page::PageScript;

/// Runs one extract → explain round trip and feeds every result into `popup`.
///
/// Returns `false` without doing anything when a cycle is already in flight.
pub async fn run_extraction_cycle(ctx: &AppContext, popup: &mut Popup) -> bool {
    if !popup.begin_extraction() {
        warn!("extraction already in progress");
        return false;
    }

    let (bus, mut inbox, background_inbox) = MessageBus::channel();

    let relay = ExplanationRelay::new(ctx.explanation.clone(), ctx.config.explain_timeout);
    let background = tokio::spawn(relay.run(background_inbox, bus.clone()));

    let script = PageScript::new(
        ctx.page_host.clone(),
        ctx.settle.clone(),
        ctx.scraper.clone(),
        ctx.config.selectors.clone(),
        ctx.config.settle.clone(),
    );
    let page = tokio::spawn(async move { script.run(&bus).await });

    feed_popup(popup, &mut inbox, page, background).await;
    info!("extraction cycle finished");
    true
}

/// Applies inbound messages until the cycle ends, then drains what is already queued.
///
/// A context task that dies without reporting ends the cycle as well.
async fn feed_popup(
    popup: &mut Popup,
    inbox: &mut Inbox,
    mut page: JoinHandle<()>,
    mut background: JoinHandle<()>,
) {
    let mut page_done = false;
    let mut background_done = false;

    while popup.is_extracting() {
        tokio::select! {
            message = inbox.recv() => match message {
                Some(message) => popup.handle(message),
                None => {
                    warn!("message bus closed before the cycle finished");
                    popup.abandon_extraction("message bus closed");
                }
            },
            joined = &mut page, if !page_done => {
                page_done = true;
                if let Err(err) = joined {
                    error!(error = %err, "page task stopped");
                    popup.abandon_extraction("page script stopped unexpectedly");
                }
            }
            joined = &mut background, if !background_done => {
                background_done = true;
                if let Err(err) = joined {
                    error!(error = %err, "background task stopped");
                    popup.abandon_extraction("explanation relay stopped unexpectedly");
                }
            }
        }
    }
    // Anything already queued is newer than what ended the cycle.
    while let Some(message) = inbox.try_recv() {
        popup.handle(message);
    }

    page.abort();
    background.abort();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::bus::Message;
    use crate::config::{AppConfig, StoredConfig};
    use crate::domain::page::{PageAction, Tab};
    use crate::error::AppResult;
    use crate::scrape::DiffScraper;
    use crate::services::{ExplanationService, PageHost};
    use crate::workflow::fakes::{
        FakeExplanation, FakePageHost, InstantSettle, REVIEW_PAGE, VALID_EXPLANATION,
    };

    struct CrashingHost;

    #[async_trait]
    impl PageHost for CrashingHost {
        async fn query_active_tab(&self) -> AppResult<Tab> {
            panic!("tab handle poisoned");
        }

        async fn reload(&self, _tab: &Tab) -> AppResult<()> {
            Ok(())
        }

        async fn read_document(&self, _tab: &Tab) -> AppResult<String> {
            Ok(String::new())
        }

        async fn perform(&self, _tab: &Tab, _action: PageAction) -> AppResult<()> {
            Ok(())
        }
    }

    fn context(page: &str, explanation: Arc<dyn ExplanationService>) -> AppContext {
        context_with_host(Arc::new(FakePageHost::new(page)), explanation)
    }

    fn context_with_host(
        host: Arc<dyn PageHost>,
        explanation: Arc<dyn ExplanationService>,
    ) -> AppContext {
        let config = AppConfig::resolve(StoredConfig::default(), |_| None).expect("config");
        let scraper = Arc::new(DiffScraper::new(&config.selectors).expect("selectors"));
        AppContext::new(
            config,
            host,
            explanation,
            Arc::new(InstantSettle::default()),
            None,
            scraper,
        )
    }

    #[tokio::test]
    async fn renders_changes_explanation_and_review_message() {
        let ctx = context(REVIEW_PAGE, Arc::new(FakeExplanation::replying(VALID_EXPLANATION)));
        let mut popup = Popup::new();

        assert!(run_extraction_cycle(&ctx, &mut popup).await);

        assert!(!popup.is_extracting());
        let page = popup.render_page();
        assert!(page.contains("src/login.rs"));
        assert!(page.contains("check_token();"));
        assert!(page.contains("Swap legacy check for tokens"));
        assert!(page.contains("Risks"));
        assert!(popup
            .review_message()
            .expect("review message")
            .contains("Summary of changes for token login:"));
        assert!(popup.notifications().is_empty());
    }

    #[tokio::test]
    async fn invalid_explanation_falls_back_and_reenables_control() {
        let ctx = context(REVIEW_PAGE, Arc::new(FakeExplanation::replying("{\"title\":1}")));
        let mut popup = Popup::new();

        run_extraction_cycle(&ctx, &mut popup).await;

        assert!(!popup.is_extracting());
        assert!(popup.render_page().contains("Error processing the explanation"));
        assert!(popup.review_message().is_none());
        assert_eq!(popup.notifications().len(), 1);
    }

    #[tokio::test]
    async fn missing_page_structure_ends_the_cycle_with_an_error() {
        let service = Arc::new(FakeExplanation::replying(VALID_EXPLANATION));
        let ctx = context("<html><body></body></html>", service.clone());
        let mut popup = Popup::new();

        run_extraction_cycle(&ctx, &mut popup).await;

        assert!(!popup.is_extracting());
        let notification = &popup.notifications()[0];
        assert!(notification.message.contains("Files tab not found"));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn refuses_to_start_while_a_cycle_is_running() {
        let ctx = context(REVIEW_PAGE, Arc::new(FakeExplanation::replying(VALID_EXPLANATION)));
        let mut popup = Popup::new();
        assert!(popup.begin_extraction());

        assert!(!run_extraction_cycle(&ctx, &mut popup).await);
    }

    #[tokio::test]
    async fn crashed_page_script_ends_the_cycle() {
        let ctx = context_with_host(
            Arc::new(CrashingHost),
            Arc::new(FakeExplanation::replying(VALID_EXPLANATION)),
        );
        let mut popup = Popup::new();

        let finished = tokio::time::timeout(
            Duration::from_secs(2),
            run_extraction_cycle(&ctx, &mut popup),
        )
        .await;

        assert_eq!(finished.ok(), Some(true));
        assert!(!popup.is_extracting());
        assert!(popup.render_page().contains(">Extract Changes</button>"));
        assert!(popup.notifications()[0]
            .message
            .contains("page script stopped unexpectedly"));
    }

    #[tokio::test]
    async fn queued_explanations_are_drained_so_the_newest_is_shown() {
        let (bus, mut inbox, _background_inbox) = MessageBus::channel();
        bus.send(Message::ExplanationToPopup {
            explanation_raw: VALID_EXPLANATION.to_string(),
        });
        bus.send(Message::ExplanationToPopup {
            explanation_raw: r#"{"title":"for the retry","sections":{"summary":["Retry once on timeout"]}}"#
                .to_string(),
        });
        let mut popup = Popup::new();
        popup.begin_extraction();

        let page = tokio::spawn(async {});
        let background = tokio::spawn(std::future::pending::<()>());
        feed_popup(&mut popup, &mut inbox, page, background).await;

        assert!(!popup.is_extracting());
        let page = popup.render_page();
        assert!(page.contains("Retry once on timeout"));
        assert!(!page.contains("Swap legacy check for tokens"));
        let message = popup.review_message().expect("review message");
        assert!(message.contains("Summary of changes for the retry:"));
        assert!(message.contains("- Retry once on timeout"));
    }
}
