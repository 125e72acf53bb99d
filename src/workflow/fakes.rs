//! Deterministic stand-ins for the page host, explanation service, settle strategy
//! and clipboard.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::diff::ChangeSummary;
use crate::domain::page::{PageAction, Tab};
use crate::error::{AppError, AppResult};
use crate::services::{
    Clipboard, ExplanationService, PageHost, SettleOutcome, SettleStrategy, StabilityProbe,
};

pub const REVIEW_PAGE: &str = r#"<html><body>
  <div id="__bolt-tab-files">Files</div>
  <div class="repos-changes-viewer">
    <div class="repos-summary-header">
      <div class="body-s secondary-text text-ellipsis">src/login.rs</div>
      <div class="repos-line-content">fn login() {</div>
      <div class="repos-line-content removed">check_legacy();</div>
      <div class="repos-line-content added">check_token();</div>
      <div class="repos-line-content">}</div>
    </div>
    <div class="repos-summary-header">
      <div class="repos-line-content added">unnamed();</div>
    </div>
    <div class="repos-summary-header">
      <div class="body-s secondary-text text-ellipsis">README.md</div>
      <div class="repos-line-content added">Login uses tokens now.</div>
    </div>
  </div>
</body></html>"#;

pub const VALID_EXPLANATION: &str =
    r#"{"title":"for token login","sections":{"summary":["Swap legacy check for tokens"],"risks":["Sessions"]}}"#;

pub struct FakePageHost {
    document: Mutex<String>,
    actions: Mutex<Vec<PageAction>>,
    reloads: Mutex<u32>,
    fail_reload: bool,
}

impl FakePageHost {
    pub fn new(document: &str) -> Self {
        Self {
            document: Mutex::new(document.to_string()),
            actions: Mutex::new(Vec::new()),
            reloads: Mutex::new(0),
            fail_reload: false,
        }
    }

    pub fn failing_reload() -> Self {
        Self {
            fail_reload: true,
            ..Self::new("")
        }
    }

    pub fn actions(&self) -> Vec<PageAction> {
        self.actions.lock().expect("actions lock").clone()
    }

    pub fn reloads(&self) -> u32 {
        *self.reloads.lock().expect("reloads lock")
    }
}

#[async_trait]
impl PageHost for FakePageHost {
    async fn query_active_tab(&self) -> AppResult<Tab> {
        Ok(Tab {
            id: 42,
            url: "https://dev.example.com/pr/1".to_string(),
        })
    }

    async fn reload(&self, _tab: &Tab) -> AppResult<()> {
        if self.fail_reload {
            return Err(AppError::PageHost("tab is gone".to_string()));
        }
        *self.reloads.lock().expect("reloads lock") += 1;
        Ok(())
    }

    async fn read_document(&self, _tab: &Tab) -> AppResult<String> {
        Ok(self.document.lock().expect("document lock").clone())
    }

    async fn perform(&self, _tab: &Tab, action: PageAction) -> AppResult<()> {
        self.actions.lock().expect("actions lock").push(action);
        Ok(())
    }
}

pub struct FakeExplanation {
    reply: Result<String, String>,
    delay: Duration,
    calls: Mutex<Vec<Vec<ChangeSummary>>>,
}

impl FakeExplanation {
    pub fn replying(raw: &str) -> Self {
        Self {
            reply: Ok(raw.to_string()),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            ..Self::replying("")
        }
    }

    pub fn slow(raw: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::replying(raw)
        }
    }

    pub fn calls(&self) -> Vec<Vec<ChangeSummary>> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl ExplanationService for FakeExplanation {
    async fn explain(&self, changes: &[ChangeSummary]) -> AppResult<String> {
        self.calls.lock().expect("calls lock").push(changes.to_vec());
        tokio::time::sleep(self.delay).await;
        self.reply
            .clone()
            .map_err(AppError::ExplanationService)
    }
}

/// Settles immediately and counts how often it was asked.
#[derive(Default)]
pub struct InstantSettle {
    calls: Mutex<Vec<Duration>>,
}

impl InstantSettle {
    pub fn budgets(&self) -> Vec<Duration> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl SettleStrategy for InstantSettle {
    async fn settle(
        &self,
        probe: &dyn StabilityProbe,
        budget: Duration,
    ) -> AppResult<SettleOutcome> {
        probe.fingerprint().await?;
        self.calls.lock().expect("calls lock").push(budget);
        Ok(SettleOutcome::Settled { attempts: 0 })
    }
}

#[derive(Default)]
pub struct RecordingClipboard {
    fail: bool,
    text: Mutex<Option<String>>,
}

impl RecordingClipboard {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn text(&self) -> Option<String> {
        self.text.lock().expect("clipboard lock").clone()
    }
}

#[async_trait]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: &str) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Clipboard("clipboard unavailable".to_string()));
        }
        *self.text.lock().expect("clipboard lock") = Some(text.to_string());
        Ok(())
    }
}
