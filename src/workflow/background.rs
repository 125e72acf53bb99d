//! The background context: answers explain requests by calling the explanation
//! service and relaying its raw reply to the popup.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::bus::{Inbox, Message, MessageBus};
use crate::domain::diff::ChangeSummary;
use crate::error::{AppError, AppResult};
use crate::services::ExplanationService;

pub struct ExplanationRelay {
    service: Arc<dyn ExplanationService>,
    timeout: Option<Duration>,
}

impl ExplanationRelay {
    pub fn new(service: Arc<dyn ExplanationService>, timeout: Option<Duration>) -> Self {
        Self { service, timeout }
    }

    pub async fn run(self, mut inbox: Inbox, bus: MessageBus) {
        while let Some(message) = inbox.recv().await {
            match message {
                Message::ExplainChanges { changes } => {
                    let reply = match self.explain(&changes).await {
                        Ok(explanation_raw) => Message::ExplanationToPopup { explanation_raw },
                        Err(err) => {
                            warn!(error = %err, "explanation request failed");
                            Message::error(format!("Failed to generate explanation: {err}"))
                        }
                    };
                    bus.send(reply);
                }
                other => debug!(kind = other.kind(), "background ignores message"),
            }
        }
    }

    pub async fn explain(&self, changes: &[ChangeSummary]) -> AppResult<String> {
        info!(files = changes.len(), "requesting explanation");
        let request = self.service.explain(changes);
        match self.timeout {
            Some(limit) => timeout(limit, request).await.map_err(|_| {
                AppError::ExplanationService(format!(
                    "no explanation received within {}s",
                    limit.as_secs_f32()
                ))
            })?,
            None => request.await,
        }
    }
}
