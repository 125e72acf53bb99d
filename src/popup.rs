//! The presentation context. Holds what the popup currently shows and applies every
//! inbound bus message to it.

use tracing::{debug, info, warn};

use crate::bus::Message;
use crate::domain::explanation::{ExplanationPayload, compose_review_message, validate};
use crate::render::{
    escape_html, render_explanation, render_explanation_fallback, render_file_changes,
};
use crate::services::Clipboard;

const EXTRACT_LABEL: &str = "Extract Changes";
const EXTRACTING_LABEL: &str = "Extracting...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub level: NotificationLevel,
}

#[derive(Debug, Default)]
pub struct Popup {
    extracting: bool,
    file_view: Option<String>,
    explanation_view: Option<String>,
    explanation: Option<ExplanationPayload>,
    review_message: Option<String>,
    notifications: Vec<Notification>,
}

impl Popup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables the extract control. Returns `false` if a cycle is already running.
    pub fn begin_extraction(&mut self) -> bool {
        if self.extracting {
            return false;
        }
        self.extracting = true;
        self.file_view =
            Some(r#"<div class="empty-state">Extracting changes...</div>"#.to_string());
        self.explanation_view = None;
        self.explanation = None;
        self.review_message = None;
        true
    }

    pub fn is_extracting(&self) -> bool {
        self.extracting
    }

    /// Ends a cycle that stopped without an explanation or error message.
    pub fn abandon_extraction(&mut self, reason: &str) {
        self.file_view = Some("Error during extraction".to_string());
        self.notify(
            "Error",
            format!("Error during extraction: {reason}"),
            NotificationLevel::Error,
        );
        self.finish_extraction();
    }

    fn finish_extraction(&mut self) {
        self.extracting = false;
    }

    pub fn handle(&mut self, message: Message) {
        debug!(kind = message.kind(), "popup received message");
        match message {
            Message::FileChanges { files } => {
                if !files.is_empty() {
                    self.file_view = Some(render_file_changes(&files));
                }
            }
            Message::ExplainChanges { .. } => {
                debug!("explain requests are handled by the background context");
            }
            Message::ExplanationResult { explanation_raw }
            | Message::ExplanationToPopup { explanation_raw } => {
                self.show_explanation(&explanation_raw);
                self.finish_extraction();
            }
            Message::Error { message } => {
                self.notify("Error", message, NotificationLevel::Error);
                self.finish_extraction();
            }
        }
    }

    fn show_explanation(&mut self, raw: &str) {
        match validate(raw) {
            Ok(payload) => {
                info!(
                    title = %payload.title,
                    sections = payload.sections.len(),
                    "explanation rendered"
                );
                self.explanation_view = Some(render_explanation(&payload));
                self.review_message = Some(compose_review_message(&payload));
                self.explanation = Some(payload);
            }
            Err(err) => {
                warn!(error = %err, raw, "rejected explanation payload");
                self.explanation_view = Some(render_explanation_fallback());
                self.explanation = None;
                self.review_message = None;
                self.notify(
                    "Error",
                    format!("Failed to process explanation: {err}"),
                    NotificationLevel::Error,
                );
            }
        }
    }

    pub async fn copy_review_message(&mut self, clipboard: &dyn Clipboard) {
        let Some(message) = self.review_message.clone() else {
            self.notify("Error", "No review message to copy", NotificationLevel::Error);
            return;
        };
        match clipboard.write_text(&message).await {
            Ok(()) => self.notify(
                "Success",
                "Message copied to clipboard!",
                NotificationLevel::Success,
            ),
            Err(err) => {
                warn!(error = %err, "failed to copy review message");
                self.notify("Error", "Failed to copy message", NotificationLevel::Error);
            }
        }
    }

    pub fn regenerate_review_message(&mut self) {
        match &self.explanation {
            Some(payload) => {
                self.review_message = Some(compose_review_message(payload));
                self.notify("Success", "Message regenerated!", NotificationLevel::Success);
            }
            None => self.notify(
                "Error",
                "Failed to display review message",
                NotificationLevel::Error,
            ),
        }
    }

    pub fn review_message(&self) -> Option<&str> {
        self.review_message.as_deref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    fn notify(&mut self, title: &str, message: impl Into<String>, level: NotificationLevel) {
        self.notifications.push(Notification {
            title: title.to_string(),
            message: message.into(),
            level,
        });
    }

    pub fn render_page(&self) -> String {
        let (button_attrs, button_label) = if self.extracting {
            (r#" class="loading" disabled"#, EXTRACTING_LABEL)
        } else {
            ("", EXTRACT_LABEL)
        };
        let notifications = self
            .notifications
            .iter()
            .map(|n| {
                let class = match n.level {
                    NotificationLevel::Success => "success",
                    NotificationLevel::Error => "error",
                };
                format!(
                    r#"<div class="notification {class}"><strong>{}</strong> {}</div>"#,
                    escape_html(&n.title),
                    escape_html(&n.message)
                )
            })
            .collect::<String>();
        let hidden = |shown: bool| if shown { "" } else { " hidden" };

        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>prlens</title></head>
<body>
<button id="extractButton"{button_attrs}>{button_label}</button>
<div id="notifications">{notifications}</div>
<div id="fileName">{files}</div>
<div id="explanation" class="card{explanation_hidden}"><div class="explanation-content">{explanation}</div></div>
<div id="reviewMessage" class="card{review_hidden}"><pre id="messageText">{review}</pre></div>
</body>
</html>
"#,
            files = self.file_view.as_deref().unwrap_or_default(),
            explanation_hidden = hidden(self.explanation_view.is_some()),
            explanation = self.explanation_view.as_deref().unwrap_or_default(),
            review_hidden = hidden(self.review_message.is_some()),
            review = escape_html(self.review_message.as_deref().unwrap_or_default()),
        )
    }
}
