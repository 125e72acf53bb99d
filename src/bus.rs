//! Fire-and-forget messaging between the page, background and popup contexts.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::domain::diff::{ChangeSummary, FileDiff, deserialize_present};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    FileChanges {
        #[serde(alias = "fileNames", deserialize_with = "deserialize_present")]
        files: Vec<FileDiff>,
    },
    ExplainChanges {
        changes: Vec<ChangeSummary>,
    },
    ExplanationResult {
        #[serde(rename = "explanationRaw", alias = "explanation")]
        explanation_raw: String,
    },
    ExplanationToPopup {
        #[serde(rename = "explanationRaw", alias = "explanation")]
        explanation_raw: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Popup,
    Background,
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::FileChanges { .. } => "FILE_CHANGES",
            Message::ExplainChanges { .. } => "EXPLAIN_CHANGES",
            Message::ExplanationResult { .. } => "EXPLANATION_RESULT",
            Message::ExplanationToPopup { .. } => "EXPLANATION_TO_POPUP",
            Message::Error { .. } => "ERROR",
        }
    }

    pub fn destination(&self) -> Destination {
        match self {
            Message::ExplainChanges { .. } => Destination::Background,
            Message::FileChanges { .. }
            | Message::ExplanationResult { .. }
            | Message::ExplanationToPopup { .. }
            | Message::Error { .. } => Destination::Popup,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Message::Error {
            message: message.into(),
        }
    }
}

/// Sending half shared by every context. Messages are routed by kind.
#[derive(Clone)]
pub struct MessageBus {
    popup: UnboundedSender<Message>,
    background: UnboundedSender<Message>,
}

pub struct Inbox {
    receiver: UnboundedReceiver<Message>,
}

impl MessageBus {
    /// Returns the bus with the popup and background inboxes, in that order.
    pub fn channel() -> (Self, Inbox, Inbox) {
        let (popup, popup_rx) = mpsc::unbounded_channel();
        let (background, background_rx) = mpsc::unbounded_channel();
        (
            Self { popup, background },
            Inbox { receiver: popup_rx },
            Inbox { receiver: background_rx },
        )
    }

    /// Delivery is best effort; a closed inbox only logs.
    pub fn send(&self, message: Message) {
        let destination = message.destination();
        let kind = message.kind();
        let sender = match destination {
            Destination::Popup => &self.popup,
            Destination::Background => &self.background,
        };
        match sender.send(message) {
            Ok(()) => debug!(kind, ?destination, "message sent"),
            Err(_) => warn!(kind, ?destination, "receiver closed, message dropped"),
        }
    }
}

impl Inbox {
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Takes an already queued message without waiting.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }
}
