use std::fmt;

use blake3::Hasher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: u32,
    pub url: String,
}

/// Interactions the page context performs before scraping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    Click(String),
    ScrollToBottom(String),
    ScrollToTop(String),
}

impl PageAction {
    pub fn selector(&self) -> &str {
        match self {
            PageAction::Click(selector)
            | PageAction::ScrollToBottom(selector)
            | PageAction::ScrollToTop(selector) => selector,
        }
    }
}

/// Content hash of a document snapshot, used as the page stability signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(markup: &str) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(markup.as_bytes());
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0[..12])
    }
}
