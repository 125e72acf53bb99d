pub mod clipboard;
pub mod explanation;
pub mod page_host;
pub mod settle;

pub use clipboard::Clipboard;
pub use explanation::ExplanationService;
pub use page_host::PageHost;
pub use settle::{SettleOutcome, SettleStrategy, StabilityProbe};
