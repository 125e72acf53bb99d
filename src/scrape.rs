//! Reads diff blocks out of a review page.
//!
//! Every header block yields one [`FileDiff`] when it carries a file-name label; blocks
//! without one are skipped. Lines keep document order and are classified by their
//! `added` / `removed` class markers.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::config::PageSelectors;
use crate::domain::diff::{ChangeKind, ChangeLine, FileDiff};
use crate::error::{AppError, AppResult};

pub struct DiffScraper {
    summary_header: Selector,
    file_name: Selector,
    line_content: Selector,
    files_tab: Selector,
    changes_viewer: Selector,
    added_class: String,
    removed_class: String,
}

impl DiffScraper {
    pub fn new(selectors: &PageSelectors) -> AppResult<Self> {
        Ok(Self {
            summary_header: parse_selector(&selectors.summary_header)?,
            file_name: parse_selector(&selectors.file_name)?,
            line_content: parse_selector(&selectors.line_content)?,
            files_tab: parse_selector(&selectors.files_tab)?,
            changes_viewer: parse_selector(&selectors.changes_viewer)?,
            added_class: selectors.added_class.clone(),
            removed_class: selectors.removed_class.clone(),
        })
    }

    pub fn has_files_tab(&self, document: &Html) -> bool {
        document.select(&self.files_tab).next().is_some()
    }

    pub fn has_changes_viewer(&self, document: &Html) -> bool {
        document.select(&self.changes_viewer).next().is_some()
    }

    pub fn scrape(&self, document: &Html) -> Vec<FileDiff> {
        let files = document
            .select(&self.summary_header)
            .enumerate()
            .filter_map(|(index, header)| self.scrape_block(index, header))
            .collect::<Vec<_>>();
        debug!(files = files.len(), "scraped diff blocks");
        files
    }

    fn scrape_block(&self, index: usize, header: ElementRef<'_>) -> Option<FileDiff> {
        let Some(label) = header.select(&self.file_name).next() else {
            warn!(block = index, "no file name found for diff block, skipping");
            return None;
        };

        let lines = header
            .select(&self.line_content)
            .filter_map(|code| {
                let classes = code.value().classes().collect::<Vec<_>>();
                let kind = ChangeKind::classify(
                    classes.contains(&self.added_class.as_str()),
                    classes.contains(&self.removed_class.as_str()),
                );
                ChangeLine::parse(kind, &code.text().collect::<String>())
            })
            .collect();

        Some(FileDiff {
            file_name: label.text().collect::<String>().trim().to_string(),
            lines,
        })
    }
}

fn parse_selector(raw: &str) -> AppResult<Selector> {
    Selector::parse(raw)
        .map_err(|err| AppError::Configuration(format!("invalid page selector '{raw}': {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> DiffScraper {
        DiffScraper::new(&PageSelectors::default()).expect("default selectors parse")
    }

    fn block(name: Option<&str>, lines: &[(&str, &str)]) -> String {
        let label = name
            .map(|name| format!(r#"<div class="body-s secondary-text text-ellipsis">{name}</div>"#))
            .unwrap_or_default();
        let rows = lines
            .iter()
            .map(|(class, text)| format!(r#"<div class="repos-line-content {class}">{text}</div>"#))
            .collect::<String>();
        format!(r#"<div class="repos-summary-header">{label}{rows}</div>"#)
    }

    fn page(blocks: &[String]) -> Html {
        Html::parse_document(&format!(
            r#"<html><body><div id="__bolt-tab-files"></div>
               <div class="repos-changes-viewer">{}</div></body></html>"#,
            blocks.concat()
        ))
    }

    #[test]
    fn scrapes_named_blocks_in_document_order() {
        let document = page(&[
            block(Some("src/b.rs"), &[("added", "b1")]),
            block(None, &[("added", "orphan")]),
            block(Some("src/a.rs"), &[("removed", "a1"), ("", "a2")]),
        ]);

        let files = scraper().scrape(&document);
        let names = files.iter().map(|f| f.file_name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["src/b.rs", "src/a.rs"]);
        assert!(files.iter().all(|f| f.lines.iter().all(|l| l.text != "orphan")));
    }

    #[test]
    fn classifies_trims_and_drops_blank_lines() {
        let document = page(&[block(
            Some("  lib.rs \n"),
            &[
                ("", "  fn main() {"),
                ("removed", "old();  "),
                ("added", "   "),
                ("added", "new();"),
                ("added removed", "both();"),
                ("", "}"),
            ],
        )]);

        let files = scraper().scrape(&document);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "lib.rs");

        let lines = files[0]
            .lines
            .iter()
            .map(|line| (line.kind, line.text.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            lines,
            [
                (ChangeKind::Unchanged, "fn main() {"),
                (ChangeKind::Removed, "old();"),
                (ChangeKind::Added, "new();"),
                (ChangeKind::Added, "both();"),
                (ChangeKind::Unchanged, "}"),
            ]
        );
    }

    #[test]
    fn collects_nested_line_text() {
        let document = Html::parse_document(
            r#"<div class="repos-summary-header">
                 <span class="body-s secondary-text text-ellipsis"><b>src/</b>main.rs</span>
                 <div class="repos-line-content added"><span>let</span> <span>x = 1;</span></div>
               </div>"#,
        );

        let files = scraper().scrape(&document);
        assert_eq!(files[0].file_name, "src/main.rs");
        assert_eq!(files[0].lines[0].text, "let x = 1;");
    }

    #[test]
    fn detects_page_structure() {
        let scraper = scraper();
        assert!(scraper.has_files_tab(&page(&[])));
        assert!(scraper.has_changes_viewer(&page(&[])));

        let bare = Html::parse_document("<html><body><p>nothing here</p></body></html>");
        assert!(!scraper.has_files_tab(&bare));
        assert!(!scraper.has_changes_viewer(&bare));
        assert!(scraper.scrape(&bare).is_empty());
    }

    #[test]
    fn rejects_invalid_selectors() {
        let selectors = PageSelectors {
            summary_header: "div[".to_string(),
            ..PageSelectors::default()
        };
        assert!(matches!(
            DiffScraper::new(&selectors),
            Err(AppError::Configuration(_))
        ));
    }
}
