use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::popup::{NotificationLevel, Popup};
use crate::workflow::cycle::run_extraction_cycle;

#[derive(Debug, Clone)]
pub struct ExtractCommandArgs {
    pub output: Option<PathBuf>,
    pub copy: bool,
}

pub async fn run(ctx: &AppContext, args: ExtractCommandArgs) -> AppResult<Popup> {
    let mut popup = Popup::new();
    run_extraction_cycle(ctx, &mut popup).await;

    if args.copy {
        if let Some(clipboard) = &ctx.clipboard {
            popup.copy_review_message(clipboard.as_ref()).await;
        }
    }

    let page = popup.render_page();
    match &args.output {
        Some(path) => fs::write(path, page)?,
        None => print!("{page}"),
    }

    Ok(popup)
}

/// Prints notifications, and the review message when the page went to a file.
///
/// With the page on stdout everything here goes to `err` so the page stays intact.
pub fn report(
    popup: &Popup,
    args: &ExtractCommandArgs,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<()> {
    let page_on_stdout = args.output.is_none();
    for notification in popup.notifications() {
        let stream: &mut dyn Write = match notification.level {
            NotificationLevel::Success if !page_on_stdout => &mut *out,
            _ => &mut *err,
        };
        writeln!(stream, "{}: {}", notification.title, notification.message)?;
    }

    if let Some(path) = &args.output {
        writeln!(out, "Popup written to {}", path.display())?;
        if let Some(message) = popup.review_message() {
            writeln!(out, "\n{message}")?;
        }
    }
    Ok(())
}
