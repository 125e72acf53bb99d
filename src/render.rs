use crate::domain::diff::{ChangeKind, ChangeLine, FileDiff};
use crate::domain::explanation::ExplanationPayload;

/// Escapes text for insertion into HTML element content or quoted attributes.
pub fn escape_html(unsafe_text: &str) -> String {
    let mut escaped = String::with_capacity(unsafe_text.len());
    for ch in unsafe_text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Upper-cases the first character for display; the rest is left as is.
pub fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn render_file_changes(files: &[FileDiff]) -> String {
    let sections = files.iter().map(render_file).collect::<String>();
    format!(r#"<div class="file-container">{sections}</div>"#)
}

fn render_file(file: &FileDiff) -> String {
    let added = file.count(ChangeKind::Added);
    let removed = file.count(ChangeKind::Removed);
    let lines = file.lines.iter().map(render_line).collect::<String>();

    format!(
        r#"
<div class="file-section">
  <div class="file-header">
    <div class="file-info">
      <div class="file-name">{name}</div>
      <div class="file-stats">
        <span class="stat-added">+{added}</span>
        <span class="stat-removed">-{removed}</span>
      </div>
    </div>
  </div>
  <div class="code-content">{lines}</div>
</div>"#,
        name = escape_html(&file.file_name),
    )
}

fn render_line(line: &ChangeLine) -> String {
    let class_name = match line.kind {
        ChangeKind::Added => "added-line",
        ChangeKind::Removed => "removed-line",
        ChangeKind::Unchanged => "unchanged-line",
    };
    format!(
        r#"<div class="code-line {class_name}">{symbol} {text}</div>"#,
        symbol = line.kind.symbol(),
        text = escape_html(&line.text),
    )
}

pub fn render_explanation(payload: &ExplanationPayload) -> String {
    let sections = payload
        .sections
        .iter()
        .map(|(name, points)| {
            let items = points
                .iter()
                .map(|point| format!("<li>{}</li>", escape_html(point)))
                .collect::<String>();
            format!(
                r#"
<div class="explanation-section">
  <h3 class="section-title">{label}</h3>
  <ul class="section-points">{items}</ul>
</div>"#,
                label = escape_html(&title_case(name)),
            )
        })
        .collect::<String>();

    format!(
        r#"<div class="explanation-title">{title}</div>{sections}"#,
        title = escape_html(&payload.title),
    )
}

/// Shown in place of an explanation that failed validation.
pub fn render_explanation_fallback() -> String {
    r#"<div class="error-message">
  <strong>Error processing the explanation</strong>
  <ul>
    <li>The response format was invalid</li>
    <li>Please check the logs for detailed error messages</li>
    <li>Try extracting changes again</li>
  </ul>
</div>"#
        .to_string()
}
