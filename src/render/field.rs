use serde_json::Value;

use crate::submission::answer::{Answer, FileAttachment, Scalar, looks_like_url};
use crate::submission::payload::Field;

use super::{escape_html, newlines_to_br};

const TABLE_KEY_STYLE: &str = "padding:6px 10px;border:1px solid #eee;background:#fafafa;";
const TABLE_VALUE_STYLE: &str = "padding:6px 10px;border:1px solid #eee;";

/// Render one field's value as a safe HTML fragment. Pure and deterministic;
/// all text is escaped before embedding.
pub fn render_html(field: &Field) -> String {
    match Answer::classify(field) {
        Answer::Files(files) => render_files(&files),
        Answer::Choices(labels) => {
            if labels.is_empty() {
                "<em>(none selected)</em>".to_string()
            } else {
                labels
                    .iter()
                    .map(|l| escape_html(l))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }
        Answer::Ranking(labels) => {
            if labels.is_empty() {
                "<em>(none selected)</em>".to_string()
            } else {
                let items: Vec<String> = labels.iter().map(|l| escape_html(l)).collect();
                format!("<ol><li>{}</li></ol>", items.join("</li><li>"))
            }
        }
        Answer::Matrix(rows) => {
            if rows.is_empty() {
                return "<em>(empty)</em>".to_string();
            }
            let lines: Vec<String> = rows
                .iter()
                .map(|row| {
                    let label = escape_html(&row.label);
                    let chosen = if row.columns.is_empty() {
                        "<em>(none)</em>".to_string()
                    } else {
                        row.columns
                            .iter()
                            .map(|c| escape_html(c))
                            .collect::<Vec<_>>()
                            .join(", ")
                    };
                    format!("<strong>{label}:</strong> {chosen}")
                })
                .collect();
            lines.join("<br>")
        }
        Answer::List(items) => {
            let items: Vec<String> = items.iter().map(scalar_html).collect();
            format!("<ul><li>{}</li></ul>", items.join("</li><li>"))
        }
        Answer::Object(entries) => {
            let rows: Vec<String> = entries
                .iter()
                .map(|(key, value)| {
                    format!(
                        "<tr><td style=\"{TABLE_KEY_STYLE}\"><code>{}</code></td>\
                         <td style=\"{TABLE_VALUE_STYLE}\">{}</td></tr>",
                        escape_html(key),
                        scalar_html(value)
                    )
                })
                .collect();
            format!(
                "<table cellpadding=\"0\" cellspacing=\"0\" style=\"border-collapse:collapse;\">{}</table>",
                rows.concat()
            )
        }
        Answer::Scalar(scalar) => scalar_html(&scalar),
    }
}

/// Plaintext form of a field's value for the text/plain part. Raw, never
/// escaped; still-nested values serialize as compact JSON.
pub fn render_text(field: &Field) -> String {
    match &field.value {
        Value::Null => String::new(),
        Value::Bool(b) => (if *b { "Yes" } else { "No" }).to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        nested => nested.to_string(),
    }
}

fn render_files(files: &[FileAttachment]) -> String {
    if files.is_empty() {
        return "<em>(no files)</em>".to_string();
    }
    let items: Vec<String> = files
        .iter()
        .map(|file| {
            let name = escape_html(&file.name);
            let size = file
                .size
                .as_deref()
                .map(|s| format!(" ({} bytes)", escape_html(s)))
                .unwrap_or_default();
            // Only link http(s) urls; anything else renders as bare text.
            match file.url.as_deref().filter(|u| looks_like_url(u)) {
                Some(url) => format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{name}</a>{size}",
                    escape_html(url)
                ),
                None => format!("{name}{size}"),
            }
        })
        .collect();
    format!("<ul><li>{}</li></ul>", items.join("</li><li>"))
}

fn scalar_html(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Empty => "<em>(empty)</em>".to_string(),
        Scalar::Bool(true) => "Yes".to_string(),
        Scalar::Bool(false) => "No".to_string(),
        Scalar::Number(n) => escape_html(n),
        Scalar::Link(url) => {
            let escaped = escape_html(url);
            format!(
                "<a href=\"{escaped}\" target=\"_blank\" rel=\"noopener noreferrer\">{escaped}</a>"
            )
        }
        Scalar::Text(text) => newlines_to_br(&escape_html(text)),
    }
}
