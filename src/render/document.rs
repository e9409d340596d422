use std::fmt::Write;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::config::Config;
use crate::submission::payload::{Field, FieldType, SubmissionData, SubmissionPayload, stringify};

use super::{escape_html, field, filter};

pub const SUBJECT_PREFIX: &str = "[Tally Feedback]";

const HIGHLIGHT_LIMIT: usize = 4;

// Inline-styled throughout; email clients strip head-level CSS.
const STYLE_BODY: &str =
    "margin:0;padding:0;background:#f4f5f7;font-family:Arial,Helvetica,sans-serif;color:#111;line-height:1.5;";
const STYLE_WRAP: &str = "max-width:720px;margin:0 auto;padding:24px 16px;";
const STYLE_CARD: &str = "background:#ffffff;border:1px solid #e3e5e8;border-radius:6px;overflow:hidden;";
const STYLE_HEAD: &str = "padding:24px 28px;background:#1f2937;color:#f9fafb;";
const STYLE_TITLE: &str = "margin:0;font-size:22px;line-height:1.3;font-weight:600;";
const STYLE_SUB: &str = "margin:6px 0 0 0;font-size:12px;letter-spacing:0.8px;text-transform:uppercase;color:#9ca3af;";
const STYLE_CHIP: &str =
    "display:inline-block;padding:5px 12px;border-radius:3px;background:#374151;color:#f9fafb;font-size:12px;margin:10px 8px 0 0;";
const STYLE_SECTION: &str = "padding:20px 28px;border-top:1px solid #e3e5e8;";
const STYLE_H2: &str =
    "margin:0 0 12px 0;font-size:12px;color:#6b7280;text-transform:uppercase;letter-spacing:1px;font-weight:600;";
const STYLE_TABLE: &str = "width:100%;border-collapse:collapse;";
const STYLE_META_KEY: &str =
    "padding:8px 10px;border:1px solid #eee;background:#fafafa;width:180px;font-size:13px;";
const STYLE_META_VALUE: &str = "padding:8px 10px;border:1px solid #eee;font-size:14px;";
const STYLE_QUESTION: &str =
    "padding:12px 10px;border-top:1px solid #eee;vertical-align:top;width:240px;background:#fafafa;";
const STYLE_ANSWER: &str = "padding:12px 10px;border-top:1px solid #eee;vertical-align:top;";
const STYLE_LABEL: &str = "font-weight:600;font-size:14px;";
const STYLE_EMPTY: &str = "color:#6b7280;font-style:italic;";
const STYLE_FOOT: &str =
    "padding:16px 28px;background:#fafafa;border-top:1px solid #e3e5e8;font-size:12px;color:#6b7280;text-align:center;";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub date_format: String,
    pub display_offset: FixedOffset,
    pub skip_option_checkboxes: bool,
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            date_format: config.date_format.clone(),
            display_offset: config.display_offset(),
            skip_option_checkboxes: config.skip_option_checkboxes,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            date_format: "%B %-d, %Y %-I:%M %p".to_string(),
            display_offset: FixedOffset::east_opt(0).unwrap(),
            skip_option_checkboxes: true,
        }
    }
}

/// Assemble the full email from a submission payload. Total: every absent or
/// malformed piece degrades to a default, so an email is always producible.
pub fn build(payload: &SubmissionPayload, opts: &RenderOptions) -> RenderedDocument {
    static EMPTY: SubmissionData = SubmissionData {
        form_name: None,
        form_id: None,
        created_at: None,
        submission_id: None,
        response_id: None,
        respondent_id: None,
        fields: Vec::new(),
    };
    let data = payload.data.as_ref().unwrap_or(&EMPTY);

    let form_name = data
        .form_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or("Tally Form");

    let submission_id = data
        .submission_id
        .as_deref()
        .or(data.response_id.as_deref())
        .unwrap_or("");

    let created_raw = data
        .created_at
        .as_deref()
        .or(payload.created_at.as_deref())
        .unwrap_or("");
    let submitted_at = format_timestamp(created_raw, opts);

    let mut meta: Vec<(&str, String)> = vec![("Form", form_name.to_string())];
    if !submitted_at.is_empty() {
        meta.push(("Submitted At", submitted_at));
    }

    let surviving: Vec<&Field> = data
        .fields
        .iter()
        .filter(|f| !(opts.skip_option_checkboxes && filter::is_option_checkbox(f)))
        .collect();

    let subject = if submission_id.is_empty() {
        format!("{SUBJECT_PREFIX} {form_name}")
    } else {
        format!("{SUBJECT_PREFIX} {form_name} (#{submission_id})")
    };

    let html = build_html(form_name, &meta, &highlight_chips(&data.fields), &surviving);
    let text = build_text(form_name, &meta, &surviving);

    RenderedDocument { subject, html, text }
}

/// ISO-8601 timestamp converted to the configured offset and format string;
/// anything unparseable passes through as-is.
fn format_timestamp(raw: &str, opts: &RenderOptions) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt
            .with_timezone(&opts.display_offset)
            .format(&opts.date_format)
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Up to four scan-friendly chips pulled from contact/score field types with
/// non-empty scalar values, in first-seen order.
fn highlight_chips(fields: &[Field]) -> Vec<String> {
    let mut chips = Vec::new();
    for field in fields {
        if chips.len() >= HIGHLIGHT_LIMIT {
            break;
        }
        if !matches!(
            field.field_type,
            FieldType::InputEmail
                | FieldType::InputPhoneNumber
                | FieldType::Rating
                | FieldType::LinearScale
        ) {
            continue;
        }
        let Some(label) = field.label.as_deref().filter(|l| !l.is_empty()) else {
            continue;
        };
        match &field.value {
            Value::Null | Value::Array(_) | Value::Object(_) => continue,
            Value::String(s) if s.is_empty() => continue,
            value => chips.push(format!(
                "{}: <strong>{}</strong>",
                escape_html(label),
                escape_html(&stringify(value))
            )),
        }
    }
    chips
}

fn build_html(
    form_name: &str,
    meta: &[(&str, String)],
    chips: &[String],
    fields: &[&Field],
) -> String {
    let mut meta_rows = String::new();
    for (key, value) in meta {
        let _ = write!(
            meta_rows,
            "<tr><td style=\"{STYLE_META_KEY}\"><strong>{}</strong></td>\
             <td style=\"{STYLE_META_VALUE}\">{}</td></tr>",
            escape_html(key),
            escape_html(value)
        );
    }

    let chips_html = if chips.is_empty() {
        String::new()
    } else {
        let spans: Vec<String> = chips
            .iter()
            .map(|chip| format!("<span style=\"{STYLE_CHIP}\">{chip}</span>"))
            .collect();
        format!("<div>{}</div>", spans.join(" "))
    };

    let mut answer_rows = String::new();
    for field in fields {
        let _ = write!(
            answer_rows,
            "<tr><td style=\"{STYLE_QUESTION}\"><div style=\"{STYLE_LABEL}\">{}</div></td>\
             <td style=\"{STYLE_ANSWER}\">{}</td></tr>",
            escape_html(field.display_label()),
            field::render_html(field)
        );
    }
    if answer_rows.is_empty() {
        answer_rows = format!(
            "<tr><td colspan=\"2\" style=\"{STYLE_ANSWER}\">\
             <span style=\"{STYLE_EMPTY}\">No fields found.</span></td></tr>"
        );
    }

    let title = escape_html(form_name);
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"></head>\
         <body style=\"{STYLE_BODY}\">\
         <div style=\"{STYLE_WRAP}\">\
         <div style=\"{STYLE_CARD}\">\
         <div style=\"{STYLE_HEAD}\">\
         <h1 style=\"{STYLE_TITLE}\">{title}</h1>\
         <div style=\"{STYLE_SUB}\">New Submission Received</div>\
         {chips_html}\
         </div>\
         <div style=\"{STYLE_SECTION}\">\
         <div style=\"{STYLE_H2}\">Submission Details</div>\
         <table style=\"{STYLE_TABLE}\" cellpadding=\"0\" cellspacing=\"0\">{meta_rows}</table>\
         </div>\
         <div style=\"{STYLE_SECTION}\">\
         <div style=\"{STYLE_H2}\">Answers</div>\
         <table style=\"{STYLE_TABLE}\" cellpadding=\"0\" cellspacing=\"0\">{answer_rows}</table>\
         </div>\
         <div style=\"{STYLE_FOOT}\">This is an automated notification. Please do not reply to this email.</div>\
         </div>\
         </div>\
         </body></html>"
    )
}

fn build_text(form_name: &str, meta: &[(&str, String)], fields: &[&Field]) -> String {
    let mut text = format!("{form_name} — New submission\n");
    for (key, value) in meta {
        let _ = writeln!(text, "{key}: {value}");
    }
    text.push_str("\nAnswers:\n");
    for field in fields {
        let _ = writeln!(text, "- {}: {}", field.display_label(), field::render_text(field));
    }
    text
}
