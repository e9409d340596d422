use std::sync::LazyLock;

use regex::Regex;

use crate::submission::payload::{Field, FieldType};

static OPTION_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.+\)\s*$").unwrap());

/// Tally exports each checkbox option as a synthetic boolean field labeled
/// "Question (Option)" alongside the aggregate multi-select answer. Those
/// per-option entries are noise once the aggregate is shown, so the document
/// builder drops them when `skip_option_checkboxes` is enabled. This is a
/// presentation heuristic keyed on label shape, not a protocol rule.
pub fn is_option_checkbox(field: &Field) -> bool {
    field.field_type == FieldType::Checkboxes
        && field.value.is_boolean()
        && OPTION_SUFFIX_RE.is_match(field.label.as_deref().unwrap_or(""))
}
