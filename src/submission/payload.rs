use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Root object of a Tally webhook body. Every part is optional: a payload
/// with nothing recognizable in it still produces a document built from
/// defaults, never a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(deserialize_with = "lenient_string")]
    pub event_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub data: Option<SubmissionData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmissionData {
    #[serde(deserialize_with = "lenient_string")]
    pub form_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub form_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub submission_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub response_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub respondent_id: Option<String>,
    #[serde(deserialize_with = "lenient_items")]
    pub fields: Vec<Field>,
}

/// One answer in a submission. `value` stays raw JSON; its interpretation
/// depends on `field_type` and runtime shape (see [`super::answer::Answer`]).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Field {
    #[serde(deserialize_with = "lenient_string")]
    pub label: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub key: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_type")]
    pub field_type: FieldType,
    pub value: Value,
    #[serde(deserialize_with = "lenient_items")]
    pub options: Vec<ChoiceItem>,
    #[serde(deserialize_with = "lenient_items")]
    pub rows: Vec<ChoiceItem>,
    #[serde(deserialize_with = "lenient_items")]
    pub columns: Vec<ChoiceItem>,
}

impl Field {
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.key.as_deref())
            .unwrap_or("Field")
    }
}

/// The known Tally field tags. Anything else lands on `Unknown` and is
/// rendered by shape alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    FileUpload,
    Signature,
    MultipleChoice,
    Checkboxes,
    Dropdown,
    MultiSelect,
    Ranking,
    Matrix,
    InputEmail,
    InputPhoneNumber,
    Rating,
    LinearScale,
    #[default]
    #[serde(other)]
    Unknown,
}

/// An `{id, text}` entry from `options`, `rows`, or `columns`. Entries
/// missing either key are skipped during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceItem {
    pub id: Value,
    #[serde(deserialize_with = "lenient_text")]
    pub text: String,
}

impl ChoiceItem {
    /// Ids are matched as text so numeric and string ids compare equal.
    pub fn id_text(&self) -> String {
        stringify(&self.id)
    }
}

/// String form of a JSON value: strings verbatim, scalars via Display,
/// null empty, nested values as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

/// Accept a value of the expected shape, or None when it does not fit.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Accept an array, dropping entries that do not fit; anything that is not
/// an array deserializes as empty.
fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Accept any scalar as its text form, so a mistyped value degrades to a
/// string instead of failing the containing struct. Null and nested values
/// deserialize as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        scalar => Some(stringify(&scalar)),
    })
}

/// Like [`lenient_string`] but for required text: any value becomes its
/// [`stringify`] form.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(stringify(&value))
}

fn lenient_type<'de, D>(deserializer: D) -> Result<FieldType, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
