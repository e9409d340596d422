use serde_json::Value;

use super::payload::{ChoiceItem, Field, FieldType, stringify};

/// A field's value resolved into one of the shapes the renderer knows how to
/// lay out. Classification happens once, here; rendering matches on the
/// variants exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Files(Vec<FileAttachment>),
    Choices(Vec<String>),
    Ranking(Vec<String>),
    Matrix(Vec<MatrixRow>),
    List(Vec<Scalar>),
    Object(Vec<(String, Scalar)>),
    Scalar(Scalar),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileAttachment {
    pub name: String,
    pub url: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    pub label: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Empty,
    Bool(bool),
    Number(String),
    Link(String),
    Text(String),
}

impl Answer {
    pub fn classify(field: &Field) -> Answer {
        match (field.field_type, &field.value) {
            (FieldType::FileUpload | FieldType::Signature, Value::Array(items)) => {
                Answer::Files(items.iter().filter_map(parse_attachment).collect())
            }
            (
                FieldType::MultipleChoice
                | FieldType::Checkboxes
                | FieldType::Dropdown
                | FieldType::MultiSelect,
                Value::Array(ids),
            ) => Answer::Choices(resolve_ids(ids, &field.options)),
            (FieldType::Ranking, Value::Array(ids)) => {
                Answer::Ranking(resolve_ids(ids, &field.options))
            }
            (FieldType::Matrix, Value::Object(map)) => Answer::Matrix(
                map.iter()
                    .map(|(row_id, column_ids)| MatrixRow {
                        label: resolve(row_id, &field.rows),
                        columns: column_ids
                            .as_array()
                            .map(|ids| resolve_ids(ids, &field.columns))
                            .unwrap_or_default(),
                    })
                    .collect(),
            ),
            // Empty generic containers collapse to the same placeholder as
            // an empty scalar.
            (_, Value::Array(items)) if items.is_empty() => Answer::Scalar(Scalar::Empty),
            (_, Value::Object(map)) if map.is_empty() => Answer::Scalar(Scalar::Empty),
            (_, Value::Array(items)) => Answer::List(items.iter().map(Scalar::classify).collect()),
            (_, Value::Object(map)) => Answer::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Scalar::classify(value)))
                    .collect(),
            ),
            (_, value) => Answer::Scalar(Scalar::classify(value)),
        }
    }
}

impl Scalar {
    pub fn classify(value: &Value) -> Scalar {
        match value {
            Value::Null => Scalar::Empty,
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Number(n) => Scalar::Number(n.to_string()),
            Value::String(s) if s.is_empty() => Scalar::Empty,
            Value::String(s) if looks_like_url(s) => Scalar::Link(s.clone()),
            Value::String(s) => Scalar::Text(s.clone()),
            // Values nested deeper than one container level degrade to
            // compact JSON text.
            nested => Scalar::Text(nested.to_string()),
        }
    }
}

pub fn looks_like_url(s: &str) -> bool {
    let has_prefix =
        |p: &str| s.get(..p.len()).is_some_and(|head| head.eq_ignore_ascii_case(p));
    has_prefix("http://") || has_prefix("https://")
}

/// Look up an id against an `{id, text}` list; an unresolved id falls back to
/// its raw text form.
fn resolve(id_text: &str, items: &[ChoiceItem]) -> String {
    items
        .iter()
        .find(|item| item.id_text() == id_text)
        .map(|item| item.text.clone())
        .unwrap_or_else(|| id_text.to_string())
}

fn resolve_ids(ids: &[Value], items: &[ChoiceItem]) -> Vec<String> {
    ids.iter().map(|id| resolve(&stringify(id), items)).collect()
}

fn parse_attachment(item: &Value) -> Option<FileAttachment> {
    let obj = item.as_object()?;
    let name = obj
        .get("name")
        .map(stringify)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "file".to_string());
    let url = obj
        .get("url")
        .map(stringify)
        .filter(|u| !u.is_empty());
    let size = obj
        .get("size")
        .map(stringify)
        .filter(|s| !s.is_empty());
    Some(FileAttachment { name, url, size })
}
