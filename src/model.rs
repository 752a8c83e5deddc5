//! Wire payloads exchanged with the portal backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One row of `/api/search` output.
///
/// The backend mixes event rows and alumni rows in the same list without a
/// discriminator, so the variant is picked from the fields that are present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum SearchResultItem {
    Event {
        event_name: String,
        description: Option<String>,
    },
    Person {
        name: String,
        career_path: Option<String>,
        achievements: Option<String>,
    },
    Raw(Value),
}

impl SearchResultItem {
    /// The text shown in the result list and copied into the input on click.
    pub fn display_text(&self) -> String {
        match self {
            SearchResultItem::Event {
                event_name,
                description,
            } => join_present(event_name, [description.as_deref()]),
            SearchResultItem::Person {
                name,
                career_path,
                achievements,
            } => join_present(name, [career_path.as_deref(), achievements.as_deref()]),
            SearchResultItem::Raw(value) => value.to_string(),
        }
    }
}

impl From<Value> for SearchResultItem {
    fn from(value: Value) -> Self {
        if let Some(event_name) = field_text(&value, "event_name") {
            return SearchResultItem::Event {
                event_name,
                description: field_text(&value, "description"),
            };
        }
        if let Some(name) = field_text(&value, "name") {
            return SearchResultItem::Person {
                name,
                career_path: field_text(&value, "career_path"),
                achievements: field_text(&value, "achievements"),
            };
        }
        SearchResultItem::Raw(value)
    }
}

impl fmt::Display for SearchResultItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

fn join_present<const N: usize>(head: &str, tail: [Option<&str>; N]) -> String {
    let mut text = head.to_string();
    for part in tail.into_iter().flatten() {
        text.push_str(": ");
        text.push_str(part);
    }
    text
}

/// Reads a field the way the page treats it: empty strings, zero, false and
/// null count as absent.
fn field_text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionsPayload {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPayload {
    pub results: Vec<SearchResultItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPayload {
    pub history: Vec<HistoryEntry>,
}

/// A past query. The backend also sends `search_id` and `timestamp`, which the
/// panel does not show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub query: Option<String>,
}

impl HistoryEntry {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
        }
    }

    pub fn text(&self) -> &str {
        self.query.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WidgetPayload {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostRequest<'a> {
    pub text: &'a str,
}
