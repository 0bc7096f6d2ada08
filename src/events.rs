use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Terminal events fed into the chat loop
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Key press event
    Key(crossterm::event::KeyEvent),

    /// Paste event
    Paste(String),

    /// Terminal resize; the next draw picks up the new size
    Resize,

    /// Periodic tick used to drain pending responses and redraw
    Tick,
}

/// Author of a turn in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

impl ChatRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Ai => "Assistant",
        }
    }
}

/// One message entry in the chat transcript
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: ChatRole,
    /// Display markup for assistant turns, the trimmed query for user turns
    pub content: String,
    pub sources: Vec<Source>,
    pub timestamp: DateTime<Local>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            sources: Vec::new(),
            timestamp: Local::now(),
        }
    }

    pub fn ai(content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            role: ChatRole::Ai,
            content: content.into(),
            sources,
            timestamp: Local::now(),
        }
    }
}

/// A citation returned alongside an assistant answer.
///
/// The backend sends the document chunks it retrieved as context. Only the
/// identifying fields are kept; the embedding vector is ignored. A bare
/// string is a plain reference, and any other JSON value is kept as is so
/// an unexpected citation never costs the answer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Reference(String),
    Chunk(DocumentSource),
    Other(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentSource {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: HashMap<String, String>,
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_to_string))
}

/// Metadata values are stringified; `null` or a non-object is treated as empty
fn lenient_metadata<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(key, value)| scalar_to_string(value).map(|value| (key, value)))
            .collect(),
        _ => HashMap::new(),
    })
}

impl Source {
    /// Human readable label: title, then url, then id
    pub fn label(&self) -> String {
        match self {
            Source::Reference(reference) => reference.clone(),
            Source::Chunk(chunk) => chunk
                .metadata
                .get("title")
                .or_else(|| chunk.metadata.get("url"))
                .cloned()
                .or_else(|| chunk.id.clone())
                .unwrap_or_else(|| "Untitled source".to_string()),
            Source::Other(value) => value.to_string(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Source::Reference(_) | Source::Other(_) => None,
            Source::Chunk(chunk) => chunk.metadata.get("url").map(String::as_str),
        }
    }
}
