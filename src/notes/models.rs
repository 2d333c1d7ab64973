use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Presentation theme of a sticky note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteColor {
    #[default]
    Yellow,
    Green,
    Pink,
    Purple,
    Blue,
    Gray,
    Charcoal,
}

impl NoteColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Blue => "blue",
            Self::Gray => "gray",
            Self::Charcoal => "charcoal",
        }
    }

    /// Window background matching the note theme
    pub fn background(&self) -> &'static str {
        match self {
            Self::Yellow => "#fff7d1",
            Self::Green => "#e4f9e0",
            Self::Pink => "#ffe4f1",
            Self::Purple => "#f2e6ff",
            Self::Blue => "#e2f1ff",
            Self::Gray => "#f3f2f1",
            Self::Charcoal => "#494745",
        }
    }
}

// Unknown tags (older clients, server-side additions) read as the default theme
impl From<String> for NoteColor {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "green" => Self::Green,
            "pink" => Self::Pink,
            "purple" => Self::Purple,
            "blue" => Self::Blue,
            "gray" | "grey" => Self::Gray,
            "charcoal" => Self::Charcoal,
            _ => Self::Yellow,
        }
    }
}

impl From<NoteColor> for String {
    fn from(color: NoteColor) -> Self {
        color.as_str().to_string()
    }
}

impl fmt::Display for NoteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Window bounds in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A single sticky note as persisted in the notes file
///
/// Reading is forgiving: nulls, missing fields and odd values fall back to
/// defaults so one damaged record never makes the whole file unreadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    /// Rich-text markup produced by the editor
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: NoteColor,
    /// Unreadable timestamps read as the Unix epoch
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
    /// True while an editor window for this note is live
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_open: bool,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub x: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub y: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<f64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// RFC 3339 strings or epoch milliseconds
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Value::deserialize(deserializer)? {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    Ok(parsed.unwrap_or_default())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl Note {
    /// Build a note from a first save
    pub fn from_update(update: NoteUpdate, now: DateTime<Utc>) -> Self {
        let mut note = Self {
            id: update.id.clone(),
            content: String::new(),
            color: NoteColor::default(),
            created_at: now,
            updated_at: now,
            is_open: true,
            x: None,
            y: None,
            width: None,
            height: None,
        };
        note.apply(update);
        note
    }

    /// Merge a partial update; fields absent from the update are kept
    pub fn apply(&mut self, update: NoteUpdate) {
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(x) = update.x {
            self.x = Some(x);
        }
        if let Some(y) = update.y {
            self.y = Some(y);
        }
        if let Some(width) = update.width {
            self.width = Some(width);
        }
        if let Some(height) = update.height {
            self.height = Some(height);
        }
    }

    /// Stored geometry, only when all four fields are present
    pub fn bounds(&self) -> Option<Bounds> {
        Some(Bounds {
            x: self.x?,
            y: self.y?,
            width: self.width?,
            height: self.height?,
        })
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.x = Some(bounds.x);
        self.y = Some(bounds.y);
        self.width = Some(bounds.width);
        self.height = Some(bounds.height);
    }

    /// Plain-text preview of the markup content
    pub fn preview(&self, max_chars: usize) -> String {
        let mut text = String::with_capacity(self.content.len());
        let mut in_tag = false;
        for ch in self.content.chars() {
            match ch {
                '<' => {
                    in_tag = true;
                    text.push(' ');
                }
                '>' => in_tag = false,
                _ if !in_tag => text.push(ch),
                _ => {}
            }
        }
        let collapsed = text
            .replace("&nbsp;", " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        collapsed.chars().take(max_chars).collect()
    }
}

/// Partial note sent by an editor window on save
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdate {
    pub id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub color: Option<NoteColor>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl NoteUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_color(mut self, color: NoteColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.x = Some(bounds.x);
        self.y = Some(bounds.y);
        self.width = Some(bounds.width);
        self.height = Some(bounds.height);
        self
    }
}
