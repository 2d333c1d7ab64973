use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::UserProfile;
use crate::notes::{Note, NoteColor};

/// Note as pushed to `POST /notes/sync`
///
/// Tombstones carry only the id and `isDeleted`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushNote {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<NoteColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_deleted: bool,
}

impl PushNote {
    pub fn tombstone(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: None,
            color: None,
            created_at: None,
            updated_at: None,
            is_deleted: true,
        }
    }
}

impl From<&Note> for PushNote {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            content: Some(note.content.clone()),
            color: Some(note.color),
            created_at: Some(note.created_at),
            updated_at: Some(note.updated_at),
            is_deleted: false,
        }
    }
}

/// Request body of `POST /notes/sync`
#[derive(Debug, Serialize)]
pub struct SyncRequest<'a> {
    pub notes: &'a [PushNote],
}

/// Note as returned by `GET /notes` (server field names)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteNote {
    pub id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub color: Option<NoteColor>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "isDeleted")]
    pub is_deleted: Option<bool>,
}

impl RemoteNote {
    pub fn is_deleted(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }

    /// Strictly newer than the local copy
    ///
    /// A tombstone without a timestamp always wins; a live record without
    /// one never does.
    pub fn is_newer_than(&self, local: &Note) -> bool {
        match self.updated_at {
            Some(updated_at) => updated_at > local.updated_at,
            None => self.is_deleted(),
        }
    }

    /// Local record for a note only the server knows about
    pub fn to_note(&self, now: DateTime<Utc>) -> Note {
        let created_at = self.created_at.or(self.updated_at).unwrap_or(now);
        Note {
            id: self.id.clone(),
            content: self.content.clone().unwrap_or_default(),
            color: self.color.unwrap_or_default(),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
            is_open: false,
            x: None,
            y: None,
            width: None,
            height: None,
        }
    }

    /// Overwrite synced fields; geometry and open state stay local
    pub fn overwrite(&self, local: &mut Note) {
        if let Some(content) = &self.content {
            local.content = content.clone();
        }
        if let Some(color) = self.color {
            local.color = color;
        }
        if let Some(created_at) = self.created_at {
            local.created_at = created_at;
        }
        if let Some(updated_at) = self.updated_at {
            local.updated_at = updated_at;
        }
    }
}

/// `GET /notes` returns a bare array; some deployments wrap it
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FetchResponse {
    List(Vec<RemoteNote>),
    Wrapped { notes: Vec<RemoteNote> },
}

impl FetchResponse {
    pub fn into_notes(self) -> Vec<RemoteNote> {
        match self {
            Self::List(notes) | Self::Wrapped { notes } => notes,
        }
    }
}

/// Body of `POST /auth/login`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub id_token: &'a str,
}

/// Session returned by the backend login
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}
