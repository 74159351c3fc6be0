use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note as stored in the document database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_image: Option<NoteImage>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    /// Owning user.
    pub user_id: i64,
}

/// Header image attached to a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteImage {
    /// Size of the image in bytes.
    pub image_size: i64,
    pub url: String,
    pub thumbnail_url: String,
}

/// A summary of a note for listing (truncated body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: String,
    pub user_id: i64,
    pub body_preview: String,
    pub updated_on: DateTime<Utc>,
}

/// Filters for finding notes. Unset fields do not filter.
#[derive(Debug, Default, Clone)]
pub struct NoteQuery {
    /// Case-insensitive substring of the body.
    pub body_contains: Option<String>,
    /// Only notes updated at or after this instant.
    pub updated_from: Option<DateTime<Utc>>,
    /// Only notes with a header image no larger than this many bytes.
    pub max_header_size: Option<i64>,
    pub user_id: Option<i64>,
    pub limit: Option<i64>,
}

/// Parameters for creating a new note.
#[derive(Debug, Clone)]
pub struct CreateNote {
    pub body: String,
    pub header_image: Option<NoteImage>,
    pub user_id: i64,
}

impl Note {
    /// Convert to summary with a body preview of at most `max_len` characters.
    pub fn to_summary(&self, max_len: usize) -> NoteSummary {
        let normalized: String = self
            .body
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        let trimmed = normalized.trim();

        let body_preview = if trimmed.chars().count() > max_len {
            let cut: String = trimmed.chars().take(max_len).collect();
            format!("{}...", cut)
        } else {
            trimmed.to_string()
        };

        NoteSummary {
            id: self.id.clone(),
            user_id: self.user_id,
            body_preview,
            updated_on: self.updated_on,
        }
    }
}
