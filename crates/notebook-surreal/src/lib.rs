//! SurrealDB implementation of the notebook repository trait.
//!
//! Notes are documents in the `note` table keyed by their ID:
//!
//! ```text
//! note:⟨0b6c…⟩ {
//!     body: "…",
//!     header_image: { image_size: 10, url: "…", thumbnail_url: "…" },
//!     created_on: "2024-03-01T09:05:00.000000Z",
//!     updated_on: "2024-03-01T09:05:00.000000Z",
//!     user_id: 1,
//! }
//! ```

mod settings;

use chrono::{DateTime, Utc};
use notebook_core::{
    format_timestamp, Error, Note, NoteImage, NoteQuery, NoteRepository, INDEXES, NOTES_TABLE,
    PRIMARY_INDEX,
};
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::{self, Any};
use surrealdb::method::Query;
use surrealdb::opt::auth::Root;
use surrealdb::{RecordId, Response, Surreal};

pub use settings::{DatabaseSettings, DEFAULT_DATABASE, DEFAULT_ENDPOINT, DEFAULT_NAMESPACE};

/// Fields selected for every note read. The record key is returned as `key`.
const NOTE_FIELDS: &str =
    "record::id(id) AS key, body, header_image, created_on, updated_on, user_id";

/// A note document as written to the database (the ID lives in the record key).
#[derive(Debug, Serialize)]
struct NoteDocument {
    body: String,
    header_image: Option<NoteImage>,
    created_on: String,
    updated_on: String,
    user_id: i64,
}

impl From<Note> for NoteDocument {
    fn from(note: Note) -> Self {
        Self {
            body: note.body,
            header_image: note.header_image,
            created_on: format_timestamp(note.created_on),
            updated_on: format_timestamp(note.updated_on),
            user_id: note.user_id,
        }
    }
}

/// A note row as read back from the database.
#[derive(Debug, Deserialize)]
struct NoteRow {
    key: String,
    body: String,
    #[serde(default)]
    header_image: Option<NoteImage>,
    created_on: String,
    updated_on: String,
    user_id: i64,
}

impl NoteRow {
    fn into_note(self) -> Result<Note, Error> {
        Ok(Note {
            id: self.key,
            body: self.body,
            header_image: self.header_image,
            created_on: parse_timestamp(&self.created_on)?,
            updated_on: parse_timestamp(&self.updated_on)?,
            user_id: self.user_id,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: i64,
}

/// A record returned by `RETURN BEFORE` / `RETURN AFTER`. Only the record ID
/// is read; the returned rows tell a write statement whether it matched.
#[derive(Debug, Deserialize)]
struct WrittenRow {
    #[allow(dead_code)]
    id: RecordId,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

fn db_err(e: surrealdb::Error) -> Error {
    Error::Database(e.to_string())
}

/// Record reference for a note ID, used in statement targets.
fn note_ref() -> String {
    format!("type::thing('{}', $id)", NOTES_TABLE)
}

/// WHERE clause and bindings for a note query.
#[derive(Debug, Default)]
struct Filter {
    conditions: Vec<&'static str>,
    needle: Option<String>,
    updated_from: Option<String>,
    max_header_size: Option<i64>,
    user_id: Option<i64>,
}

impl Filter {
    fn from_query(query: &NoteQuery) -> Self {
        let mut filter = Filter::default();

        if let Some(ref text) = query.body_contains {
            filter
                .conditions
                .push("string::contains(string::lowercase(body), $needle)");
            filter.needle = Some(text.to_lowercase());
        }

        if let Some(from) = query.updated_from {
            filter.conditions.push("updated_on >= $updated_from");
            filter.updated_from = Some(format_timestamp(from));
        }

        if let Some(size) = query.max_header_size {
            // A missing image would compare as smaller than any size.
            filter
                .conditions
                .push("header_image != NONE AND header_image.image_size <= $max_header_size");
            filter.max_header_size = Some(size);
        }

        if let Some(user_id) = query.user_id {
            filter.conditions.push("user_id = $user_id");
            filter.user_id = Some(user_id);
        }

        filter
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn bind(self, mut query: Query<'_, Any>) -> Query<'_, Any> {
        if let Some(needle) = self.needle {
            query = query.bind(("needle", needle));
        }
        if let Some(from) = self.updated_from {
            query = query.bind(("updated_from", from));
        }
        if let Some(size) = self.max_header_size {
            query = query.bind(("max_header_size", size));
        }
        if let Some(user_id) = self.user_id {
            query = query.bind(("user_id", user_id));
        }
        query
    }
}

/// SurrealDB-backed note repository.
#[derive(Clone)]
pub struct SurrealNoteRepository {
    db: Surreal<Any>,
}

impl std::fmt::Debug for SurrealNoteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealNoteRepository").finish_non_exhaustive()
    }
}

impl SurrealNoteRepository {
    /// Connect to the configured endpoint and select the namespace and database.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, Error> {
        let db = any::connect(settings.endpoint.as_str())
            .await
            .map_err(|e| {
                Error::Database(format!(
                    "Failed to connect to {}: {}",
                    settings.endpoint, e
                ))
            })?;

        if let Some((username, password)) = settings.credentials() {
            db.signin(Root { username, password })
                .await
                .map_err(|e| Error::Database(format!("Failed to sign in: {}", e)))?;
        }

        db.use_ns(settings.namespace.as_str())
            .use_db(settings.database.as_str())
            .await
            .map_err(|e| {
                Error::Database(format!(
                    "Failed to use namespace '{}' and database '{}': {}",
                    settings.namespace, settings.database, e
                ))
            })?;

        tracing::debug!(
            endpoint = %settings.endpoint,
            namespace = %settings.namespace,
            database = %settings.database,
            "connected to document database"
        );

        Ok(Self { db })
    }

    /// Open a fresh in-memory database.
    pub async fn open_in_memory() -> Result<Self, Error> {
        Self::connect(&DatabaseSettings::default()).await
    }

    /// Run a query and fail on the first statement error.
    async fn run(query: Query<'_, Any>) -> Result<Response, Error> {
        query.await.map_err(db_err)?.check().map_err(db_err)
    }

    async fn select_notes(&self, query: NoteQuery) -> Result<Vec<Note>, Error> {
        let limit = query.limit;
        let filter = Filter::from_query(&query);

        let mut sql = format!(
            "SELECT {} FROM {}{} ORDER BY updated_on DESC, created_on DESC",
            NOTE_FIELDS,
            NOTES_TABLE,
            filter.where_clause()
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut response = Self::run(filter.bind(self.db.query(sql))).await?;
        let rows: Vec<NoteRow> = response.take(0).map_err(db_err)?;
        rows.into_iter().map(NoteRow::into_note).collect()
    }

    /// Run a single write statement and return the records it touched.
    async fn write(query: Query<'_, Any>) -> Result<Vec<WrittenRow>, Error> {
        let mut response = Self::run(query).await?;
        response.take(0).map_err(db_err)
    }
}

#[async_trait::async_trait]
impl NoteRepository for SurrealNoteRepository {
    async fn get_all_notes(&self) -> Result<Vec<Note>, Error> {
        self.select_notes(NoteQuery::default()).await
    }

    async fn get_note(&self, id: &str) -> Result<Option<Note>, Error> {
        let sql = format!("SELECT {} FROM {}", NOTE_FIELDS, note_ref());
        let mut response = Self::run(self.db.query(sql).bind(("id", id.to_string()))).await?;
        let row: Option<NoteRow> = response.take(0).map_err(db_err)?;
        row.map(NoteRow::into_note).transpose()
    }

    async fn find_notes(&self, query: NoteQuery) -> Result<Vec<Note>, Error> {
        tracing::debug!(?query, "finding notes");
        self.select_notes(query).await
    }

    async fn count_notes(&self, query: NoteQuery) -> Result<i64, Error> {
        let filter = Filter::from_query(&query);
        let sql = format!(
            "SELECT count() AS count FROM {}{} GROUP ALL",
            NOTES_TABLE,
            filter.where_clause()
        );

        let mut response = Self::run(filter.bind(self.db.query(sql))).await?;
        let row: Option<CountRow> = response.take(0).map_err(db_err)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    async fn add_note(&self, note: Note) -> Result<(), Error> {
        tracing::debug!(id = %note.id, user_id = note.user_id, "adding note");

        let id = note.id.clone();
        let sql = format!("CREATE {} CONTENT $content RETURN NONE", note_ref());
        Self::run(
            self.db
                .query(sql)
                .bind(("id", id))
                .bind(("content", NoteDocument::from(note))),
        )
        .await?;

        Ok(())
    }

    async fn update_note_body(
        &self,
        id: &str,
        body: String,
        updated_on: DateTime<Utc>,
    ) -> Result<bool, Error> {
        tracing::debug!(id, "updating note body");
        // UPDATE never creates a record, so an unknown ID returns no rows.
        let sql = format!(
            "UPDATE {} SET body = $body, updated_on = $updated_on RETURN AFTER",
            note_ref()
        );
        let rows = Self::write(
            self.db
                .query(sql)
                .bind(("id", id.to_string()))
                .bind(("body", body))
                .bind(("updated_on", format_timestamp(updated_on))),
        )
        .await?;

        Ok(!rows.is_empty())
    }

    async fn replace_note(&self, note: Note) -> Result<bool, Error> {
        tracing::debug!(id = %note.id, "replacing note document");
        let id = note.id.clone();
        let sql = format!("UPDATE {} CONTENT $content RETURN AFTER", note_ref());
        let rows = Self::write(
            self.db
                .query(sql)
                .bind(("id", id))
                .bind(("content", NoteDocument::from(note))),
        )
        .await?;

        Ok(!rows.is_empty())
    }

    async fn remove_note(&self, id: &str) -> Result<bool, Error> {
        tracing::debug!(id, "removing note");
        let sql = format!("DELETE {} RETURN BEFORE", note_ref());
        let rows = Self::write(self.db.query(sql).bind(("id", id.to_string()))).await?;

        Ok(!rows.is_empty())
    }

    async fn remove_all_notes(&self) -> Result<u64, Error> {
        let sql = format!("DELETE {} RETURN BEFORE", NOTES_TABLE);
        let rows = Self::write(self.db.query(sql)).await?;

        tracing::info!(count = rows.len(), "removed all notes");
        Ok(rows.len() as u64)
    }

    async fn create_index(&self) -> Result<String, Error> {
        for index in INDEXES {
            let sql = format!(
                "DEFINE INDEX IF NOT EXISTS {} ON TABLE {} FIELDS {}",
                index.name,
                NOTES_TABLE,
                index.fields.join(", ")
            );
            Self::run(self.db.query(sql)).await.map_err(|e| {
                Error::Database(format!("Creating index {} failed: {}", index.name, e))
            })?;
        }

        tracing::debug!(index = PRIMARY_INDEX.name, "indexes ensured");
        Ok(PRIMARY_INDEX.name.to_string())
    }
}
