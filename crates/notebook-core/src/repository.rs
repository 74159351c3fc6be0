use chrono::{DateTime, Utc};

use crate::{Error, Note, NoteQuery};

/// Storage abstraction for notes.
///
/// Each method maps onto a single database operation. Implementations do not
/// retry; driver failures surface as [`Error::Database`].
#[async_trait::async_trait]
pub trait NoteRepository: Send + Sync {
    /// All notes, most recently updated first.
    async fn get_all_notes(&self) -> Result<Vec<Note>, Error>;

    /// Get a note by ID.
    async fn get_note(&self, id: &str) -> Result<Option<Note>, Error>;

    /// Notes matching every filter set on the query, most recently updated first.
    async fn find_notes(&self, query: NoteQuery) -> Result<Vec<Note>, Error>;

    /// Count notes matching the query (ignores limit).
    async fn count_notes(&self, query: NoteQuery) -> Result<i64, Error>;

    /// Insert a new note document.
    async fn add_note(&self, note: Note) -> Result<(), Error>;

    /// Set the body and update time of an existing note.
    /// Returns false if the note does not exist.
    async fn update_note_body(
        &self,
        id: &str,
        body: String,
        updated_on: DateTime<Utc>,
    ) -> Result<bool, Error>;

    /// Replace the whole stored document with `note`.
    /// Returns false if no note with `note.id` exists.
    async fn replace_note(&self, note: Note) -> Result<bool, Error>;

    /// Delete a note by ID. Returns true if deleted, false if not found.
    async fn remove_note(&self, id: &str) -> Result<bool, Error>;

    /// Delete every note and return how many were removed.
    async fn remove_all_notes(&self) -> Result<u64, Error>;

    /// Ensure the secondary indexes exist and return the primary index name.
    async fn create_index(&self) -> Result<String, Error>;
}
