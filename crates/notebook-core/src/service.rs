use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::{CreateNote, Error, Note, NoteImage, NoteQuery, NoteRepository, NoteSummary};

/// Default number of notes returned by `find_notes` when no limit is given.
const DEFAULT_LIMIT: i64 = 100;

/// Length of the body preview in summaries.
const PREVIEW_LEN: usize = 140;

/// The main service that contains all business logic.
/// Generic over the repository implementation.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Add a new note. The ID and timestamps are assigned here.
    pub async fn add_note(&self, note: CreateNote) -> Result<Note, Error> {
        validate_body(&note.body)?;
        if let Some(ref image) = note.header_image {
            validate_image(image)?;
        }

        let now = now();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            body: note.body,
            header_image: note.header_image,
            created_on: now,
            updated_on: now,
            user_id: note.user_id,
        };

        self.repo.add_note(note.clone()).await?;
        Ok(note)
    }

    pub async fn get_all_notes(&self) -> Result<Vec<Note>, Error> {
        self.repo.get_all_notes().await
    }

    /// Get a note by ID.
    pub async fn get_note(&self, id: &str) -> Result<Option<Note>, Error> {
        self.repo.get_note(id).await
    }

    /// Find notes with optional filters.
    pub async fn find_notes(&self, query: NoteQuery) -> Result<Vec<Note>, Error> {
        // Apply default limit if not specified (0 means no limit)
        let query = NoteQuery {
            limit: match query.limit {
                Some(0) => None,
                Some(n) if n < 0 => {
                    return Err(Error::Validation("limit cannot be negative".into()))
                }
                Some(n) => Some(n),
                None => Some(DEFAULT_LIMIT),
            },
            ..query
        };
        self.repo.find_notes(query).await
    }

    /// Find notes and return them as summaries.
    pub async fn list_notes(&self, query: NoteQuery) -> Result<Vec<NoteSummary>, Error> {
        let notes = self.find_notes(query).await?;
        Ok(notes.into_iter().map(|n| n.to_summary(PREVIEW_LEN)).collect())
    }

    /// Count notes matching the query (ignores limit).
    pub async fn count_notes(&self, query: NoteQuery) -> Result<i64, Error> {
        self.repo.count_notes(query).await
    }

    /// Update only the body of a note, leaving the rest of the document alone.
    pub async fn update_note_body(&self, id: &str, body: String) -> Result<bool, Error> {
        validate_body(&body)?;
        self.repo.update_note_body(id, body, now()).await
    }

    /// Update the body by rewriting the whole document.
    pub async fn update_note_document(&self, id: &str, body: String) -> Result<bool, Error> {
        validate_body(&body)?;

        let Some(mut note) = self.repo.get_note(id).await? else {
            return Ok(false);
        };
        note.body = body;
        note.updated_on = now();

        self.repo.replace_note(note).await
    }

    /// Delete a note by ID.
    pub async fn remove_note(&self, id: &str) -> Result<bool, Error> {
        self.repo.remove_note(id).await
    }

    pub async fn remove_all_notes(&self) -> Result<u64, Error> {
        self.repo.remove_all_notes().await
    }

    pub async fn create_index(&self) -> Result<String, Error> {
        self.repo.create_index().await
    }

    /// Replace all notes with a fixed sample set owned by `user_id`,
    /// then make sure the indexes exist. Returns the seeded notes and the
    /// name of the compound index.
    pub async fn seed_sample_notes(&self, user_id: i64) -> Result<(Vec<Note>, String), Error> {
        self.repo.remove_all_notes().await?;

        let mut notes = Vec::new();
        for (body, image) in sample_notes() {
            let note = self
                .add_note(CreateNote {
                    body: body.to_string(),
                    header_image: image,
                    user_id,
                })
                .await?;
            notes.push(note);
        }

        let index = self.repo.create_index().await?;
        Ok((notes, index))
    }
}

/// Current time at the precision documents are stored with.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn validate_body(body: &str) -> Result<(), Error> {
    if body.trim().is_empty() {
        return Err(Error::Validation("body cannot be empty".into()));
    }
    Ok(())
}

fn validate_image(image: &NoteImage) -> Result<(), Error> {
    if image.image_size < 0 {
        return Err(Error::Validation("image size cannot be negative".into()));
    }
    Ok(())
}

fn sample_notes() -> Vec<(&'static str, Option<NoteImage>)> {
    vec![
        ("Test note 1", None),
        (
            "Test note 2",
            Some(NoteImage {
                image_size: 10,
                url: "http://localhost/image1.png".to_string(),
                thumbnail_url: "http://localhost/image1_small.png".to_string(),
            }),
        ),
        (
            "Test note 3",
            Some(NoteImage {
                image_size: 14,
                url: "http://localhost/image3.png".to_string(),
                thumbnail_url: "http://localhost/image3_small.png".to_string(),
            }),
        ),
        ("Test note 4", None),
    ]
}
