//! Notebook core library - shared types, traits, and business logic.
//!
//! This crate contains no I/O; storage backends implement [`NoteRepository`].

mod dateparse;
mod error;
mod note;
mod repository;
mod schema;
mod service;

pub use dateparse::parse_human_date;
pub use error::Error;
pub use note::{CreateNote, Note, NoteImage, NoteQuery, NoteSummary};
pub use repository::NoteRepository;
pub use schema::{format_timestamp, IndexDef, INDEXES, NOTES_TABLE, PRIMARY_INDEX};
pub use service::NoteService;
