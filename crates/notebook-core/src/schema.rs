//! Storage layout shared by the backends.
//!
//! Indexes are declared here as data; backends turn them into their own
//! index statements. Creating an index that already exists is a no-op.

use chrono::{DateTime, SecondsFormat, Utc};

/// Table (collection) holding note documents.
pub const NOTES_TABLE: &str = "note";

/// A secondary index over one or more note fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

/// Compound index used to list a user's notes by creation time.
pub const PRIMARY_INDEX: IndexDef = IndexDef {
    name: "note_user_created",
    fields: &["user_id", "created_on"],
};

/// All indexes, in creation order.
pub const INDEXES: &[IndexDef] = &[
    PRIMARY_INDEX,
    IndexDef {
        name: "note_updated_on",
        fields: &["updated_on"],
    },
];

/// Render a timestamp in the fixed-width form stored in documents.
///
/// Every stored timestamp has microsecond precision and a `Z` suffix, so
/// string comparison orders them chronologically.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_primary_index_is_first() {
        assert_eq!(INDEXES[0], PRIMARY_INDEX);
        assert!(INDEXES.iter().all(|i| !i.fields.is_empty()));
    }

    #[test]
    fn test_timestamp_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap();
        let later = whole + chrono::Duration::milliseconds(250);

        assert_eq!(format_timestamp(whole), "2024-03-01T09:05:00.000000Z");
        assert_eq!(format_timestamp(later), "2024-03-01T09:05:00.250000Z");
        assert!(format_timestamp(whole) < format_timestamp(later));
    }
}
