use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::enums::TimelineKind;
use crate::db::schema;

/// An append-only audit record of a lifecycle event on a case.
/// Entries are never edited or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize)]
#[diesel(table_name = schema::timeline_entry)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: uuid::Uuid,
    #[serde(skip)]
    pub case_id: uuid::Uuid,
    pub entry_kind: TimelineKind,
    pub note: String,
    pub actor: uuid::Uuid,
    #[serde(rename = "date")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for appending timeline entries
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::timeline_entry)]
pub struct NewTimelineEntry<'a> {
    pub id: uuid::Uuid,
    pub case_id: uuid::Uuid,
    pub entry_kind: TimelineKind,
    pub note: &'a str,
    pub actor: uuid::Uuid,
}
