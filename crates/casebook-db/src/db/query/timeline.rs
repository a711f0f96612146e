//! Queries for the append-only case timeline.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::timeline_entry;
use crate::model::timeline::{NewTimelineEntry, TimelineEntry};

/// ## Summary
/// Appends a timeline entry. The timeline has no update or delete path.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn append(
    conn: &mut DbConnection<'_>,
    entry: &NewTimelineEntry<'_>,
) -> diesel::QueryResult<TimelineEntry> {
    diesel::insert_into(timeline_entry::table)
        .values(entry)
        .returning(TimelineEntry::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Lists a case's timeline oldest first, id as tiebreak.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_for_case(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
) -> diesel::QueryResult<Vec<TimelineEntry>> {
    timeline_entry::table
        .filter(timeline_entry::case_id.eq(case_id))
        .order((timeline_entry::created_at.asc(), timeline_entry::id.asc()))
        .select(TimelineEntry::as_select())
        .load(conn)
        .await
}
