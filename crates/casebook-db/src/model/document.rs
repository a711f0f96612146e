use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;

/// A document reference bound to a named slot on a case.
///
/// The reference is an opaque handle owned by exactly one (case, slot) pair;
/// the unique index on (case_id, slot) backs that up under concurrency.
#[derive(Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize)]
#[diesel(table_name = schema::case_document)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct CaseDocument {
    pub id: uuid::Uuid,
    #[serde(skip)]
    pub case_id: uuid::Uuid,
    pub slot: String,
    pub file_ref: String,
    pub attached_at: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for attaching documents
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::case_document)]
pub struct NewCaseDocument<'a> {
    pub id: uuid::Uuid,
    pub case_id: uuid::Uuid,
    pub slot: &'a str,
    pub file_ref: &'a str,
}
