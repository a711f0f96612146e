use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::enums::ThreadStatus;
use crate::db::schema;

/// A single agent-question / admin-answer exchange tied to one case.
///
/// The message is immutable after creation. At most one admin response is
/// held; recording one moves the thread to `answered`.
#[derive(Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize)]
#[diesel(table_name = schema::request_thread)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct RequestThread {
    pub id: uuid::Uuid,
    pub case_id: uuid::Uuid,
    pub agent_id: uuid::Uuid,
    pub message: String,
    pub status: ThreadStatus,
    pub admin_response: Option<String>,
    pub admin_id: Option<uuid::Uuid>,
    pub answered_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for opening request threads
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::request_thread)]
pub struct NewRequestThread<'a> {
    pub id: uuid::Uuid,
    pub case_id: uuid::Uuid,
    pub agent_id: uuid::Uuid,
    pub message: &'a str,
    pub status: ThreadStatus,
}
