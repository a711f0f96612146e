//! Document association manager.
//!
//! Binds opaque document references (validated and stored by the upload
//! collaborator) to named slots on a case. Replacing an occupied slot is an
//! explicit, distinct request from attaching to an empty one, so an upload
//! can never silently clobber a previous document.

use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use casebook_core::constants::FIXED_DOCUMENT_SLOTS;
use casebook_core::error::CoreError;
use casebook_db::db::connection::DbConnection;
use casebook_db::db::query::{case, custom_field, document};
use casebook_db::model::document::{CaseDocument, NewCaseDocument};

use crate::error::{ServiceError, ServiceResult};

/// Result of an attach operation.
#[derive(Debug, Clone)]
pub struct AttachOutcome {
    pub document: CaseDocument,
    /// The reference the slot held before an explicit overwrite, if any.
    pub replaced: Option<String>,
}

/// ## Summary
/// Attaches a document reference to a slot on a case.
///
/// The slot must be one of the four fixed names or the id of a file-kind
/// custom field on the same case. Attaching to an occupied slot fails unless
/// `overwrite` is set. Two concurrent attaches to the same empty slot are
/// decided by the unique index: the loser gets a conflict, never a silent
/// overwrite.
///
/// ## Errors
/// Returns `NotFound` when the case does not exist, a validation error for an
/// unknown slot or an occupied slot without `overwrite`, a conflict error
/// when a concurrent attach won the slot, or a database error.
#[tracing::instrument(skip(conn, file_ref))]
pub async fn attach(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    slot: &str,
    file_ref: &str,
    overwrite: bool,
) -> ServiceResult<AttachOutcome> {
    if file_ref.is_empty() {
        return Err(CoreError::invalid_field("fileRef", "must not be empty").into());
    }

    // The transaction closure may only capture owned data, so the borrowed
    // inputs are cloned and moved in.
    let slot_for_tx = slot.to_owned();
    let file_ref_for_tx = file_ref.to_owned();
    let result = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                let slot = slot_for_tx.as_str();
                let file_ref = file_ref_for_tx.as_str();
                case::find_by_id(tx, case_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("case", case_id))?;

                require_valid_slot(tx, case_id, slot).await?;

                match document::find_slot(tx, case_id, slot).await? {
                    Some(existing) if overwrite => {
                        let document = document::replace_ref(tx, case_id, slot, file_ref).await?;
                        Ok(AttachOutcome {
                            document,
                            replaced: Some(existing.file_ref),
                        })
                    }
                    Some(existing) => Err(CoreError::invalid_field(
                        "slot",
                        format!(
                            "slot '{slot}' already holds '{}'; pass overwrite to replace it",
                            existing.file_ref
                        ),
                    )
                    .into()),
                    None => {
                        let new_document = NewCaseDocument {
                            id: uuid::Uuid::new_v4(),
                            case_id,
                            slot,
                            file_ref,
                        };
                        let document = document::attach_new(tx, &new_document).await?;
                        Ok(AttachOutcome {
                            document,
                            replaced: None,
                        })
                    }
                }
            }
            .scope_boxed()
        })
        .await;

    match result {
        Err(e) if e.is_unique_violation() => Err(ServiceError::Conflict(format!(
            "a concurrent upload claimed slot '{slot}' on case {case_id}"
        ))),
        other => other,
    }
}

/// ## Summary
/// Clears a slot and returns the document it held. Deleting the underlying
/// file is the caller's responsibility.
///
/// ## Errors
/// Returns `NotFound` when the case does not exist or the slot is empty, or
/// a database error.
#[tracing::instrument(skip(conn))]
pub async fn detach(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    slot: &str,
) -> ServiceResult<CaseDocument> {
    case::find_by_id(conn, case_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("case", case_id))?;

    document::detach(conn, case_id, slot)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("no document in slot '{slot}' on case {case_id}")))
}

/// A slot name is valid when it is one of the fixed names, or parses as the
/// id of a file-kind custom field belonging to this case.
async fn require_valid_slot(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    slot: &str,
) -> ServiceResult<()> {
    if FIXED_DOCUMENT_SLOTS.contains(&slot) {
        return Ok(());
    }

    if let Ok(field_id) = slot.parse::<uuid::Uuid>()
        && custom_field::find_file_field(conn, case_id, field_id)
            .await?
            .is_some()
    {
        return Ok(());
    }

    Err(CoreError::invalid_field(
        "slot",
        format!("'{slot}' is not a fixed slot or a file-kind custom field of this case"),
    )
    .into())
}
