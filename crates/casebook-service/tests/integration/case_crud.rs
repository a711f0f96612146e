//! Case CRUD tests: patch validation, assignment notes, the full read
//! projection, soft delete, and list filters.

use casebook_core::error::CoreError;
use casebook_db::db::enums::{CasePriority, CaseStatus, TimelineKind};
use casebook_db::db::query::case::CaseFilter;
use casebook_service::case_record::delete::delete_case;
use casebook_service::case_record::intake::{CreateCaseContext, create_case};
use casebook_service::case_record::read::{get_case, list_cases};
use casebook_service::case_record::update::{CasePatch, update_case};
use casebook_service::case_record::BankDetailInput;
use casebook_service::error::ServiceError;
use casebook_service::lifecycle::{case_timeline, transition};

use super::helpers::{TestDb, agent, officer};

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn patch_validates_only_touched_fields() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let created = db.seed_case(&actor, None).await.expect("case");
    let mut conn = db.conn().await.expect("conn");

    let patch = CasePatch {
        phone: Some("12345".into()),
        ..Default::default()
    };
    let err = update_case(&mut conn, created.case.id, &patch, &actor)
        .await
        .expect_err("bad phone");
    assert!(matches!(
        err,
        ServiceError::CoreError(CoreError::Validation(_))
    ));

    // A resolution date cannot be forced onto an unsettled case.
    let patch = CasePatch {
        resolution_date: Some(Some(chrono::Utc::now())),
        ..Default::default()
    };
    let err = update_case(&mut conn, created.case.id, &patch, &actor)
        .await
        .expect_err("unsettled case");
    assert!(matches!(
        err,
        ServiceError::CoreError(CoreError::Validation(_))
    ));

    let patch = CasePatch {
        phone: Some("9123456780".into()),
        priority: Some(CasePriority::High),
        ..Default::default()
    };
    let updated = update_case(&mut conn, created.case.id, &patch, &actor)
        .await
        .expect("valid patch");
    assert_eq!(updated.phone, "9123456780");
    assert_eq!(updated.priority, CasePriority::High);
    assert!(updated.updated_at > created.case.updated_at);
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn assignment_change_appends_timeline_note() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = officer();
    let created = db.seed_case(&agent(), None).await.expect("case");
    let mut conn = db.conn().await.expect("conn");

    let assignee = uuid::Uuid::new_v4();
    let patch = CasePatch {
        assigned_to: Some(Some(assignee)),
        ..Default::default()
    };
    update_case(&mut conn, created.case.id, &patch, &actor)
        .await
        .expect("assign");

    let patch = CasePatch {
        assigned_to: Some(None),
        ..Default::default()
    };
    update_case(&mut conn, created.case.id, &patch, &actor)
        .await
        .expect("unassign");

    let entries = case_timeline(&mut conn, created.case.id)
        .await
        .expect("timeline");
    let notes: Vec<&str> = entries.iter().map(|e| e.note.as_str()).collect();
    assert_eq!(notes, vec![format!("assigned to {assignee}"), "unassigned".to_owned()]);
    assert!(entries.iter().all(|e| e.entry_kind == TimelineKind::Note));
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn get_case_projects_sub_records_and_all_banks() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let mut conn = db.conn().await.expect("conn");
    let ctx = CreateCaseContext {
        customer_name: "Rohit Sharma".into(),
        phone: "9876543210".into(),
        problem: "EMI bounce dispute".into(),
        banks: vec!["HDFC Bank".into()],
        other_banks: vec!["District Cooperative Bank".into()],
        bank_details: vec![BankDetailInput {
            bank_name: "HDFC Bank".into(),
            account_number: Some("0012345678".into()),
            loan_type: None,
            issues: vec![],
        }],
        ..Default::default()
    };
    let created = create_case(&mut conn, &actor, &ctx).await.expect("case");

    let view = get_case(&mut conn, created.case.id).await.expect("view");
    assert_eq!(
        view.all_banks,
        vec!["HDFC Bank".to_owned(), "District Cooperative Bank".to_owned()]
    );
    assert_eq!(view.bank_details.len(), 1);
    assert_eq!(view.bank_details[0].bank_name, "HDFC Bank");
    assert!(view.custom_fields.is_empty());
    assert!(view.documents.is_empty());
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn deleted_case_disappears_from_reads() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let created = db.seed_case(&actor, None).await.expect("case");
    let mut conn = db.conn().await.expect("conn");

    delete_case(&mut conn, created.case.id, &actor)
        .await
        .expect("delete");

    let err = get_case(&mut conn, created.case.id)
        .await
        .expect_err("soft-deleted");
    assert!(matches!(err, ServiceError::NotFound(_)));

    // Deleting again reports not found.
    let err = delete_case(&mut conn, created.case.id, &actor)
        .await
        .expect_err("already deleted");
    assert!(matches!(err, ServiceError::NotFound(_)));

    let listed = list_cases(&mut conn, &CaseFilter::default())
        .await
        .expect("list");
    assert!(listed.is_empty());
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn list_filters_by_status_and_assignee() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = officer();
    let first = db.seed_case(&agent(), None).await.expect("case");
    let second = db.seed_case(&agent(), None).await.expect("case");
    let mut conn = db.conn().await.expect("conn");

    transition(&mut conn, first.case.id, CaseStatus::InProgress, &actor)
        .await
        .expect("to in-progress");

    let assignee = uuid::Uuid::new_v4();
    let patch = CasePatch {
        assigned_to: Some(Some(assignee)),
        ..Default::default()
    };
    update_case(&mut conn, second.case.id, &patch, &actor)
        .await
        .expect("assign");

    let filter = CaseFilter {
        status: Some(CaseStatus::InProgress),
        ..Default::default()
    };
    let listed = list_cases(&mut conn, &filter).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, first.case.id);

    let filter = CaseFilter {
        assigned_to: Some(assignee),
        ..Default::default()
    };
    let listed = list_cases(&mut conn, &filter).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, second.case.id);
}
