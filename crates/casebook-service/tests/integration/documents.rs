//! Document association tests: slot validation, the explicit-overwrite rule,
//! detach semantics, and the concurrent double-attach race.

use casebook_core::constants::{SLOT_AADHAAR_DOC, SLOT_PAN_DOC};
use casebook_core::error::CoreError;
use casebook_db::db::enums::CustomFieldKind;
use casebook_service::case_record::CustomFieldInput;
use casebook_service::case_record::intake::{CreateCaseContext, create_case};
use casebook_service::document::{attach, detach};
use casebook_service::error::ServiceError;

use super::helpers::{TestDb, agent};

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn attach_occupied_slot_requires_explicit_overwrite() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let created = db.seed_case(&agent(), None).await.expect("case");
    let case_id = created.case.id;
    let mut conn = db.conn().await.expect("conn");

    let outcome = attach(&mut conn, case_id, SLOT_AADHAAR_DOC, "uploads/a.pdf", false)
        .await
        .expect("first attach");
    assert_eq!(outcome.document.file_ref, "uploads/a.pdf");
    assert!(outcome.replaced.is_none());

    // Second attach without overwrite is rejected; the slot keeps the first ref.
    let err = attach(&mut conn, case_id, SLOT_AADHAAR_DOC, "uploads/b.pdf", false)
        .await
        .expect_err("occupied slot");
    assert!(matches!(
        err,
        ServiceError::CoreError(CoreError::Validation(_))
    ));

    // With overwrite, the previous reference is reported back.
    let outcome = attach(&mut conn, case_id, SLOT_AADHAAR_DOC, "uploads/b.pdf", true)
        .await
        .expect("overwrite");
    assert_eq!(outcome.document.file_ref, "uploads/b.pdf");
    assert_eq!(outcome.replaced.as_deref(), Some("uploads/a.pdf"));
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn detach_returns_previous_reference() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let created = db.seed_case(&agent(), None).await.expect("case");
    let case_id = created.case.id;
    let mut conn = db.conn().await.expect("conn");

    attach(&mut conn, case_id, SLOT_PAN_DOC, "uploads/pan.jpg", false)
        .await
        .expect("attach");

    let detached = detach(&mut conn, case_id, SLOT_PAN_DOC).await.expect("detach");
    assert_eq!(detached.file_ref, "uploads/pan.jpg");

    // Slot is empty now.
    let err = detach(&mut conn, case_id, SLOT_PAN_DOC)
        .await
        .expect_err("slot already empty");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn unknown_slot_names_are_rejected() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let created = db.seed_case(&agent(), None).await.expect("case");
    let mut conn = db.conn().await.expect("conn");

    let err = attach(&mut conn, created.case.id, "passportDoc", "uploads/p.pdf", false)
        .await
        .expect_err("not a slot");
    assert!(matches!(
        err,
        ServiceError::CoreError(CoreError::Validation(_))
    ));
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn file_custom_field_id_works_as_dynamic_slot() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let mut conn = db.conn().await.expect("conn");
    let ctx = CreateCaseContext {
        customer_name: "Rohit Sharma".into(),
        phone: "9876543210".into(),
        problem: "Credit card settlement".into(),
        custom_fields: vec![CustomFieldInput {
            label: "Settlement letter".into(),
            kind: CustomFieldKind::File,
            value: serde_json::json!("uploads/placeholder.pdf"),
        }],
        ..Default::default()
    };
    let created = create_case(&mut conn, &actor, &ctx).await.expect("case");
    let field_id = created.custom_fields[0].id.to_string();

    let outcome = attach(&mut conn, created.case.id, &field_id, "uploads/letter.pdf", true)
        .await
        .expect("attach to dynamic slot");
    assert_eq!(outcome.document.slot, field_id);

    // A random uuid is not a slot on this case.
    let bogus = uuid::Uuid::new_v4().to_string();
    let err = attach(&mut conn, created.case.id, &bogus, "uploads/x.pdf", false)
        .await
        .expect_err("unknown dynamic slot");
    assert!(matches!(
        err,
        ServiceError::CoreError(CoreError::Validation(_))
    ));
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn concurrent_attach_to_same_slot_has_one_winner() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let created = db.seed_case(&agent(), None).await.expect("case");
    let case_id = created.case.id;

    let mut conn_a = db.conn().await.expect("conn a");
    let mut conn_b = db.conn().await.expect("conn b");

    let (res_a, res_b) = tokio::join!(
        attach(&mut conn_a, case_id, SLOT_AADHAAR_DOC, "uploads/a.pdf", false),
        attach(&mut conn_b, case_id, SLOT_AADHAAR_DOC, "uploads/b.pdf", false),
    );

    let winners = usize::from(res_a.is_ok()) + usize::from(res_b.is_ok());
    assert_eq!(winners, 1, "exactly one attach wins the slot");

    let loser = if res_a.is_ok() { res_b } else { res_a };
    let err = loser.expect_err("loser fails");
    assert!(
        matches!(err, ServiceError::Conflict(_))
            || matches!(err, ServiceError::CoreError(CoreError::Validation(_))),
        "loser sees a conflict or a validation failure, got {err}"
    );

    // The slot holds exactly one of the two references.
    let mut conn = db.conn().await.expect("conn");
    let slot = casebook_db::db::query::document::find_slot(&mut conn, case_id, SLOT_AADHAAR_DOC)
        .await
        .expect("query")
        .expect("slot occupied");
    assert!(slot.file_ref == "uploads/a.pdf" || slot.file_ref == "uploads/b.pdf");
}
