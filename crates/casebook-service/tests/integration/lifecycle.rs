//! Status lifecycle tests: allowed moves, resolution-date bookkeeping, the
//! administrative reopen, and the append-only timeline.

use casebook_core::error::CoreError;
use casebook_db::db::enums::{CaseStatus, TimelineKind};
use casebook_service::error::ServiceError;
use casebook_service::lifecycle::{case_timeline, reopen, transition};

use super::helpers::{TestDb, admin, agent, officer};

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn resolved_sets_resolution_date_and_rework_clears_it() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = officer();
    let created = db.seed_case(&agent(), None).await.expect("case");
    let case_id = created.case.id;
    assert_eq!(created.case.status, CaseStatus::New);
    assert!(created.case.resolution_date.is_none());

    let mut conn = db.conn().await.expect("conn");

    let case = transition(&mut conn, case_id, CaseStatus::InProgress, &actor)
        .await
        .expect("to in-progress");
    assert!(case.resolution_date.is_none());

    let case = transition(&mut conn, case_id, CaseStatus::Resolved, &actor)
        .await
        .expect("to resolved");
    let resolved_at = case.resolution_date.expect("resolution date set");

    // Back to rework clears the date.
    let case = transition(&mut conn, case_id, CaseStatus::InProgress, &actor)
        .await
        .expect("back to in-progress");
    assert!(case.resolution_date.is_none());

    // Resolve again, then close: the date set at resolve time survives.
    let case = transition(&mut conn, case_id, CaseStatus::Resolved, &actor)
        .await
        .expect("to resolved again");
    let second_resolved_at = case.resolution_date.expect("resolution date set");
    assert!(second_resolved_at >= resolved_at);

    let case = transition(&mut conn, case_id, CaseStatus::Closed, &actor)
        .await
        .expect("to closed");
    assert_eq!(case.resolution_date, Some(second_resolved_at));
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn closing_unresolved_case_sets_resolution_date() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = officer();
    let created = db.seed_case(&agent(), None).await.expect("case");
    let mut conn = db.conn().await.expect("conn");

    transition(&mut conn, created.case.id, CaseStatus::InProgress, &actor)
        .await
        .expect("to in-progress");
    let case = transition(&mut conn, created.case.id, CaseStatus::Closed, &actor)
        .await
        .expect("straight to closed");
    assert!(case.resolution_date.is_some());
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn illegal_transitions_name_the_rejected_pair() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = officer();
    let created = db.seed_case(&agent(), None).await.expect("case");
    let mut conn = db.conn().await.expect("conn");

    // Skipping forward is rejected.
    let err = transition(&mut conn, created.case.id, CaseStatus::Resolved, &actor)
        .await
        .expect_err("new -> resolved must fail");
    let ServiceError::CoreError(CoreError::IllegalTransition { from, to }) = err else {
        panic!("expected IllegalTransition, got {err}");
    };
    assert_eq!(from, "new");
    assert_eq!(to, "resolved");
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn closed_is_terminal_without_reopen() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = officer();
    let created = db.seed_case(&agent(), None).await.expect("case");
    let case_id = created.case.id;
    let mut conn = db.conn().await.expect("conn");

    transition(&mut conn, case_id, CaseStatus::InProgress, &actor)
        .await
        .expect("to in-progress");
    transition(&mut conn, case_id, CaseStatus::Closed, &actor)
        .await
        .expect("to closed");

    for target in [CaseStatus::New, CaseStatus::InProgress, CaseStatus::Resolved] {
        let err = transition(&mut conn, case_id, target, &actor)
            .await
            .expect_err("closed is terminal");
        assert!(matches!(
            err,
            ServiceError::CoreError(CoreError::IllegalTransition { .. })
        ));
    }
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn simultaneous_identical_transitions_have_one_winner() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = officer();
    let created = db.seed_case(&agent(), None).await.expect("case");
    let case_id = created.case.id;

    // Both writers target new -> in-progress on their own connections. The
    // row lock in the transition serialises them: the second validates
    // against the first's committed status and is rejected.
    let first = async {
        let mut conn = db.conn().await.expect("conn");
        transition(&mut conn, case_id, CaseStatus::InProgress, &actor).await
    };
    let second = async {
        let mut conn = db.conn().await.expect("conn");
        transition(&mut conn, case_id, CaseStatus::InProgress, &actor).await
    };
    let (first, second) = tokio::join!(first, second);

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let err = outcomes
        .into_iter()
        .find_map(Result::err)
        .expect("one writer rejected");
    assert!(matches!(
        err,
        ServiceError::CoreError(CoreError::IllegalTransition { .. })
    ));

    let mut conn = db.conn().await.expect("conn");
    let entries = case_timeline(&mut conn, case_id).await.expect("timeline");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].note, "status: new -> in-progress");
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn reopen_requires_admin_and_logs_distinctly() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = officer();
    let created = db.seed_case(&agent(), None).await.expect("case");
    let case_id = created.case.id;
    let mut conn = db.conn().await.expect("conn");

    transition(&mut conn, case_id, CaseStatus::InProgress, &actor)
        .await
        .expect("to in-progress");
    transition(&mut conn, case_id, CaseStatus::Closed, &actor)
        .await
        .expect("to closed");

    let err = reopen(&mut conn, case_id, &actor)
        .await
        .expect_err("officer cannot reopen");
    assert!(matches!(err, ServiceError::AuthorizationError(_)));

    let case = reopen(&mut conn, case_id, &admin()).await.expect("reopen");
    assert_eq!(case.status, CaseStatus::InProgress);
    assert!(case.resolution_date.is_none());

    let entries = case_timeline(&mut conn, case_id).await.expect("timeline");
    assert_eq!(
        entries.last().expect("entries").entry_kind,
        TimelineKind::Reopen
    );
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn timeline_appends_in_order() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = officer();
    let created = db.seed_case(&agent(), None).await.expect("case");
    let case_id = created.case.id;
    let mut conn = db.conn().await.expect("conn");

    transition(&mut conn, case_id, CaseStatus::InProgress, &actor)
        .await
        .expect("to in-progress");
    transition(&mut conn, case_id, CaseStatus::Resolved, &actor)
        .await
        .expect("to resolved");

    let entries = case_timeline(&mut conn, case_id).await.expect("timeline");
    let notes: Vec<&str> = entries.iter().map(|e| e.note.as_str()).collect();
    assert_eq!(
        notes,
        vec!["status: new -> in-progress", "status: in-progress -> resolved"]
    );
    assert!(entries.iter().all(|e| e.actor == actor.user_id));
    assert!(
        entries
            .iter()
            .all(|e| e.entry_kind == TimelineKind::Transition)
    );
}
