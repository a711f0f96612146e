//! Request thread tests: one-shot mailbox semantics, admin-only replies,
//! last-write-wins on re-reply, and list ordering.

use casebook_core::error::CoreError;
use casebook_db::db::enums::ThreadStatus;
use casebook_service::error::ServiceError;
use casebook_service::thread::{open_thread, open_threads, reply, threads_for_case};

use super::helpers::{TestDb, admin, agent, officer};

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn open_requires_message_and_existing_case() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let created = db.seed_case(&actor, None).await.expect("case");
    let mut conn = db.conn().await.expect("conn");

    let err = open_thread(&mut conn, created.case.id, &actor, "   ")
        .await
        .expect_err("blank message");
    assert!(matches!(
        err,
        ServiceError::CoreError(CoreError::Validation(_))
    ));

    let err = open_thread(&mut conn, uuid::Uuid::new_v4(), &actor, "Need the statement")
        .await
        .expect_err("unknown case");
    assert!(matches!(err, ServiceError::NotFound(_)));

    let thread = open_thread(&mut conn, created.case.id, &actor, "Need the statement")
        .await
        .expect("open");
    assert_eq!(thread.status, ThreadStatus::Open);
    assert_eq!(thread.agent_id, actor.user_id);
    assert!(thread.admin_response.is_none());
    assert!(thread.answered_at.is_none());
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn reply_is_admin_only_and_flips_to_answered() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let created = db.seed_case(&actor, None).await.expect("case");
    let mut conn = db.conn().await.expect("conn");

    let thread = open_thread(&mut conn, created.case.id, &actor, "Which branch?")
        .await
        .expect("open");

    let err = reply(&mut conn, thread.id, &officer(), "Andheri West")
        .await
        .expect_err("officer cannot reply");
    assert!(matches!(err, ServiceError::AuthorizationError(_)));

    let responder = admin();
    let answered = reply(&mut conn, thread.id, &responder, "Andheri West")
        .await
        .expect("reply");
    assert_eq!(answered.status, ThreadStatus::Answered);
    assert_eq!(answered.admin_response.as_deref(), Some("Andheri West"));
    assert_eq!(answered.admin_id, Some(responder.user_id));
    assert!(answered.answered_at.is_some());
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn second_reply_overwrites_the_first() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let created = db.seed_case(&actor, None).await.expect("case");
    let mut conn = db.conn().await.expect("conn");

    let thread = open_thread(&mut conn, created.case.id, &actor, "Which branch?")
        .await
        .expect("open");

    let first_admin = admin();
    reply(&mut conn, thread.id, &first_admin, "Andheri West")
        .await
        .expect("first reply");

    let second_admin = admin();
    let answered = reply(&mut conn, thread.id, &second_admin, "Andheri East")
        .await
        .expect("second reply");
    assert_eq!(answered.status, ThreadStatus::Answered);
    assert_eq!(answered.admin_response.as_deref(), Some("Andheri East"));
    assert_eq!(answered.admin_id, Some(second_admin.user_id));
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn listings_order_by_creation_and_open_excludes_answered() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let created = db.seed_case(&actor, None).await.expect("case");
    let other = db.seed_case(&actor, None).await.expect("case");
    let mut conn = db.conn().await.expect("conn");

    let first = open_thread(&mut conn, created.case.id, &actor, "First question")
        .await
        .expect("open");
    let second = open_thread(&mut conn, created.case.id, &actor, "Second question")
        .await
        .expect("open");
    let elsewhere = open_thread(&mut conn, other.case.id, &actor, "Different case")
        .await
        .expect("open");

    let listed = threads_for_case(&mut conn, created.case.id)
        .await
        .expect("list");
    let ids: Vec<uuid::Uuid> = listed.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);

    reply(&mut conn, first.id, &admin(), "Answered")
        .await
        .expect("reply");

    let open = open_threads(&mut conn).await.expect("open list");
    let ids: Vec<uuid::Uuid> = open.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![second.id, elsewhere.id]);
}
