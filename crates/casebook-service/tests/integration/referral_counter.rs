//! Referral attribution ledger tests: counter consistency with case
//! creation and deletion, and resolve-or-create tie-breaking.

use std::time::Duration;

use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use casebook_db::db::query::referral as referral_query;
use casebook_db::model::referral::NewReferral;
use casebook_service::case_record::delete::delete_case;
use casebook_service::error::ServiceError;
use casebook_service::referral::{reconcile, resolve_or_create};

use super::helpers::{TestDb, agent, vijay};

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn create_with_referral_increments_counter() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let created = db.seed_case(&actor, Some(vijay())).await.expect("case");

    let referral = created.referral.expect("referral attached");
    assert_eq!(referral.name, "Vijay Kumar");
    assert_eq!(referral.phone, "9988776655");
    assert_eq!(referral.cases, 1);
    assert_eq!(created.case.referral_id, Some(referral.id));
    assert_eq!(created.case.referral_name.as_deref(), Some("Vijay Kumar"));

    // A second attributed case reuses the same referral.
    let second = db.seed_case(&actor, Some(vijay())).await.expect("case");
    let referral2 = second.referral.expect("referral attached");
    assert_eq!(referral2.id, referral.id);
    assert_eq!(referral2.cases, 2);

    // Counter matches the source of truth.
    let mut conn = db.conn().await.expect("conn");
    let linked = referral_query::count_linked_cases(&mut conn, referral.id)
        .await
        .expect("count");
    assert_eq!(linked, 2);
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn delete_decrements_counter_floored_at_zero() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let created = db.seed_case(&actor, Some(vijay())).await.expect("case");
    let referral_id = created.referral.expect("referral").id;

    let mut conn = db.conn().await.expect("conn");
    delete_case(&mut conn, created.case.id, &actor)
        .await
        .expect("delete");

    let referral = referral_query::find_by_id(&mut conn, referral_id)
        .await
        .expect("query")
        .expect("referral exists");
    assert_eq!(referral.cases, 0);

    // Over-decrement is a no-op, never negative.
    let referral = referral_query::decrement_cases(&mut conn, referral_id)
        .await
        .expect("decrement");
    assert_eq!(referral.cases, 0);
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn delete_without_referral_leaves_counters_alone() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let attributed = db.seed_case(&actor, Some(vijay())).await.expect("case");
    let plain = db.seed_case(&actor, None).await.expect("case");
    let referral_id = attributed.referral.expect("referral").id;

    let mut conn = db.conn().await.expect("conn");
    delete_case(&mut conn, plain.case.id, &actor)
        .await
        .expect("delete");

    let referral = referral_query::find_by_id(&mut conn, referral_id)
        .await
        .expect("query")
        .expect("referral exists");
    assert_eq!(referral.cases, 1);
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn resolve_prefers_exact_match_over_name_only() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let mut conn = db.conn().await.expect("conn");

    // Same name twice: once without a phone, once with.
    let sentinel = resolve_or_create(&mut conn, "Vijay Kumar", None)
        .await
        .expect("create sentinel");
    let with_phone = resolve_or_create(&mut conn, "Vijay Kumar", Some("9988776655"))
        .await
        .expect("create with phone");
    assert_ne!(sentinel.id, with_phone.id, "distinct attribution keys");

    // Exact (name, phone) wins.
    let resolved = resolve_or_create(&mut conn, "Vijay Kumar", Some("9988776655"))
        .await
        .expect("resolve");
    assert_eq!(resolved.id, with_phone.id);

    // Name-only resolves to the sentinel-phone referral.
    let resolved = resolve_or_create(&mut conn, "Vijay Kumar", None)
        .await
        .expect("resolve");
    assert_eq!(resolved.id, sentinel.id);
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn concurrent_attributed_intakes_share_one_referral() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let (first, second) = tokio::join!(
        db.seed_case(&actor, Some(vijay())),
        db.seed_case(&actor, Some(vijay())),
    );
    let first = first.expect("first intake").referral.expect("referral");
    let second = second.expect("second intake").referral.expect("referral");
    assert_eq!(first.id, second.id, "one attribution row");

    let mut conn = db.conn().await.expect("conn");
    let referral = referral_query::find_by_id(&mut conn, first.id)
        .await
        .expect("query")
        .expect("referral exists");
    assert_eq!(referral.cases, 2);
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn resolve_recovers_after_losing_the_create() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    // First writer inserts the referral and holds its transaction open long
    // enough for the second writer's insert to block on the unique index.
    let winner = async {
        let mut conn = db.conn().await.expect("conn");
        conn.transaction::<_, ServiceError, _>(|tx| {
            async move {
                let created = referral_query::create_referral(
                    tx,
                    &NewReferral {
                        id: uuid::Uuid::new_v4(),
                        name: "Vijay Kumar",
                        phone: "9988776655",
                    },
                )
                .await?;
                tokio::time::sleep(Duration::from_millis(400)).await;
                Ok(created)
            }
            .scope_boxed()
        })
        .await
    };

    // Second writer starts after the first's insert and before its commit, so
    // the lookup misses and the insert loses the unique-index collision. It
    // must still resolve to the first writer's row, and its own enclosing
    // transaction must stay usable afterwards.
    let loser = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let mut conn = db.conn().await.expect("conn");
        conn.transaction::<_, ServiceError, _>(|tx| {
            async move {
                let resolved = resolve_or_create(tx, "Vijay Kumar", Some("9988776655")).await?;
                let reread = referral_query::find_by_id(tx, resolved.id)
                    .await?
                    .expect("referral visible in same transaction");
                assert_eq!(reread.id, resolved.id);
                Ok(resolved)
            }
            .scope_boxed()
        })
        .await
    };

    let (winner, loser) = tokio::join!(winner, loser);
    let winner = winner.expect("winning insert");
    let loser = loser.expect("losing resolve");
    assert_eq!(loser.id, winner.id);
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn reconcile_repairs_counter_drift() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let actor = agent();
    let created = db.seed_case(&actor, Some(vijay())).await.expect("case");
    let referral_id = created.referral.expect("referral").id;

    let mut conn = db.conn().await.expect("conn");

    // Simulate drift.
    referral_query::set_cases(&mut conn, referral_id, 41)
        .await
        .expect("force drift");

    let repaired = reconcile(&mut conn, referral_id).await.expect("reconcile");
    assert_eq!(repaired.cases, 1);
}

#[test_log::test(tokio::test)]
#[ignore = "requires running database"]
async fn reconcile_does_not_touch_success_metrics() {
    let db = TestDb::new().await.expect("test database");
    db.truncate_all().await.expect("truncate");

    let mut conn = db.conn().await.expect("conn");
    let referral = resolve_or_create(&mut conn, "Vijay Kumar", Some("9988776655"))
        .await
        .expect("create");

    let repaired = reconcile(&mut conn, referral.id).await.expect("reconcile");
    assert_eq!(repaired.success_rate, referral.success_rate);
    assert_eq!(repaired.commission, referral.commission);
}
