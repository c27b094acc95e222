mod common;

use std::sync::Arc;

use uuid::Uuid;
use workforce::app::result::Failure;
use workforce::db::UnitOfWork;
use workforce::models::{Department, Position};

fn department(name: &str) -> Department {
    Department::new(name.to_string(), Some("HN".to_string()), None)
}

#[tokio::test]
async fn repository_is_cached_per_entity() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());

    let first = uow.repository::<Department>();
    let second = uow.repository::<Department>();
    assert!(Arc::ptr_eq(&first, &second));

    // Clones share the session, and with it the cache.
    let shared = uow.clone().repository::<Department>();
    assert!(Arc::ptr_eq(&first, &shared));

    common::drop_database(pool, &db_name).await;
}

#[tokio::test]
async fn staged_changes_are_invisible_until_saved() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());
    let departments = uow.repository::<Department>();

    let created = department("Legal");
    departments.add(created.clone());
    assert_eq!(uow.pending_changes(), 1);
    assert_eq!(departments.count().await.unwrap(), 0);
    assert!(departments.find(created.id).await.unwrap().is_none());

    assert_eq!(uow.save_changes().await.unwrap(), 1);
    assert_eq!(uow.pending_changes(), 0);
    assert_eq!(departments.count().await.unwrap(), 1);
    assert_eq!(
        departments.find(created.id).await.unwrap().unwrap().department_name,
        "Legal"
    );

    common::drop_database(pool, &db_name).await;
}

#[tokio::test]
async fn save_without_changes_affects_nothing() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());

    assert_eq!(uow.save_changes().await.unwrap(), 0);

    common::drop_database(pool, &db_name).await;
}

#[tokio::test]
async fn changes_apply_in_staging_order() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());
    let departments = uow.repository::<Department>();

    let mut created = department("Audit");
    departments.add(created.clone());
    created.department_name = "Internal Audit".to_string();
    departments.update(created.clone());
    assert_eq!(uow.save_changes().await.unwrap(), 2);

    let stored = departments.find(created.id).await.unwrap().unwrap();
    assert_eq!(stored.department_name, "Internal Audit");

    departments.delete(&stored);
    assert_eq!(uow.save_changes().await.unwrap(), 1);
    assert!(departments.find(created.id).await.unwrap().is_none());

    common::drop_database(pool, &db_name).await;
}

#[tokio::test]
async fn rollback_discards_saved_changes() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());
    let departments = uow.repository::<Department>();

    uow.begin_transaction().await.unwrap();
    assert!(uow.has_transaction().await);

    departments.add(department("Temp"));
    uow.save_changes().await.unwrap();
    // Visible inside the transaction.
    assert_eq!(departments.count().await.unwrap(), 1);

    uow.rollback().await.unwrap();
    assert!(!uow.has_transaction().await);
    assert_eq!(departments.count().await.unwrap(), 0);

    common::drop_database(pool, &db_name).await;
}

#[tokio::test]
async fn commit_persists_saved_changes() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());

    uow.begin_transaction().await.unwrap();
    uow.repository::<Position>().add(Position::new(
        "Analyst".to_string(),
        None,
        rust_decimal::Decimal::new(120_000, 2),
    ));
    uow.save_changes().await.unwrap();
    uow.commit().await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM positions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    common::drop_database(pool, &db_name).await;
}

#[tokio::test]
async fn commit_and_rollback_without_transaction_are_noops() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());

    uow.commit().await.unwrap();
    uow.rollback().await.unwrap();
    assert!(!uow.has_transaction().await);

    common::drop_database(pool, &db_name).await;
}

#[tokio::test]
async fn second_transaction_is_rejected() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());

    uow.begin_transaction().await.unwrap();
    let err = uow.begin_transaction().await.unwrap_err();
    assert!(matches!(err, Failure::Unexpected(_)));

    // The first one is still usable.
    assert!(uow.has_transaction().await);
    uow.rollback().await.unwrap();

    common::drop_database(pool, &db_name).await;
}

#[tokio::test]
async fn execute_commits_on_success() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());

    let id = uow
        .execute(|uow| async move {
            let created = department("Procurement");
            uow.repository::<Department>().add(created.clone());
            Ok(created.id)
        })
        .await
        .unwrap();

    assert!(!uow.has_transaction().await);
    assert!(uow.repository::<Department>().find(id).await.unwrap().is_some());

    common::drop_database(pool, &db_name).await;
}

#[tokio::test]
async fn execute_without_changes_is_no_changes() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());

    let err = uow.execute(|_| async { Ok(()) }).await.unwrap_err();
    assert_eq!(err, Failure::NoChanges);
    assert!(!uow.has_transaction().await);

    common::drop_database(pool, &db_name).await;
}

#[tokio::test]
async fn execute_rolls_back_when_work_fails() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());

    let err = uow
        .execute(|uow| async move {
            let departments = uow.repository::<Department>();
            departments.add(department("Doomed"));
            uow.save_changes().await?;
            Err::<(), _>(Failure::Conflict("stop".to_string()))
        })
        .await
        .unwrap_err();

    assert_eq!(err, Failure::Conflict("stop".to_string()));
    assert_eq!(uow.pending_changes(), 0);
    assert_eq!(uow.repository::<Department>().count().await.unwrap(), 0);

    common::drop_database(pool, &db_name).await;
}

#[tokio::test]
async fn unique_violation_surfaces_as_conflict() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());

    uow.repository::<Department>().add(department("Twin"));
    uow.save_changes().await.unwrap();

    let err = uow
        .execute(|uow| async move {
            uow.repository::<Department>().add(department("Twin"));
            Ok(())
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Failure::Conflict(_)));
    assert_eq!(uow.repository::<Department>().count().await.unwrap(), 1);

    common::drop_database(pool, &db_name).await;
}

#[tokio::test]
async fn find_missing_key_is_none() {
    let (pool, db_name) = common::fresh_database().await;
    let uow = UnitOfWork::new(pool.clone());

    let found = uow.repository::<Department>().find(Uuid::now_v7()).await.unwrap();
    assert!(found.is_none());

    common::drop_database(pool, &db_name).await;
}
