use std::fmt::Debug;

use async_trait::async_trait;
use sqlx::PgConnection;

/// A persisted record addressable by its key.
///
/// Implementations hold the per-table SQL; the unit of work decides which
/// connection (transactional or pooled) the statements run on.
#[async_trait]
pub trait Entity: Clone + Send + Sync + Unpin + 'static {
    type Key: Copy + Debug + Send + Sync + 'static;

    /// Table name, also used in log and error messages.
    const TABLE: &'static str;

    fn key(&self) -> Self::Key;

    async fn find(conn: &mut PgConnection, key: Self::Key) -> Result<Option<Self>, sqlx::Error>;

    /// Returns the number of affected rows.
    async fn insert(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error>;

    async fn update(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error>;

    async fn delete(conn: &mut PgConnection, key: Self::Key) -> Result<u64, sqlx::Error>;

    async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", Self::TABLE))
            .fetch_one(conn)
            .await?;
        Ok(row.0)
    }
}
