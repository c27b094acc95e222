use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tokio::sync::Mutex as AsyncMutex;

use crate::app::result::{AppResult, Failure};
use crate::db::entity::Entity;
use crate::db::repository::{Repository, StagedChange};

pub(crate) type ChangeSet = Arc<Mutex<Vec<Box<dyn StagedChange>>>>;

pub(crate) struct Session {
    pub(crate) pool: PgPool,
    pub(crate) transaction: Option<Transaction<'static, Postgres>>,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One persistence session: staged changes, at most one open transaction,
/// and one cached repository per entity type.
///
/// Clones share the same session. Dropping the last clone releases the
/// connection; a transaction still open at that point is rolled back.
#[derive(Clone)]
pub struct UnitOfWork {
    inner: Arc<Inner>,
}

struct Inner {
    session: Arc<AsyncMutex<Session>>,
    changes: ChangeSet,
    repositories: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl UnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: Arc::new(AsyncMutex::new(Session {
                    pool,
                    transaction: None,
                })),
                changes: Arc::new(Mutex::new(Vec::new())),
                repositories: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn repository<E: Entity>(&self) -> Arc<Repository<E>> {
        let mut cache = lock(&self.inner.repositories);
        let id = TypeId::of::<E>();

        if let Some(repository) = cache
            .get(&id)
            .and_then(|r| Arc::clone(r).downcast::<Repository<E>>().ok())
        {
            return repository;
        }

        let repository = Arc::new(Repository::<E>::new(
            Arc::clone(&self.inner.session),
            Arc::clone(&self.inner.changes),
        ));
        cache.insert(id, repository.clone());
        repository
    }

    pub async fn begin_transaction(&self) -> AppResult<()> {
        let mut session = self.inner.session.lock().await;
        if session.transaction.is_some() {
            return Err(Failure::Unexpected(
                "A transaction is already active for this unit of work".to_string(),
            ));
        }
        let tx = session.pool.begin().await?;
        session.transaction = Some(tx);
        tracing::debug!("Transaction started");
        Ok(())
    }

    pub async fn has_transaction(&self) -> bool {
        self.inner.session.lock().await.transaction.is_some()
    }

    /// No-op when no transaction is active.
    pub async fn commit(&self) -> AppResult<()> {
        let tx = self.inner.session.lock().await.transaction.take();
        match tx {
            Some(tx) => {
                tx.commit().await?;
                tracing::debug!("Transaction committed");
            }
            None => tracing::debug!("Commit requested without an active transaction"),
        }
        Ok(())
    }

    /// No-op when no transaction is active.
    pub async fn rollback(&self) -> AppResult<()> {
        let tx = self.inner.session.lock().await.transaction.take();
        match tx {
            Some(tx) => {
                tx.rollback().await?;
                tracing::debug!("Transaction rolled back");
            }
            None => tracing::debug!("Rollback requested without an active transaction"),
        }
        Ok(())
    }

    /// Takes a transaction-scoped advisory lock, released on commit or
    /// rollback. Requires an active transaction.
    pub async fn advisory_lock(&self, key: i64) -> AppResult<()> {
        let mut session = self.inner.session.lock().await;
        let tx = session.transaction.as_mut().ok_or_else(|| {
            Failure::Unexpected("An advisory lock requires an active transaction".to_string())
        })?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(key)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub fn pending_changes(&self) -> usize {
        lock(&self.inner.changes).len()
    }

    pub fn discard_changes(&self) {
        lock(&self.inner.changes).clear();
    }

    /// Applies staged changes in staging order and returns the affected row
    /// count. Without an open transaction the batch runs in its own one.
    pub async fn save_changes(&self) -> AppResult<u64> {
        let changes = std::mem::take(&mut *lock(&self.inner.changes));
        if changes.is_empty() {
            return Ok(0);
        }

        let mut guard = self.inner.session.lock().await;
        let session = &mut *guard;
        let affected = match session.transaction.as_mut() {
            Some(tx) => apply(changes, &mut **tx).await?,
            None => {
                let mut tx = session.pool.begin().await?;
                let affected = apply(changes, &mut *tx).await?;
                tx.commit().await?;
                affected
            }
        };

        tracing::debug!(affected, "Changes saved");
        Ok(affected)
    }

    /// Runs `work` inside a transaction, then saves and commits.
    ///
    /// Rolls back when `work` fails, when saving fails, or when saving
    /// affected no rows (`Failure::NoChanges`).
    pub async fn execute<T, F, Fut>(&self, work: F) -> AppResult<T>
    where
        F: FnOnce(UnitOfWork) -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
        T: Send,
    {
        self.begin_transaction().await?;

        let failure = match work(self.clone()).await {
            Ok(value) => match self.save_changes().await {
                Ok(0) => Failure::NoChanges,
                Ok(_) => {
                    self.commit().await?;
                    return Ok(value);
                }
                Err(failure) => failure,
            },
            Err(failure) => failure,
        };

        self.discard_changes();
        if let Err(e) = self.rollback().await {
            tracing::warn!("Rollback failed: {e}");
        }
        Err(failure)
    }
}

async fn apply(
    changes: Vec<Box<dyn StagedChange>>,
    conn: &mut PgConnection,
) -> Result<u64, sqlx::Error> {
    let mut affected = 0;
    for change in changes {
        affected += change.apply(&mut *conn).await?;
    }
    Ok(affected)
}
