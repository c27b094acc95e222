use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgConnection;
use tokio::sync::Mutex;

use crate::app::result::AppResult;
use crate::db::entity::Entity;
use crate::db::uow::{ChangeSet, Session, lock};

/// A change staged on a repository, applied by `UnitOfWork::save_changes`.
#[async_trait]
pub(crate) trait StagedChange: Send {
    async fn apply(self: Box<Self>, conn: &mut PgConnection) -> Result<u64, sqlx::Error>;
}

enum Change<E: Entity> {
    Insert(E),
    Update(E),
    Delete(E::Key),
}

#[async_trait]
impl<E: Entity> StagedChange for Change<E> {
    async fn apply(self: Box<Self>, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        match *self {
            Change::Insert(entity) => entity.insert(conn).await,
            Change::Update(entity) => entity.update(conn).await,
            Change::Delete(key) => E::delete(conn, key).await,
        }
    }
}

/// CRUD facade for one entity type, bound to a unit of work.
pub struct Repository<E: Entity> {
    session: Arc<Mutex<Session>>,
    changes: ChangeSet,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    pub(crate) fn new(session: Arc<Mutex<Session>>, changes: ChangeSet) -> Self {
        Self {
            session,
            changes,
            _entity: PhantomData,
        }
    }

    pub fn add(&self, entity: E) {
        self.stage(Change::Insert(entity));
    }

    pub fn update(&self, entity: E) {
        self.stage(Change::Update(entity));
    }

    pub fn delete(&self, entity: &E) {
        self.stage(Change::Delete(entity.key()));
    }

    /// Not found is `Ok(None)`.
    pub async fn find(&self, key: E::Key) -> AppResult<Option<E>> {
        let mut guard = self.session.lock().await;
        let session = &mut *guard;
        let found = match session.transaction.as_mut() {
            Some(tx) => E::find(&mut **tx, key).await?,
            None => {
                let mut conn = session.pool.acquire().await?;
                E::find(&mut *conn, key).await?
            }
        };
        Ok(found)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let mut guard = self.session.lock().await;
        let session = &mut *guard;
        let count = match session.transaction.as_mut() {
            Some(tx) => E::count(&mut **tx).await?,
            None => {
                let mut conn = session.pool.acquire().await?;
                E::count(&mut *conn).await?
            }
        };
        Ok(count)
    }

    fn stage(&self, change: Change<E>) {
        lock(&self.changes).push(Box::new(change));
    }
}
