use async_trait::async_trait;

use crate::db::{self, Db};
use crate::store::{HealthStore, StoreResult};

mod chat;
mod reviews;
mod teams;
mod tournaments;
mod users;

/// Postgres-backed store. Cheap to clone; all methods go through the pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Db,
}

impl PgStore {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &Db {
        &self.pool
    }
}

#[async_trait]
impl HealthStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        db::ping(&self.pool).await?;
        Ok(())
    }
}
