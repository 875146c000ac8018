//! PostgreSQL user store using diesel_async over a bb8 pool.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::models::{UserChanges, UserRecord};
use crate::store::{StoreError, StoreResult, UserStore};

/// User store holding an async connection pool.
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap.
#[derive(Clone)]
pub struct PgUserStore {
    pool: AsyncDbPool,
}

impl PgUserStore {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> StoreResult<Vec<UserRecord>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await.map_err(|e| StoreError::pool(e))?;

        users
            .select(UserRecord::as_select())
            .order(user_name.asc())
            .load(&mut conn)
            .await
            .map_err(|e| StoreError::backend("list users", e))
    }

    async fn find(&self, name: &str) -> StoreResult<Option<UserRecord>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await.map_err(|e| StoreError::pool(e))?;

        users
            .filter(user_name.eq(name))
            .select(UserRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| StoreError::backend("find user", e))
    }

    async fn insert(&self, record: UserRecord) -> StoreResult<UserRecord> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await.map_err(|e| StoreError::pool(e))?;

        let result = diesel::insert_into(users)
            .values(&record)
            .returning(UserRecord::as_returning())
            .get_result(&mut conn)
            .await;

        match result {
            Ok(stored) => Ok(stored),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(StoreError::Duplicate { user: record.user })
            }
            Err(e) => Err(StoreError::backend("insert user", e)),
        }
    }

    async fn update(&self, name: &str, changes: UserChanges) -> StoreResult<Option<UserRecord>> {
        // diesel rejects an UPDATE without columns
        if changes.is_empty() {
            return self.find(name).await;
        }

        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await.map_err(|e| StoreError::pool(e))?;

        diesel::update(users.filter(user_name.eq(name)))
            .set(&changes)
            .returning(UserRecord::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| StoreError::backend("update user", e))
    }

    async fn delete(&self, name: &str) -> StoreResult<bool> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await.map_err(|e| StoreError::pool(e))?;

        let affected = diesel::delete(users.filter(user_name.eq(name)))
            .execute(&mut conn)
            .await
            .map_err(|e| StoreError::backend("delete user", e))?;
        Ok(affected > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.pool.get().await.map_err(|e| StoreError::pool(e))?;

        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::backend("ping", e))
    }
}
