//! Postgres implementation of the onboarding session store.

use sqlx::{Acquire, PgPool, Postgres, Transaction};
use waba_core::error::StoreError;
use waba_core::onboarding::{ClaimedSession, CompletionFields, SessionStore, SessionTx};
use waba_core::types::DbId;

use crate::repositories::{MetaUserRepo, WaConfigurationRepo};

/// SQLSTATE for `undefined_table`.
const UNDEFINED_TABLE: &str = "42P01";

/// Opens one database transaction per completion attempt.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl SessionStore for PgSessionStore {
    type Tx = PgSessionTx;

    async fn begin(&self) -> Result<PgSessionTx, StoreError> {
        let tx = self.pool.begin().await.map_err(backend)?;
        Ok(PgSessionTx { tx })
    }
}

/// An open transaction. Dropping it without committing rolls it back.
pub struct PgSessionTx {
    tx: Transaction<'static, Postgres>,
}

impl SessionTx for PgSessionTx {
    async fn claim_pending_session(
        &mut self,
        token: &str,
    ) -> Result<Option<ClaimedSession>, StoreError> {
        let session = WaConfigurationRepo::claim_pending_by_session(&mut self.tx, token)
            .await
            .map_err(backend)?;
        Ok(session.map(|s| ClaimedSession {
            id: s.id,
            user_id: s.user_id,
        }))
    }

    async fn exists_by_phone_number(
        &mut self,
        phone_number_id: &str,
    ) -> Result<bool, StoreError> {
        WaConfigurationRepo::exists_by_phone_number(&mut self.tx, phone_number_id)
            .await
            .map_err(backend)
    }

    async fn relink_by_phone_number(
        &mut self,
        fields: &CompletionFields<'_>,
    ) -> Result<u64, StoreError> {
        WaConfigurationRepo::relink_by_phone_number(&mut self.tx, fields)
            .await
            .map_err(backend)
    }

    async fn complete_pending_by_id(
        &mut self,
        id: DbId,
        fields: &CompletionFields<'_>,
    ) -> Result<u64, StoreError> {
        WaConfigurationRepo::complete_pending_by_id(&mut self.tx, id, fields)
            .await
            .map_err(backend)
    }

    /// Runs inside a savepoint: a failed statement aborts the whole
    /// Postgres transaction otherwise, and a missing table must not.
    async fn reached_limit(&mut self, user_id: DbId) -> Result<Option<bool>, StoreError> {
        let mut savepoint = (&mut self.tx).begin().await.map_err(backend)?;

        match MetaUserRepo::reached_limit(&mut savepoint, user_id).await {
            Ok(flag) => {
                savepoint.commit().await.map_err(backend)?;
                Ok(flag)
            }
            Err(err) => {
                savepoint.rollback().await.map_err(backend)?;
                if is_undefined_table(&err) {
                    Err(StoreError::UndefinedTable("metausers".to_string()))
                } else {
                    Err(backend(err))
                }
            }
        }
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(backend)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(backend)
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(Box::new(err))
}

fn is_undefined_table(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNDEFINED_TABLE)
    )
}
