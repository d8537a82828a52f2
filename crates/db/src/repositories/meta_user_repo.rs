//! Repository for the optional `metausers` table.

use sqlx::PgConnection;
use waba_core::types::DbId;

/// Read access to per-user onboarding limits.
pub struct MetaUserRepo;

impl MetaUserRepo {
    /// The user's `reached_limit` flag, or `None` if the user has no row.
    ///
    /// Fails with SQLSTATE `42P01` when the table does not exist.
    pub async fn reached_limit(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<Option<bool>, sqlx::Error> {
        let row: Option<(bool,)> =
            sqlx::query_as("SELECT reached_limit FROM metausers WHERE user_id = $1 LIMIT 1")
                .bind(user_id)
                .fetch_optional(conn)
                .await?;
        Ok(row.map(|(flag,)| flag))
    }
}
