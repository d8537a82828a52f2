//! Repository for the `wa_configurations` table.

use secrecy::ExposeSecret;
use sqlx::{PgConnection, PgPool};
use waba_core::onboarding::CompletionFields;
use waba_core::types::DbId;

use crate::models::wa_configuration::{
    CreatePendingConfiguration, PendingSession, WaConfiguration,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, phone_number_id, waba_id, access_token, status, \
                       waba_name, is_active, onboarding_status, onboarding_session, \
                       onboarding_expires_at, onboarding_consumed_at, created_at, updated_at";

/// Predicate matching a claimable session bound to `$1`.
const PENDING_SESSION: &str = "onboarding_session = $1 \
                               AND onboarding_status = 'pending' \
                               AND onboarding_expires_at > NOW()";

/// Provides query operations for WhatsApp configurations.
pub struct WaConfigurationRepo;

impl WaConfigurationRepo {
    /// Insert a pending configuration awaiting onboarding.
    pub async fn create_pending(
        pool: &PgPool,
        input: &CreatePendingConfiguration,
    ) -> Result<WaConfiguration, sqlx::Error> {
        let query = format!(
            "INSERT INTO wa_configurations (user_id, onboarding_session, onboarding_expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WaConfiguration>(&query)
            .bind(input.user_id)
            .bind(&input.onboarding_session)
            .bind(input.onboarding_expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a configuration by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WaConfiguration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wa_configurations WHERE id = $1");
        sqlx::query_as::<_, WaConfiguration>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the configuration linked to a phone number.
    pub async fn find_by_phone_number(
        pool: &PgPool,
        phone_number_id: &str,
    ) -> Result<Option<WaConfiguration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wa_configurations WHERE phone_number_id = $1");
        sqlx::query_as::<_, WaConfiguration>(&query)
            .bind(phone_number_id)
            .fetch_optional(pool)
            .await
    }

    /// Look up a claimable session without locking it.
    pub async fn find_pending_by_session(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<PendingSession>, sqlx::Error> {
        let query = format!(
            "SELECT id, user_id, onboarding_expires_at FROM wa_configurations
             WHERE {PENDING_SESSION}
             LIMIT 1"
        );
        sqlx::query_as::<_, PendingSession>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Lock a claimable session for the rest of the transaction.
    ///
    /// A concurrent claim of the same token blocks on the row lock and,
    /// once the holder commits, re-evaluates the predicate and finds no row.
    pub async fn claim_pending_by_session(
        conn: &mut PgConnection,
        token: &str,
    ) -> Result<Option<PendingSession>, sqlx::Error> {
        let query = format!(
            "SELECT id, user_id, onboarding_expires_at FROM wa_configurations
             WHERE {PENDING_SESSION}
             LIMIT 1
             FOR UPDATE"
        );
        sqlx::query_as::<_, PendingSession>(&query)
            .bind(token)
            .fetch_optional(conn)
            .await
    }

    pub async fn exists_by_phone_number(
        conn: &mut PgConnection,
        phone_number_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM wa_configurations WHERE phone_number_id = $1)",
        )
        .bind(phone_number_id)
        .fetch_one(conn)
        .await?;
        Ok(exists)
    }

    /// Re-link the configuration already holding the phone number.
    /// Returns the number of rows updated.
    pub async fn relink_by_phone_number(
        conn: &mut PgConnection,
        fields: &CompletionFields<'_>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE wa_configurations
             SET is_active = TRUE,
                 access_token = $2,
                 waba_id = $3,
                 status = $4,
                 waba_name = $5,
                 onboarding_status = 'completed',
                 onboarding_consumed_at = NOW(),
                 onboarding_session = NULL,
                 updated_at = NOW()
             WHERE phone_number_id = $1",
        )
        .bind(fields.phone_number_id)
        .bind(fields.access_token.expose_secret())
        .bind(fields.waba_id)
        .bind(fields.status)
        .bind(fields.waba_name)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Complete a configuration only while it is still pending.
    /// Returns the number of rows updated; zero means it was consumed.
    pub async fn complete_pending_by_id(
        conn: &mut PgConnection,
        id: DbId,
        fields: &CompletionFields<'_>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE wa_configurations
             SET access_token = $2,
                 phone_number_id = $3,
                 waba_id = $4,
                 status = $5,
                 waba_name = $6,
                 is_active = TRUE,
                 onboarding_status = 'completed',
                 onboarding_consumed_at = NOW(),
                 onboarding_session = NULL,
                 updated_at = NOW()
             WHERE id = $1
               AND onboarding_status = 'pending'",
        )
        .bind(id)
        .bind(fields.access_token.expose_secret())
        .bind(fields.phone_number_id)
        .bind(fields.waba_id)
        .bind(fields.status)
        .bind(fields.waba_name)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
