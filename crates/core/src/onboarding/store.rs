use std::future::Future;

use secrecy::SecretString;

use crate::error::StoreError;
use crate::types::DbId;

/// The pending record locked by a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimedSession {
    pub id: DbId,
    pub user_id: DbId,
}

/// Values written to a record when onboarding completes.
#[derive(Debug)]
pub struct CompletionFields<'a> {
    pub access_token: &'a SecretString,
    pub phone_number_id: &'a str,
    pub waba_id: &'a str,
    /// Connection status label.
    pub status: &'a str,
    pub waba_name: Option<&'a str>,
}

/// Opens transactions against the onboarding record store.
pub trait SessionStore: Send + Sync {
    type Tx: SessionTx;

    fn begin(&self) -> impl Future<Output = Result<Self::Tx, StoreError>> + Send;
}

/// Operations on onboarding records inside one transaction.
///
/// Dropping a transaction without calling [`commit`](SessionTx::commit)
/// must discard its writes and release its locks.
pub trait SessionTx: Send {
    /// Lock the record holding `token` if it is pending and unexpired.
    ///
    /// Unknown, consumed and expired tokens all yield `None`. The lock is
    /// held until the transaction ends, so a concurrent claim of the same
    /// token waits and then finds nothing.
    fn claim_pending_session(
        &mut self,
        token: &str,
    ) -> impl Future<Output = Result<Option<ClaimedSession>, StoreError>> + Send;

    /// Whether any record is already linked to `phone_number_id`.
    fn exists_by_phone_number(
        &mut self,
        phone_number_id: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Re-link the record already holding `fields.phone_number_id`.
    /// Returns the number of rows updated.
    fn relink_by_phone_number(
        &mut self,
        fields: &CompletionFields<'_>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Complete record `id` only if it is still pending. Returns the number
    /// of rows updated; zero means the session was consumed concurrently.
    fn complete_pending_by_id(
        &mut self,
        id: DbId,
        fields: &CompletionFields<'_>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// The owning user's onboarding limit flag from the optional limits
    /// table. `None` when the user has no row there.
    ///
    /// Fails with [`StoreError::UndefinedTable`] when the table is absent;
    /// the transaction must remain usable afterwards.
    fn reached_limit(
        &mut self,
        user_id: DbId,
    ) -> impl Future<Output = Result<Option<bool>, StoreError>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn rollback(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
