//! Optional per-user onboarding limit.

use std::collections::HashSet;
use std::future::Future;

use crate::error::StoreError;
use crate::onboarding::store::SessionTx;
use crate::types::DbId;

/// Outcome of a limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDecision {
    Allow,
    Deny,
    /// The policy's backing data does not exist; treated as [`Allow`](Self::Allow).
    Unavailable,
}

impl LimitDecision {
    pub fn is_denied(self) -> bool {
        self == Self::Deny
    }
}

/// Decides whether the owner of a claimed session may complete onboarding.
pub trait LimitPolicy: Send + Sync {
    fn evaluate<T: SessionTx>(
        &self,
        tx: &mut T,
        user_id: DbId,
    ) -> impl Future<Output = Result<LimitDecision, StoreError>> + Send;
}

/// Policy that never consults the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl LimitPolicy for Unrestricted {
    async fn evaluate<T: SessionTx>(
        &self,
        _tx: &mut T,
        _user_id: DbId,
    ) -> Result<LimitDecision, StoreError> {
        Ok(LimitDecision::Allow)
    }
}

/// Denies users whose limit flag is set unless their id is whitelisted.
#[derive(Debug, Clone, Default)]
pub struct WhitelistPolicy {
    whitelist: HashSet<String>,
}

impl WhitelistPolicy {
    pub fn new<I, S>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            whitelist: user_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list of user ids. Blank entries are ignored.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        )
    }

    pub fn is_whitelisted(&self, user_id: DbId) -> bool {
        self.whitelist.contains(&user_id.to_string())
    }
}

impl LimitPolicy for WhitelistPolicy {
    async fn evaluate<T: SessionTx>(
        &self,
        tx: &mut T,
        user_id: DbId,
    ) -> Result<LimitDecision, StoreError> {
        match tx.reached_limit(user_id).await {
            Ok(Some(true)) if !self.is_whitelisted(user_id) => Ok(LimitDecision::Deny),
            Ok(_) => Ok(LimitDecision::Allow),
            Err(StoreError::UndefinedTable(table)) => {
                tracing::debug!(%table, "Limit table missing, skipping limit check");
                Ok(LimitDecision::Unavailable)
            }
            Err(e) => Err(e),
        }
    }
}

/// The policy selected by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredPolicy {
    Unrestricted(Unrestricted),
    Whitelist(WhitelistPolicy),
}

impl ConfiguredPolicy {
    /// Whitelist policy when `ADMIN_WHITELIST`-style input is present and
    /// non-blank, otherwise unrestricted.
    pub fn from_whitelist(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Self::Whitelist(WhitelistPolicy::from_csv(raw)),
            None => Self::Unrestricted(Unrestricted),
        }
    }
}

impl LimitPolicy for ConfiguredPolicy {
    async fn evaluate<T: SessionTx>(
        &self,
        tx: &mut T,
        user_id: DbId,
    ) -> Result<LimitDecision, StoreError> {
        match self {
            Self::Unrestricted(policy) => policy.evaluate(tx, user_id).await,
            Self::Whitelist(policy) => policy.evaluate(tx, user_id).await,
        }
    }
}
