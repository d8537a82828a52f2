//! Completion flow: claim the session, link the number through the Graph
//! API and persist the result in one transaction.
//!
//! ```text
//! claim -> limit check -> exchange code -> verify number
//!       -> [register number] -> account name -> subscribe webhooks -> persist
//! ```
//!
//! Any error rolls the transaction back, which releases the claim and
//! leaves the session pending. A registration or subscription that the
//! remote answers with `success: false` is not an error: it only changes
//! the labels in the result.

use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};

use crate::error::{OnboardingError, MSG_INVALID_SESSION};
use crate::masking::mask;
use crate::onboarding::graph::GraphApi;
use crate::onboarding::policy::LimitPolicy;
use crate::onboarding::request::CompletionRequest;
use crate::onboarding::step::OnboardingStep;
use crate::onboarding::store::{ClaimedSession, CompletionFields, SessionStore, SessionTx};

/// Settings the orchestrator needs from the environment.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Two-step verification PIN sent when registering a number.
    pub register_pin: SecretString,
}

/// Connection status stored on the record and returned to the caller as
/// its [`label`](Self::label).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Number already on the business app and the Cloud API.
    Coexistence,
    /// Number freshly registered on the Cloud API.
    CloudApi,
    /// Registration was answered without success.
    Error,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Coexistence => "Successfully Connected to Whatsapp Coexistence",
            Self::CloudApi => "Successfully Connected to Whatsapp Cloud API",
            Self::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookStatus {
    Subscribed,
    NotSubscribed,
}

impl WebhookStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Subscribed => "Webhook subscription success",
            Self::NotSubscribed => "Webhook subscription failure",
        }
    }
}

impl Serialize for ConnectionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl Serialize for WebhookStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Result of a committed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub status: ConnectionStatus,
    pub webhook_status: WebhookStatus,
    pub waba_name: Option<String>,
    pub phone_number_id: String,
    pub waba_id: String,
    /// The number was already linked to a record, which was updated
    /// instead of the claimed one.
    pub relinked: bool,
}

/// Runs completion attempts against a store, the Graph API and a limit
/// policy.
pub struct OnboardingOrchestrator<S, G, P> {
    store: S,
    graph: G,
    policy: P,
    config: OnboardingConfig,
}

impl<S, G, P> OnboardingOrchestrator<S, G, P>
where
    S: SessionStore,
    G: GraphApi,
    P: LimitPolicy,
{
    pub fn new(store: S, graph: G, policy: P, config: OnboardingConfig) -> Self {
        Self {
            store,
            graph,
            policy,
            config,
        }
    }

    /// Run one completion attempt. Commits only on success.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionOutcome, OnboardingError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;

        match self.run(&mut tx, request).await {
            Ok(outcome) => {
                tx.commit().await?;
                tracing::info!(
                    phone_number_id = %mask(&outcome.phone_number_id),
                    waba_id = %mask(&outcome.waba_id),
                    status = outcome.status.label(),
                    webhook_status = outcome.webhook_status.label(),
                    relinked = outcome.relinked,
                    "Onboarding completed"
                );
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(
                    step = %err.step(),
                    phone_number_id = %mask(&request.phone_number_id),
                    waba_id = %mask(&request.waba_id),
                    error = %err,
                    "Onboarding attempt failed"
                );
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(
                        error = %rollback_err,
                        "Rollback after failed onboarding failed"
                    );
                }
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        tx: &mut S::Tx,
        request: &CompletionRequest,
    ) -> Result<CompletionOutcome, OnboardingError> {
        let session = tx
            .claim_pending_session(&request.session)
            .await?
            .ok_or(OnboardingError::Validation(MSG_INVALID_SESSION))?;
        tracing::debug!(record_id = session.id, user_id = session.user_id, "Session claimed");

        if self.policy.evaluate(tx, session.user_id).await?.is_denied() {
            return Err(OnboardingError::LimitReached {
                user_id: session.user_id,
            });
        }

        let access_token = self.exchange_code(&request.code).await?;

        let number = self
            .graph
            .get_number_status(&request.phone_number_id, &access_token)
            .await
            .map_err(|e| remote_failure(OnboardingStep::VerifyNumber, e))?;

        let status = if number.is_coexisting() {
            ConnectionStatus::Coexistence
        } else {
            let ack = self
                .graph
                .register_number(
                    &request.phone_number_id,
                    &access_token,
                    &self.config.register_pin,
                )
                .await
                .map_err(|e| remote_failure(OnboardingStep::RegisterNumber, e))?;
            if ack.success {
                ConnectionStatus::CloudApi
            } else {
                tracing::warn!(
                    phone_number_id = %mask(&request.phone_number_id),
                    "Number registration was not successful"
                );
                ConnectionStatus::Error
            }
        };

        let waba_name = self
            .graph
            .get_account_name(&request.waba_id, &access_token)
            .await
            .map_err(|e| remote_failure(OnboardingStep::WabaName, e))?
            .name
            .filter(|name| !name.is_empty());

        let webhook_status = if self
            .graph
            .subscribe_webhooks(&request.waba_id, &access_token)
            .await
            .map_err(|e| remote_failure(OnboardingStep::SubscribeApps, e))?
            .success
        {
            WebhookStatus::Subscribed
        } else {
            WebhookStatus::NotSubscribed
        };

        let fields = CompletionFields {
            access_token: &access_token,
            phone_number_id: &request.phone_number_id,
            waba_id: &request.waba_id,
            status: status.label(),
            waba_name: waba_name.as_deref(),
        };
        let relinked = persist(tx, session, &fields).await?;

        Ok(CompletionOutcome {
            status,
            webhook_status,
            waba_name,
            phone_number_id: request.phone_number_id.clone(),
            waba_id: request.waba_id.clone(),
            relinked,
        })
    }

    /// Exchange the authorization code; a grant without a token counts as
    /// a failed exchange.
    async fn exchange_code(&self, code: &str) -> Result<SecretString, OnboardingError> {
        let grant = self
            .graph
            .exchange_code(code)
            .await
            .map_err(|e| remote_failure(OnboardingStep::ExchangeCode, e))?;

        grant
            .access_token
            .filter(|token| !token.expose_secret().is_empty())
            .ok_or_else(|| OnboardingError::RemoteCallFailed {
                step: OnboardingStep::ExchangeCode,
                detail: "missing_access_token".to_string(),
            })
    }
}

/// Write the completion. Returns whether an existing link was updated.
async fn persist<T: SessionTx>(
    tx: &mut T,
    session: ClaimedSession,
    fields: &CompletionFields<'_>,
) -> Result<bool, OnboardingError> {
    if tx.exists_by_phone_number(fields.phone_number_id).await? {
        tx.relink_by_phone_number(fields).await?;
        return Ok(true);
    }

    if tx.complete_pending_by_id(session.id, fields).await? == 0 {
        return Err(OnboardingError::PersistenceConflict {
            record_id: session.id,
        });
    }
    Ok(false)
}

fn remote_failure(step: OnboardingStep, err: impl std::error::Error) -> OnboardingError {
    OnboardingError::RemoteCallFailed {
        step,
        detail: err.to_string(),
    }
}
