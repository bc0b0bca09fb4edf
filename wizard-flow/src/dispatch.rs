use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{info, warn};

use crate::error::{DeliveryError, FlowError};
use crate::model::ApplicationState;
use crate::storage::SessionStorage;
use crate::validate;

/// Delivery collaborator. Receives the serialized application exactly once
/// per accepted submit; implementations decide what "sending" means.
#[async_trait]
pub trait Deliverer: Send + Sync {
    async fn send(&self, application: &ApplicationState) -> Result<(), DeliveryError>;
}

/// POSTs the application as one JSON payload to a fixed endpoint.
///
/// A 2xx answer counts as delivered; anything else is surfaced with the
/// endpoint's `error` body field when present.
#[cfg(feature = "http")]
pub struct HttpDeliverer {
    client: reqwest::Client,
    endpoint: String,
}

#[cfg(feature = "http")]
impl HttpDeliverer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Deliverer for HttpDeliverer {
    async fn send(&self, application: &ApplicationState) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(application)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string()),
            Err(_) => status.to_string(),
        };
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Orchestrates a submit end to end: pre-flight checks, exactly one delivery
/// call, then the terminal state change.
///
/// A concurrent in-flight set allows one submission per session at a time,
/// and the session's generation counter (bumped on reset) decides whether a
/// late delivery response may still be applied. Delivery is single-attempt:
/// no retry, no backoff, no idempotency key.
pub struct SubmissionDispatcher {
    storage: Arc<dyn SessionStorage>,
    deliverer: Arc<dyn Deliverer>,
    in_flight: DashMap<String, u64>,
}

impl SubmissionDispatcher {
    pub fn new(storage: Arc<dyn SessionStorage>, deliverer: Arc<dyn Deliverer>) -> Self {
        Self {
            storage,
            deliverer,
            in_flight: DashMap::new(),
        }
    }

    /// Whether a submission for this session is awaiting its delivery
    /// response. Navigation and edits are refused meanwhile; reset is not.
    pub fn is_in_flight(&self, session_id: &str) -> bool {
        self.in_flight.contains_key(session_id)
    }

    /// Runs one submit attempt.
    ///
    /// Rejects without any network call when the session is unknown, already
    /// submitted, already in flight, or fails the submit gate. On success the
    /// session is re-loaded and marked submitted only if its generation still
    /// matches the one captured here; a reset that happened while the request
    /// was on the wire wins and the response is discarded.
    pub async fn submit(&self, session_id: &str, today: NaiveDate) -> Result<(), FlowError> {
        let session = self
            .storage
            .get(session_id)
            .await?
            .ok_or_else(|| FlowError::SessionNotFound(session_id.to_string()))?;

        if session.wizard.is_submitted() {
            return Err(FlowError::AlreadySubmitted);
        }
        if self.is_in_flight(session_id) {
            return Err(FlowError::SubmitInFlight);
        }

        let report = validate::application_report(session.wizard.state(), today);
        if !report.is_empty() {
            return Err(FlowError::Invalid(report));
        }

        let generation = session.wizard.generation();

        // Claim the single-flight slot; a concurrent submit between the check
        // above and this point loses here.
        match self.in_flight.entry(session_id.to_string()) {
            Entry::Occupied(_) => return Err(FlowError::SubmitInFlight),
            Entry::Vacant(slot) => {
                slot.insert(generation);
            }
        }

        let outcome = self
            .deliver_and_finish(&session.id, session.wizard.state(), generation)
            .await;
        self.in_flight.remove(session_id);
        outcome
    }

    async fn deliver_and_finish(
        &self,
        session_id: &str,
        application: &ApplicationState,
        generation: u64,
    ) -> Result<(), FlowError> {
        self.deliverer.send(application).await?;

        // The response arrived; apply it only if the session was not reset
        // while the request was on the wire.
        let mut session = self
            .storage
            .get(session_id)
            .await?
            .ok_or_else(|| FlowError::SessionNotFound(session_id.to_string()))?;

        if session.wizard.generation() != generation {
            warn!(session_id, "discarding stale submission response");
            return Err(FlowError::Superseded);
        }

        session.wizard.mark_submitted();
        self.storage.save(session).await?;
        info!(session_id, "application submitted");
        Ok(())
    }
}
