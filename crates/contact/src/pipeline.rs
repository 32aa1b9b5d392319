use std::sync::Arc;

use chrono::Local;
use portfolio_notification::{EmailConfig, Relay, RelayError};
use validator::Validate;

use crate::{ContactMessages, ContactSubmission, PendingContact, PendingContactStore};

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("email credentials are not configured (EMAIL_ADDRESS/EMAIL_PASSWORD)")]
    CredentialsMissing,

    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("failed to render message: {0}")]
    Template(#[from] askama::Error),

    #[error("relay: {0}")]
    Relay(#[from] RelayError),
}

/// What the submitter gets to know about their submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Both messages were accepted by the relay
    Delivered,
    /// Delivery failed, the submission is kept in the pending store
    DeliveredWithFallback,
    /// Delivery failed and the pending store could not be written
    FailedAndNotPersisted,
    /// Required fields missing, nothing was sent or stored
    Invalid(Vec<String>),
}

#[derive(Clone)]
pub struct ContactPipeline {
    relay: Arc<dyn Relay>,
    store: Arc<PendingContactStore>,
    email: EmailConfig,
    signature: String,
}

impl ContactPipeline {
    pub fn new(
        relay: Arc<dyn Relay>,
        store: Arc<PendingContactStore>,
        email: EmailConfig,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            relay,
            store,
            email,
            signature: signature.into(),
        }
    }

    pub fn store(&self) -> &PendingContactStore {
        &self.store
    }

    #[tracing::instrument(skip_all, fields(email = %submission.email))]
    pub async fn submit(&self, submission: ContactSubmission) -> DeliveryOutcome {
        if let Err(errors) = submission.validate() {
            let mut fields = errors
                .field_errors()
                .keys()
                .map(|field| field.to_string())
                .collect::<Vec<_>>();
            fields.sort();

            tracing::info!(?fields, "Contact submission rejected");

            return DeliveryOutcome::Invalid(fields);
        }

        match self.deliver(&submission).await {
            Ok(()) => {
                tracing::info!("Contact submission delivered");

                DeliveryOutcome::Delivered
            }
            Err(err) => {
                tracing::error!(err = %err, "Contact delivery failed");

                self.fallback(submission).await
            }
        }
    }

    async fn deliver(&self, submission: &ContactSubmission) -> Result<(), DeliveryError> {
        let owner = self
            .email
            .owner_address()
            .ok_or(DeliveryError::CredentialsMissing)?;

        let messages = ContactMessages::compose(owner, &self.signature, submission)?;

        let credentials = self
            .email
            .credentials()
            .ok_or(DeliveryError::CredentialsMissing)?;

        self.relay
            .deliver(&credentials, &messages.into_vec())
            .await?;

        Ok(())
    }

    async fn fallback(&self, submission: ContactSubmission) -> DeliveryOutcome {
        let at = Local::now();
        let contact = PendingContact::new(submission, &at);

        match self.store.append(&contact, &at).await {
            Ok(key) => {
                tracing::warn!(
                    key = %key,
                    path = %self.store.path().display(),
                    "Contact submission saved for later delivery"
                );

                DeliveryOutcome::DeliveredWithFallback
            }
            Err(err) => {
                tracing::error!(
                    err = %err,
                    path = %self.store.path().display(),
                    "Failed to persist pending contact"
                );

                DeliveryOutcome::FailedAndNotPersisted
            }
        }
    }
}
