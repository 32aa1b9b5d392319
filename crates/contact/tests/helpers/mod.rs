#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use portfolio_contact::{ContactPipeline, ContactSubmission, PendingContactStore};
use portfolio_notification::{Credentials, EmailConfig, Message, Relay, RelayError};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Accept,
    RejectAuth,
}

/// Relay double that records every session instead of talking SMTP
#[derive(Clone)]
pub struct FakeRelay {
    behavior: Behavior,
    sessions: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl FakeRelay {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            sessions: Arc::default(),
        }
    }

    pub fn sessions(&self) -> Vec<Vec<Message>> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Relay for FakeRelay {
    async fn deliver(
        &self,
        _credentials: &Credentials,
        messages: &[Message],
    ) -> Result<(), RelayError> {
        self.sessions.lock().unwrap().push(messages.to_vec());

        match self.behavior {
            Behavior::Accept => Ok(()),
            Behavior::RejectAuth => Err(RelayError::Protocol(
                "535 5.7.8 Username and Password not accepted".to_owned(),
            )),
        }
    }

    async fn verify(&self, _credentials: &Credentials) -> Result<(), RelayError> {
        match self.behavior {
            Behavior::Accept => Ok(()),
            Behavior::RejectAuth => Err(RelayError::Protocol("535".to_owned())),
        }
    }
}

pub fn email_config() -> EmailConfig {
    EmailConfig {
        address: "owner@portfolio.localhost".to_owned(),
        password: "app-password".to_owned(),
        ..Default::default()
    }
}

pub fn pipeline(relay: &FakeRelay, store_path: PathBuf, email: EmailConfig) -> ContactPipeline {
    ContactPipeline::new(
        Arc::new(relay.clone()),
        Arc::new(PendingContactStore::new(store_path)),
        email,
        "Portfolio Owner",
    )
}

pub fn submission(name: impl Into<String>) -> ContactSubmission {
    let name = name.into();

    ContactSubmission {
        email: format!("{}@portfolio.localhost", name.to_lowercase()),
        name,
        phone: Some("555-0100".to_owned()),
        subject: "Website".to_owned(),
        message: "I would like a quote.".to_owned(),
    }
}
