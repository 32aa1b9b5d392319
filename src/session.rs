use std::{
    convert::Infallible,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::config::SessionConfig;

pub const SESSION_COOKIE_NAME: &str = "session";

/// Per-list cap on remembered entries
const HISTORY_LIMIT: usize = 20;

/// Longest free text kept per field, in characters
const TEXT_LIMIT: usize = 200;

/// Largest signed token issued; browsers drop cookies past 4096 bytes
const TOKEN_LIMIT: usize = 3800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEntry {
    pub name: String,
    pub subject: String,
    pub submitted_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub original_name: String,
    pub upload_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub feedback: String,
    pub rating: Option<String>,
    pub timestamp: String,
    pub attachment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub visits: u64,
    #[serde(default)]
    pub contacts: Vec<ContactEntry>,
    #[serde(default)]
    pub uploaded_files: Vec<UploadedFile>,
    #[serde(default)]
    pub feedbacks: Vec<FeedbackEntry>,
    #[serde(default)]
    pub flashes: Vec<FlashMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    exp: u64,
    iat: u64,
    #[serde(flatten)]
    data: SessionData,
}

/// Visitor state carried in a signed, http-only cookie.
///
/// Extracting a `Session` never fails: a missing, tampered or expired cookie
/// yields an empty session. Returning it as part of a response re-issues the
/// cookie with the current state.
#[derive(Debug, Clone)]
pub struct Session {
    data: SessionData,
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            data: SessionData::default(),
            config,
        }
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn user(&self) -> Option<&str> {
        self.data.user.as_deref()
    }

    pub fn login(&mut self, user: impl Into<String>) {
        self.data.user = Some(clip(user.into()));
    }

    pub fn clear(&mut self) {
        self.data = SessionData::default();
    }

    /// Counts one more visit and returns the new total
    pub fn visit(&mut self) -> u64 {
        self.data.visits += 1;
        self.data.visits
    }

    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.data.flashes.push(FlashMessage {
            level,
            message: clip(message.into()),
        });
    }

    pub fn take_flashes(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.data.flashes)
    }

    pub fn record_contact(&mut self, entry: ContactEntry) {
        let entry = ContactEntry {
            name: clip(entry.name),
            subject: clip(entry.subject),
            ..entry
        };

        push_capped(&mut self.data.contacts, entry);
    }

    pub fn record_upload(&mut self, file: UploadedFile) {
        let file = UploadedFile {
            original_name: clip(file.original_name),
            ..file
        };

        push_capped(&mut self.data.uploaded_files, file);
    }

    pub fn record_feedback(&mut self, feedback: FeedbackEntry) {
        let feedback = FeedbackEntry {
            feedback: clip(feedback.feedback),
            ..feedback
        };

        push_capped(&mut self.data.feedbacks, feedback);
    }

    /// Signs the session, dropping the oldest history entries until the
    /// token fits in a cookie
    pub fn encode(&self) -> anyhow::Result<String> {
        let mut data = self.data.clone();

        loop {
            let token = self.sign(&data)?;

            if token.len() <= TOKEN_LIMIT || !shed_oldest(&mut data) {
                return Ok(token);
            }
        }
    }

    fn sign(&self, data: &SessionData) -> anyhow::Result<String> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let claims = Claims {
            exp: now + self.config.ttl_days * 24 * 60 * 60,
            iat: now,
            data: data.clone(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )?;

        Ok(token)
    }

    pub fn decode(token: &str, config: SessionConfig) -> anyhow::Result<Self> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(Self {
            data: token_data.claims.data,
            config,
        })
    }

    fn from_jar(jar: &CookieJar, config: &SessionConfig) -> Self {
        let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
            return Self::new(config.clone());
        };

        match Self::decode(cookie.value(), config.clone()) {
            Ok(session) => session,
            Err(err) => {
                tracing::debug!(err = %err, "Discarding invalid session cookie");
                Self::new(config.clone())
            }
        }
    }
}

fn push_capped<T>(items: &mut Vec<T>, item: T) {
    items.push(item);

    if items.len() > HISTORY_LIMIT {
        let overflow = items.len() - HISTORY_LIMIT;
        items.drain(..overflow);
    }
}

fn clip(mut text: String) -> String {
    if let Some((end, _)) = text.char_indices().nth(TEXT_LIMIT) {
        text.truncate(end);
    }

    text
}

/// Removes one entry from the longest history list, then from pending flashes
fn shed_oldest(data: &mut SessionData) -> bool {
    let contacts = data.contacts.len();
    let uploads = data.uploaded_files.len();
    let feedbacks = data.feedbacks.len();

    if contacts > 0 && contacts >= uploads.max(feedbacks) {
        data.contacts.remove(0);
    } else if uploads > 0 && uploads >= feedbacks {
        data.uploaded_files.remove(0);
    } else if feedbacks > 0 {
        data.feedbacks.remove(0);
    } else if !data.flashes.is_empty() {
        data.flashes.remove(0);
    } else {
        return false;
    }

    true
}

impl FromRequestParts<crate::routes::AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &crate::routes::AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        Ok(Self::from_jar(&jar, &state.config.session))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let token = match self.encode() {
            Ok(token) => token,
            Err(err) => {
                tracing::error!(err = %err, "Failed to encode session cookie");
                return Ok(res);
            }
        };

        let cookie = Cookie::build((SESSION_COOKIE_NAME, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();

        CookieJar::new().add(cookie).into_response_parts(res)
    }
}
