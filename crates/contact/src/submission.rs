use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const SUBMITTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Validate)]
pub struct ContactSubmission {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub message: String,
}

/// A submission that could not be delivered, as written to the pending store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub submitted_at: String,
}

impl PendingContact {
    pub fn new<Tz>(submission: ContactSubmission, at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            name: submission.name,
            email: submission.email,
            phone: submission.phone,
            subject: submission.subject,
            message: submission.message,
            submitted_at: at.format(SUBMITTED_AT_FORMAT).to_string(),
        }
    }
}
