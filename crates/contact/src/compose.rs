use askama::Template;
use lettre::{
    Address, Message,
    message::{Mailbox, header::ContentType},
};

use crate::{ContactSubmission, DeliveryError};

pub const ACKNOWLEDGEMENT_SUBJECT: &str = "Thank you for contacting me!";

#[derive(Template)]
#[template(path = "owner-notification.txt")]
struct OwnerNotificationTemplate<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "acknowledgement.txt")]
struct AcknowledgementTemplate<'a> {
    name: &'a str,
    signature: &'a str,
}

/// The two messages of a contact submission.
///
/// `owner` receives the notification (sent from and to the owner mailbox,
/// replying goes to the submitter); `submitter` receives the acknowledgment.
#[derive(Debug, Clone)]
pub struct ContactMessages {
    pub owner: Message,
    pub submitter: Message,
}

impl ContactMessages {
    pub fn compose(
        owner: &str,
        signature: &str,
        submission: &ContactSubmission,
    ) -> Result<Self, DeliveryError> {
        let owner_mailbox = Mailbox::new(None, owner.parse::<Address>()?);
        let submitter_mailbox = Mailbox::new(
            Some(submission.name.to_owned()),
            submission.email.trim().parse::<Address>()?,
        );

        let notification = OwnerNotificationTemplate {
            name: &submission.name,
            email: &submission.email,
            phone: submission.phone.as_deref().unwrap_or("-"),
            message: &submission.message,
        }
        .render()?;

        let acknowledgement = AcknowledgementTemplate {
            name: &submission.name,
            signature,
        }
        .render()?;

        let owner_message = Message::builder()
            .from(owner_mailbox.clone())
            .to(owner_mailbox.clone())
            .reply_to(submitter_mailbox.clone())
            .subject(format!("New Contact: {}", submission.subject))
            .header(ContentType::TEXT_PLAIN)
            .body(notification)?;

        let submitter_message = Message::builder()
            .from(owner_mailbox)
            .to(submitter_mailbox)
            .subject(ACKNOWLEDGEMENT_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(acknowledgement)?;

        Ok(Self {
            owner: owner_message,
            submitter: submitter_message,
        })
    }

    /// Sending order: notification first, then acknowledgment
    pub fn into_vec(self) -> Vec<Message> {
        vec![self.owner, self.submitter]
    }
}
