use axum::{
    extract::{Form, State},
    response::IntoResponse,
};
use chrono::Local;
use portfolio_contact::{ContactSubmission, DeliveryOutcome, SUBMITTED_AT_FORMAT};
use serde::Deserialize;

use crate::{
    routes::AppState,
    session::{ContactEntry, FlashLevel},
    template::{PageContext, Template},
};

#[derive(askama::Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub page: PageContext,
}

pub async fn page(mut template: Template) -> impl IntoResponse {
    let page = template.page("contact");

    template.render(ContactTemplate { page })
}

#[derive(Deserialize)]
pub struct ActionInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl From<ActionInput> for ContactSubmission {
    fn from(input: ActionInput) -> Self {
        Self {
            name: input.name,
            email: input.email,
            phone: input.phone.filter(|phone| !phone.trim().is_empty()),
            subject: input.subject,
            message: input.message,
        }
    }
}

pub async fn action(
    mut template: Template,
    State(state): State<AppState>,
    Form(input): Form<ActionInput>,
) -> impl IntoResponse {
    let submission = ContactSubmission::from(input);
    let entry = ContactEntry {
        name: submission.name.to_owned(),
        subject: submission.subject.to_owned(),
        submitted_at: Local::now().format(SUBMITTED_AT_FORMAT).to_string(),
    };

    let (level, message) = match state.contact.submit(submission).await {
        DeliveryOutcome::Delivered => (
            FlashLevel::Success,
            "Message sent successfully! Check your email.",
        ),
        DeliveryOutcome::DeliveredWithFallback => (
            FlashLevel::Warning,
            "Error sending email. Your message was saved and will be delivered later.",
        ),
        DeliveryOutcome::FailedAndNotPersisted => (
            FlashLevel::Danger,
            "Error sending email. Please try again later.",
        ),
        DeliveryOutcome::Invalid(_) => {
            template.flash(FlashLevel::Danger, "Please fill in all required fields!");

            return template.redirect("/contact");
        }
    };

    template.session_mut().record_contact(entry);
    template.flash(level, message);

    template.redirect("/contact")
}
