use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
};
use chrono::Local;
use portfolio_contact::SUBMITTED_AT_FORMAT;

use crate::{
    routes::AppState,
    session::{FeedbackEntry, FlashLevel},
    template::{PageContext, Template},
    upload::UploadForm,
};

#[derive(askama::Template)]
#[template(path = "feedback.html")]
pub struct FeedbackTemplate {
    pub page: PageContext,
}

pub async fn page(mut template: Template) -> impl IntoResponse {
    let page = template.page("feedback");

    template.render(FeedbackTemplate { page })
}

pub async fn action(
    mut template: Template,
    State(state): State<AppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    let form = match UploadForm::read(multipart).await {
        Ok(form) => form,
        Err(err) => {
            tracing::warn!(err = %err, "Failed to read feedback form");
            template.flash(FlashLevel::Danger, "Please provide feedback!");

            return template.redirect("/feedback");
        }
    };

    let Some(feedback) = form.field("feedback").map(str::to_owned) else {
        template.flash(FlashLevel::Danger, "Please provide feedback!");

        return template.redirect("/feedback");
    };

    let now = Local::now();

    // A rejected attachment does not block the feedback itself
    let attachment = match form.file("attachment") {
        Some(file) => match state.uploads.save(&file.file_name, &file.data, &now).await {
            Ok(filename) => Some(filename),
            Err(err) => {
                tracing::warn!(err = %err, "Feedback attachment skipped");
                None
            }
        },
        None => None,
    };

    template.session_mut().record_feedback(FeedbackEntry {
        feedback,
        rating: form.field("rating").map(str::to_owned),
        timestamp: now.format(SUBMITTED_AT_FORMAT).to_string(),
        attachment,
    });
    template.flash(FlashLevel::Success, "Thank you for your feedback!");

    template.redirect("/feedback")
}
