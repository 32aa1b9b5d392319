use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
};
use chrono::Local;
use portfolio_contact::SUBMITTED_AT_FORMAT;

use crate::{
    routes::AppState,
    session::{FlashLevel, UploadedFile},
    template::{PageContext, Template},
    upload::{UploadError, UploadForm, allowed_types},
};

#[derive(askama::Template)]
#[template(path = "resume.html")]
pub struct ResumeTemplate {
    pub page: PageContext,
    pub uploaded_files: Vec<UploadedFile>,
    pub allowed_types: String,
}

pub async fn page(mut template: Template) -> impl IntoResponse {
    let uploaded_files = template.session().data().uploaded_files.clone();
    let page = template.page("resume");

    template.render(ResumeTemplate {
        page,
        uploaded_files,
        allowed_types: allowed_types(),
    })
}

pub async fn action(
    mut template: Template,
    State(state): State<AppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    let form = match UploadForm::read(multipart).await {
        Ok(form) => form,
        Err(err) => {
            tracing::warn!(err = %err, "Failed to read resume upload");
            template.flash(FlashLevel::Danger, "No file selected!");

            return template.redirect("/resume");
        }
    };

    let Some(file) = form.file("resume_file") else {
        template.flash(FlashLevel::Danger, "No file selected!");

        return template.redirect("/resume");
    };

    let now = Local::now();

    match state.uploads.save(&file.file_name, &file.data, &now).await {
        Ok(filename) => {
            template.session_mut().record_upload(UploadedFile {
                filename,
                original_name: file.file_name.to_owned(),
                upload_time: now.format(SUBMITTED_AT_FORMAT).to_string(),
            });
            template.flash(FlashLevel::Success, "Resume uploaded successfully!");
        }
        Err(UploadError::NotAllowed(_)) => {
            template.flash(
                FlashLevel::Danger,
                format!("Invalid file type! Allowed types: {}", allowed_types()),
            );
        }
        Err(err) => {
            tracing::error!(err = %err, "Failed to store resume");
            template.flash(FlashLevel::Danger, "Error uploading file. Please try again.");
        }
    }

    template.redirect("/resume")
}

pub async fn download(
    mut template: Template,
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> impl IntoResponse {
    let data = match state.uploads.read(&filename).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            template.flash(FlashLevel::Danger, "File not found!");

            return template.redirect("/resume");
        }
        Err(err) => {
            tracing::error!(err = %err, filename = %filename, "Failed to read upload");
            template.flash(FlashLevel::Danger, "Error downloading file.");

            return template.redirect("/resume");
        }
    };

    let mime = mime_guess::from_path(&filename).first_or_octet_stream();

    (
        [
            (header::CONTENT_TYPE, mime.as_ref().to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        data,
    )
        .into_response()
}
