use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, response::IntoResponse, routing::get};
use portfolio_contact::{ContactPipeline, PendingContactStore};
use portfolio_notification::Relay;

use crate::{content::Content, template::Template, upload::UploadStore};

mod about;
mod contact;
mod dashboard;
mod debug;
mod feedback;
mod health;
mod index;
mod login;
mod portfolio;
mod resume;
mod services;
mod skills;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub content: Arc<Content>,
    pub contact: ContactPipeline,
    pub relay: Arc<dyn Relay>,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(config: crate::config::Config, relay: Arc<dyn Relay>) -> Self {
        let store = Arc::new(PendingContactStore::new(&config.contact.pending_file));
        let contact = ContactPipeline::new(
            relay.clone(),
            store,
            config.email.clone(),
            config.contact.signature.to_owned(),
        );
        let uploads = UploadStore::new(&config.upload.folder);

        Self {
            config,
            content: Arc::new(Content::builtin()),
            contact,
            relay,
            uploads,
        }
    }
}

pub async fn fallback(template: Template) -> impl IntoResponse {
    template.not_found()
}

pub fn router(app_state: AppState) -> Router {
    let body_limit = app_state.config.upload.max_content_length;

    Router::new()
        .route("/health", get(health::health))
        .route("/", get(index::page))
        .route("/about", get(about::page))
        .route("/portfolio", get(portfolio::page))
        .route("/project/{id}", get(portfolio::detail))
        .route("/skills", get(skills::page))
        .route("/services", get(services::page))
        .route("/contact", get(contact::page).post(contact::action))
        .route("/login", get(login::page).post(login::action))
        .route("/logout", get(login::logout))
        .route("/dashboard", get(dashboard::page))
        .route("/resume", get(resume::page).post(resume::action))
        .route("/download/{filename}", get(resume::download))
        .route("/feedback", get(feedback::page).post(feedback::action))
        .route("/debug-smtp", get(debug::smtp))
        .fallback(fallback)
        .nest_service("/static", crate::assets::AssetsService::new())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(app_state)
}
