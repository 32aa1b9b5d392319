use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::convert::Infallible;

use crate::session::{FlashLevel, FlashMessage, Session};

pub const SERVER_ERROR_MESSAGE: &str = "Something went wrong, please retry later";

/// Values every page layout needs
#[derive(Debug, Default, Clone)]
pub struct PageContext {
    pub current_path: &'static str,
    pub current_user: Option<String>,
    pub flashes: Vec<FlashMessage>,
}

impl PageContext {
    pub fn is_active(&self, path: &str) -> bool {
        self.current_path == path
    }
}

/// Renders pages and carries the visitor session through to the response.
pub struct Template {
    session: Session,
}

impl Template {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.session.flash(level, message);
    }

    /// Builds the layout context, consuming pending flash messages
    pub fn page(&mut self, current_path: &'static str) -> PageContext {
        PageContext {
            current_path,
            current_user: self.session.user().map(str::to_owned),
            flashes: self.session.take_flashes(),
        }
    }

    pub fn render<T: askama::Template>(self, template: T) -> Response {
        self.render_with_status(StatusCode::OK, template)
    }

    pub fn render_with_status<T: askama::Template>(
        self,
        status: StatusCode,
        template: T,
    ) -> Response {
        match template.render() {
            Ok(html) => (status, self.session, Html(html)).into_response(),
            Err(err) => {
                tracing::error!(err = %err, "Failed to render template");

                server_error()
            }
        }
    }

    pub fn redirect(self, to: &str) -> Response {
        (self.session, Redirect::to(to)).into_response()
    }

    pub fn not_found(mut self) -> Response {
        let page = self.page("");
        self.render_with_status(StatusCode::NOT_FOUND, NotFoundTemplate { page })
    }

    pub fn forbidden(mut self) -> Response {
        let page = self.page("");
        self.render_with_status(StatusCode::FORBIDDEN, ForbiddenTemplate { page })
    }
}

/// Error page that does not depend on the session
pub fn server_error() -> Response {
    match askama::Template::render(&ServerTemplate {
        page: PageContext::default(),
    }) {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(err) => {
            tracing::error!(err = %err, "Failed to render error page");

            (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE).into_response()
        }
    }
}

impl FromRequestParts<crate::routes::AppState> for Template {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &crate::routes::AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;

        Ok(Template { session })
    }
}

#[derive(askama::Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub page: PageContext,
}

#[derive(askama::Template)]
#[template(path = "403.html")]
pub struct ForbiddenTemplate {
    pub page: PageContext,
}

#[derive(askama::Template)]
#[template(path = "500.html")]
pub struct ServerTemplate {
    pub page: PageContext,
}
