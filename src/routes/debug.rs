use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{routes::AppState, template::Template};

#[derive(Deserialize)]
pub struct DebugQuery {
    pub key: Option<String>,
}

/// GET /debug-smtp?key=... - relay login check, guarded by a shared key
pub async fn smtp(
    template: Template,
    State(state): State<AppState>,
    Query(query): Query<DebugQuery>,
) -> Response {
    let authorized = match (state.config.debug.smtp_key(), query.key.as_deref()) {
        (Some(expected), Some(given)) => expected == given,
        _ => false,
    };

    if !authorized {
        return template.forbidden();
    }

    let Some(credentials) = state.config.email.credentials() else {
        let msg = "Missing EMAIL_ADDRESS or EMAIL_PASSWORD environment variables.";
        tracing::error!("{msg}");

        return (StatusCode::BAD_REQUEST, msg).into_response();
    };

    match state.relay.verify(&credentials).await {
        Ok(()) => (StatusCode::OK, "SMTP connection and login successful.").into_response(),
        Err(err) => {
            tracing::error!(err = %err, "Debug SMTP failed");

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Debug SMTP failed: {err}"),
            )
                .into_response()
        }
    }
}
