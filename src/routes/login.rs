use axum::{Form, response::IntoResponse};
use serde::Deserialize;

use crate::{
    session::FlashLevel,
    template::{PageContext, Template},
};

#[derive(askama::Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
}

pub async fn page(mut template: Template) -> impl IntoResponse {
    if template.session().user().is_some() {
        return template.redirect("/dashboard");
    }

    let page = template.page("login");

    template.render(LoginTemplate { page })
}

#[derive(Deserialize)]
pub struct ActionInput {
    #[serde(default)]
    pub username: String,
}

pub async fn action(mut template: Template, Form(input): Form<ActionInput>) -> impl IntoResponse {
    let username = input.username.trim();

    if username.is_empty() {
        template.flash(FlashLevel::Danger, "Please enter a username!");

        return template.redirect("/login");
    }

    tracing::info!(user = %username, "User logged in");

    template.session_mut().login(username);
    template.flash(FlashLevel::Success, format!("Welcome, {username}!"));

    template.redirect("/dashboard")
}

pub async fn logout(mut template: Template) -> impl IntoResponse {
    let user = template.session().user().unwrap_or("User").to_owned();

    template.session_mut().clear();
    template.flash(
        FlashLevel::Info,
        format!("Goodbye, {user}! You have been logged out."),
    );

    let message = format!("{user} logged out successfully!");

    template.redirect(&format!("/?message={}", urlencoding::encode(&message)))
}
