use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    content::{Project, SkillGroup},
    routes::AppState,
    session::FlashLevel,
    template::{PageContext, Template},
};

#[derive(askama::Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub page: PageContext,
    pub projects: &'a [Project],
    pub skills: &'a [SkillGroup],
    pub visits: u64,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub message: Option<String>,
}

pub async fn page(
    mut template: Template,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    let visits = template.session_mut().visit();

    if let Some(message) = query.message.filter(|m| !m.trim().is_empty()) {
        template.flash(FlashLevel::Info, message);
    }

    let page = template.page("home");

    template.render(IndexTemplate {
        page,
        projects: state.content.featured(),
        skills: &state.content.skills,
        visits,
    })
}
