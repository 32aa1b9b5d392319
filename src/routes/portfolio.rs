use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    content::{Project, SkillGroup},
    routes::AppState,
    session::FlashLevel,
    template::{PageContext, Template},
};

#[derive(askama::Template)]
#[template(path = "portfolio.html")]
pub struct PortfolioTemplate<'a> {
    pub page: PageContext,
    pub projects: &'a [Project],
    pub skills: &'a [SkillGroup],
}

#[derive(askama::Template)]
#[template(path = "project-detail.html")]
pub struct ProjectDetailTemplate<'a> {
    pub page: PageContext,
    pub project: &'a Project,
}

pub async fn page(mut template: Template, State(state): State<AppState>) -> impl IntoResponse {
    let page = template.page("portfolio");

    template.render(PortfolioTemplate {
        page,
        projects: &state.content.projects,
        skills: &state.content.skills,
    })
}

pub async fn detail(
    mut template: Template,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = id
        .parse::<u32>()
        .ok()
        .and_then(|id| state.content.project(id));

    let Some(project) = project else {
        template.flash(FlashLevel::Danger, "Project not found!");

        return template.redirect("/portfolio");
    };

    let page = template.page("portfolio");

    template.render(ProjectDetailTemplate { page, project })
}
