use axum::{extract::State, response::IntoResponse};

use crate::{
    content::SkillGroup,
    routes::AppState,
    template::{PageContext, Template},
};

#[derive(askama::Template)]
#[template(path = "skills.html")]
pub struct SkillsTemplate<'a> {
    pub page: PageContext,
    pub skills: &'a [SkillGroup],
}

pub async fn page(mut template: Template, State(state): State<AppState>) -> impl IntoResponse {
    let page = template.page("skills");

    template.render(SkillsTemplate {
        page,
        skills: &state.content.skills,
    })
}
