use axum::{extract::State, response::IntoResponse};

use crate::{
    content::Service,
    routes::AppState,
    template::{PageContext, Template},
};

#[derive(askama::Template)]
#[template(path = "services.html")]
pub struct ServicesTemplate<'a> {
    pub page: PageContext,
    pub services: &'a [Service],
}

pub async fn page(mut template: Template, State(state): State<AppState>) -> impl IntoResponse {
    let page = template.page("services");

    template.render(ServicesTemplate {
        page,
        services: &state.content.services,
    })
}
