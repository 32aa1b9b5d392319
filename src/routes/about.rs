use axum::response::IntoResponse;

use crate::template::{PageContext, Template};

#[derive(askama::Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub page: PageContext,
    pub greeting_name: String,
}

pub async fn page(mut template: Template) -> impl IntoResponse {
    let page = template.page("about");
    let greeting_name = page
        .current_user
        .clone()
        .unwrap_or_else(|| "Guest".to_owned());

    template.render(AboutTemplate {
        page,
        greeting_name,
    })
}
