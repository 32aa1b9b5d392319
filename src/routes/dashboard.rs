use axum::response::IntoResponse;

use crate::{
    session::{ContactEntry, FeedbackEntry, FlashLevel, UploadedFile},
    template::{PageContext, Template},
};

#[derive(askama::Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub user: String,
    pub visits: u64,
    pub contacts: Vec<ContactEntry>,
    pub uploaded_files: Vec<UploadedFile>,
    pub feedbacks: Vec<FeedbackEntry>,
}

pub async fn page(mut template: Template) -> impl IntoResponse {
    let Some(user) = template.session().user().map(str::to_owned) else {
        template.flash(FlashLevel::Warning, "Please login first!");

        return template.redirect("/login");
    };

    let data = template.session().data().clone();
    let page = template.page("dashboard");

    template.render(DashboardTemplate {
        page,
        user,
        visits: data.visits,
        contacts: data.contacts,
        uploaded_files: data.uploaded_files,
        feedbacks: data.feedbacks,
    })
}
