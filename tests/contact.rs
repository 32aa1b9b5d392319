use axum::http::StatusCode;
use serde_json::Value;

mod common;

use common::{Behavior, create_test_app, create_test_app_with, follow, location};

const FORM: [(&str, &str); 5] = [
    ("name", "Ada"),
    ("email", "ada@portfolio.localhost"),
    ("phone", ""),
    ("subject", "Collaboration"),
    ("message", "Let's build something."),
];

#[tokio::test]
async fn test_contact_delivered() {
    let app = create_test_app(Behavior::Accept);

    let response = app.post_form("/contact", &FORM, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/contact"));

    let (body, _) = follow(&app, response).await;
    assert!(body.contains("alert-success"));
    assert!(body.contains("Message sent successfully! Check your email."));

    assert_eq!(*app.relay.sessions.lock().unwrap(), vec![2]);
    assert!(!app.config.contact.pending_file.exists());
}

#[tokio::test]
async fn test_contact_relay_failure_is_saved() -> anyhow::Result<()> {
    let app = create_test_app(Behavior::RejectAuth);

    let response = app.post_form("/contact", &FORM, None).await;
    let (body, _) = follow(&app, response).await;

    assert!(body.contains("alert-warning"));
    assert!(
        body.contains("Error sending email. Your message was saved and will be delivered later.")
    );

    let document: Value =
        serde_json::from_str(&std::fs::read_to_string(&app.config.contact.pending_file)?)?;
    let entries = document.as_object().unwrap();
    assert_eq!(entries.len(), 1);

    let (key, entry) = entries.iter().next().unwrap();
    assert!(key.starts_with("ada@portfolio.localhost_"));
    assert_eq!(entry["subject"], "Collaboration");
    assert_eq!(entry["phone"], Value::Null);

    Ok(())
}

#[tokio::test]
async fn test_contact_failure_without_store() -> anyhow::Result<()> {
    let dir = temp_dir::TempDir::new()?;
    std::fs::write(dir.child("blocker"), "not a directory")?;
    let pending_file = dir.child("blocker").join("pending_contacts.json");

    let app = create_test_app_with(Behavior::RejectAuth, dir, |config| {
        config.contact.pending_file = pending_file;
    });

    let response = app.post_form("/contact", &FORM, None).await;
    let (body, _) = follow(&app, response).await;

    assert!(body.contains("alert-danger"));
    assert!(body.contains("Error sending email. Please try again later."));

    Ok(())
}

#[tokio::test]
async fn test_contact_missing_fields() {
    let app = create_test_app(Behavior::Accept);

    let response = app
        .post_form("/contact", &[("name", "Ada"), ("email", "")], None)
        .await;
    let (body, _) = follow(&app, response).await;

    assert!(body.contains("Please fill in all required fields!"));
    assert_eq!(app.relay.session_count(), 0);
    assert!(!app.config.contact.pending_file.exists());
}

#[tokio::test]
async fn test_contact_without_credentials_is_saved() {
    let dir = temp_dir::TempDir::new().unwrap();
    let app = create_test_app_with(Behavior::Accept, dir, |config| {
        config.email.password = "   ".to_owned();
    });

    let response = app.post_form("/contact", &FORM, None).await;
    let (body, _) = follow(&app, response).await;

    assert!(body.contains("Your message was saved"));
    assert_eq!(app.relay.session_count(), 0);
    assert!(app.config.contact.pending_file.exists());
}

#[tokio::test]
async fn test_contact_is_listed_on_dashboard() {
    let app = create_test_app(Behavior::Accept);

    let login = app.post_form("/login", &[("username", "ada")], None).await;
    let cookie = common::session_cookie(&login).unwrap();

    let response = app.post_form("/contact", &FORM, Some(&cookie)).await;
    let cookie = common::session_cookie(&response).unwrap();

    let dashboard = app.get("/dashboard", Some(&cookie)).await;
    let body = common::body_string(dashboard).await;
    assert!(body.contains("Collaboration (Ada)"));
}
