#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use portfolio::{
    AppState, Config,
    config::{
        ContactConfig, DebugConfig, LoggingConfig, ServerConfig, SessionConfig, UploadConfig,
    },
};
use portfolio_notification::{Credentials, EmailConfig, Message, Relay, RelayError};
use temp_dir::TempDir;
use tower::ServiceExt;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Accept,
    RejectAuth,
}

#[derive(Clone)]
pub struct FakeRelay {
    behavior: Behavior,
    pub sessions: Arc<Mutex<Vec<usize>>>,
}

impl FakeRelay {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            sessions: Arc::default(),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), RelayError> {
        match self.behavior {
            Behavior::Accept => Ok(()),
            Behavior::RejectAuth => Err(RelayError::Protocol(
                "535 5.7.8 Username and Password not accepted".to_owned(),
            )),
        }
    }
}

#[async_trait]
impl Relay for FakeRelay {
    async fn deliver(
        &self,
        _credentials: &Credentials,
        messages: &[Message],
    ) -> Result<(), RelayError> {
        self.check()?;
        self.sessions.lock().unwrap().push(messages.len());

        Ok(())
    }

    async fn verify(&self, _credentials: &Credentials) -> Result<(), RelayError> {
        self.check()
    }
}

pub struct TestApp {
    pub router: Router,
    pub relay: FakeRelay,
    pub config: Config,
    pub dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 5000,
        },
        session: SessionConfig {
            secret: "test_secret_key_minimum_32_characters_long".to_owned(),
            ttl_days: 1,
        },
        email: EmailConfig {
            address: "owner@portfolio.localhost".to_owned(),
            password: "app-password".to_owned(),
            ..EmailConfig::default()
        },
        contact: ContactConfig {
            pending_file: dir.child("pending_contacts.json"),
            ..ContactConfig::default()
        },
        upload: UploadConfig {
            folder: dir.child("uploads"),
            max_content_length: 1024 * 1024,
        },
        debug: DebugConfig {
            smtp_key: Some("let-me-in".to_owned()),
        },
        logging: LoggingConfig::default(),
    }
}

pub fn create_test_app(behavior: Behavior) -> TestApp {
    let dir = TempDir::new().unwrap();
    create_test_app_with(behavior, dir, |_| {})
}

pub fn create_test_app_with(
    behavior: Behavior,
    dir: TempDir,
    customize: impl FnOnce(&mut Config),
) -> TestApp {
    let mut config = test_config(&dir);
    customize(&mut config);

    let relay = FakeRelay::new(behavior);
    let state = AppState::new(config.clone(), Arc::new(relay.clone()));

    TestApp {
        router: portfolio::router(state),
        relay,
        config,
        dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        form: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let body = serde_urlencoded::to_string(form).unwrap();
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        parts: &[MultipartPart<'_>],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        self.send(builder.body(Body::from(multipart_body(parts))).unwrap())
            .await
    }
}

const BOUNDARY: &str = "portfolio-test-boundary";

pub enum MultipartPart<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[MultipartPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            MultipartPart::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            MultipartPart::File(name, filename, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// `name=value` pair of the session cookie set by a response
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("session="))
        .and_then(|value| value.split(';').next())
        .map(str::to_owned)
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

pub async fn body_string(response: Response<Body>) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Follows a redirect with the session it carried and returns the landing page body
pub async fn follow(app: &TestApp, response: Response<Body>) -> (String, Option<String>) {
    let cookie = session_cookie(&response);
    let target = location(&response).expect("redirect location");

    let landing = app.get(&target, cookie.as_deref()).await;
    let next_cookie = session_cookie(&landing).or(cookie);

    (body_string(landing).await, next_cookie)
}
