//! Request helpers shared by handler tests.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, Method},
    response::Response,
    Router,
};
use chrono::NaiveDate;
use libris_db::RecordId;
use libris_kernel::{settings::Settings, ModuleRegistry};
use tower::ServiceExt;

use crate::modules::{self, authors::models::Author, books::models::Book};
use crate::state::AppState;

/// Full application router over an empty in-memory catalog.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::in_memory().expect("templates compile");
        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &state);
        let router = libris_http::build_router(&registry, &Settings::default());
        Self { state, router }
    }

    pub async fn genres(&self) -> Vec<crate::modules::genres::models::Genre> {
        self.state
            .catalog
            .genres
            .find(libris_db::Query::all())
            .await
            .expect("list genres")
    }
}

pub async fn get(router: &Router, uri: &str) -> Response {
    router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(router: &Router, uri: &str, fields: &[(&str, &str)]) -> Response {
    let body = fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn sample_author(app: &TestApp, first_name: &str, family_name: &str) -> Author {
    app.state
        .catalog
        .authors
        .insert(Author {
            id: RecordId::generate(),
            first_name: first_name.to_string(),
            family_name: family_name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1947, 6, 22),
            date_of_death: None,
        })
        .await
        .unwrap()
}

/// A book by a freshly created author, filed under `genres`.
pub async fn sample_book(app: &TestApp, title: &str, genres: &[RecordId]) -> Book {
    let author = sample_author(app, "Octavia", "Butler").await;
    app.state
        .catalog
        .books
        .insert(Book {
            id: RecordId::generate(),
            title: title.to_string(),
            author: author.id,
            summary: "A story worth reading".to_string(),
            isbn: "9780807083697".to_string(),
            genre: genres.to_vec(),
        })
        .await
        .unwrap()
}
