//! Catalog landing page with record counts.

use async_trait::async_trait;
use axum::{extract::State, response::Html, routing::get, Router};
use libris_db::Filter;
use libris_http::error::AppError;
use libris_kernel::Module;
use minijinja::context;

use crate::modules::bookinstances::models::LoanStatus;
use crate::state::AppState;

/// Serves `/catalog` itself
pub struct HomeModule {
    state: AppState,
}

impl HomeModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for HomeModule {
    fn name(&self) -> &'static str {
        "home"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(index))
            .with_state(self.state.clone())
    }
}

/// Display site home page.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let catalog = &state.catalog;
    let (books, copies, available, authors, genres) = tokio::try_join!(
        catalog.books.count(Filter::All),
        catalog.instances.count(Filter::All),
        catalog
            .instances
            .count(Filter::eq("status", LoanStatus::Available.as_str())),
        catalog.authors.count(Filter::All),
        catalog.genres.count(Filter::All),
    )?;

    state.views.render(
        "index",
        context! {
            title => "Local Library Home",
            book_count => books,
            book_instance_count => copies,
            book_instance_available_count => available,
            author_count => authors,
            genre_count => genres,
        },
    )
}

/// Create a new instance of the home module
pub fn create_module(state: AppState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(HomeModule::new(state))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use libris_db::RecordId;

    use crate::modules::bookinstances::models::BookInstance;
    use crate::testing::{body_text, get, location, sample_book, TestApp};

    #[tokio::test]
    async fn counts_every_collection() {
        let app = TestApp::new();
        let book = sample_book(&app, "Kindred", &[]).await;
        for status in ["Available", "Loaned", "Available"] {
            app.state
                .catalog
                .instances
                .insert(BookInstance {
                    id: RecordId::generate(),
                    book: book.id.clone(),
                    imprint: "Doubleday, 1979".to_string(),
                    status: status.to_string(),
                    due_back: None,
                })
                .await
                .unwrap();
        }

        let response = get(&app.router, "/catalog").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("<strong>Books:</strong> 1"));
        assert!(body.contains("<strong>Copies:</strong> 3"));
        assert!(body.contains("<strong>Copies available:</strong> 2"));
        assert!(body.contains("<strong>Authors:</strong> 1"));
        assert!(body.contains("<strong>Genres:</strong> 0"));
    }

    #[tokio::test]
    async fn root_redirects_to_catalog() {
        let app = TestApp::new();
        let response = get(&app.router, "/").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/catalog");
    }

    #[tokio::test]
    async fn unknown_catalog_path_is_not_found() {
        let app = TestApp::new();
        let response = get(&app.router, "/catalog/shelves").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
