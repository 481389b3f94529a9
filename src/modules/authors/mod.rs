pub mod models;
pub mod routes;

use async_trait::async_trait;
use axum::{routing::get, Router};
use libris_db::Filter;
use libris_kernel::{InitCtx, Module};

use crate::state::AppState;

/// Author pages under `/catalog/authors`
pub struct AuthorsModule {
    state: AppState,
}

impl AuthorsModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let authors = self.state.catalog.authors.count(Filter::All).await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            authors,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/authors", get(routes::author_list))
            .route(
                "/authors/create",
                get(routes::author_create_get).post(routes::author_create_post),
            )
            .route("/authors/{id}", get(routes::author_detail))
            .route(
                "/authors/{id}/delete",
                get(routes::author_delete_get).post(routes::author_delete_post),
            )
            .route(
                "/authors/{id}/update",
                get(routes::author_update_get).post(routes::author_update_post),
            )
            .with_state(self.state.clone())
    }
}

/// Create a new instance of the authors module
pub fn create_module(state: AppState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthorsModule::new(state))
}
