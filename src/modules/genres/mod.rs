pub mod models;
pub mod routes;

use async_trait::async_trait;
use axum::{routing::get, Router};
use libris_db::Filter;
use libris_kernel::{InitCtx, Module};

use crate::state::AppState;

/// Genre pages under `/catalog/genres`
pub struct GenresModule {
    state: AppState,
}

impl GenresModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for GenresModule {
    fn name(&self) -> &'static str {
        "genres"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let genres = self.state.catalog.genres.count(Filter::All).await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            genres,
            "genres module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/genres", get(routes::genre_list))
            .route(
                "/genres/create",
                get(routes::genre_create_get).post(routes::genre_create_post),
            )
            .route("/genres/{id}", get(routes::genre_detail))
            .route(
                "/genres/{id}/delete",
                get(routes::genre_delete_get).post(routes::genre_delete_post),
            )
            .route(
                "/genres/{id}/update",
                get(routes::genre_update_get).post(routes::genre_update_post),
            )
            .with_state(self.state.clone())
    }
}

/// Create a new instance of the genres module
pub fn create_module(state: AppState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(GenresModule::new(state))
}
