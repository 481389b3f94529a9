pub mod models;
pub mod routes;

use async_trait::async_trait;
use axum::{routing::get, Router};
use libris_db::Filter;
use libris_kernel::{InitCtx, Module};

use crate::state::AppState;

/// Book copy pages under `/catalog/bookinstances`
pub struct BookInstancesModule {
    state: AppState,
}

impl BookInstancesModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BookInstancesModule {
    fn name(&self) -> &'static str {
        "bookinstances"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let copies = self.state.catalog.instances.count(Filter::All).await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            copies,
            "bookinstances module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/bookinstances", get(routes::bookinstance_list))
            .route(
                "/bookinstances/create",
                get(routes::bookinstance_create_get).post(routes::bookinstance_create_post),
            )
            .route("/bookinstances/{id}", get(routes::bookinstance_detail))
            .route(
                "/bookinstances/{id}/delete",
                get(routes::bookinstance_delete_get).post(routes::bookinstance_delete_post),
            )
            .route(
                "/bookinstances/{id}/update",
                get(routes::bookinstance_update_get).post(routes::bookinstance_update_post),
            )
            .with_state(self.state.clone())
    }
}

/// Create a new instance of the bookinstances module
pub fn create_module(state: AppState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BookInstancesModule::new(state))
}
