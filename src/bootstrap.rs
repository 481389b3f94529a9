//! Process startup shared by the `libris-app` and `libris serve` binaries.

use anyhow::Context;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::catalog::Catalog;
use crate::modules;
use crate::state::AppState;
use crate::views::Views;

/// Open the catalog at the configured data directory, or in memory when none
/// is set.
pub async fn open_catalog(settings: &Settings) -> anyhow::Result<Catalog> {
    let data_dir = settings.database.data_dir.as_deref();
    match data_dir {
        Some(dir) => tracing::info!(data_dir = %dir.display(), "opening catalog"),
        None => tracing::warn!("no data_dir configured; catalog will not be persisted"),
    }
    Catalog::open(data_dir)
        .await
        .context("failed to open catalog")
}

/// Run the HTTP server until Ctrl-C, driving the module lifecycle around it.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let catalog = open_catalog(&settings).await?;
    let views = Views::load()?;
    let state = AppState::new(catalog, views);

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &state);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = libris_http::start_server(&registry, &settings).await;

    registry.stop_modules().await?;
    served
}
