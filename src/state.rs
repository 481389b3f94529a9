use std::sync::Arc;

use crate::catalog::Catalog;
use crate::views::Views;

/// Router state shared by every catalog module
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub views: Arc<Views>,
}

impl AppState {
    pub fn new(catalog: Catalog, views: Views) -> Self {
        Self {
            catalog,
            views: Arc::new(views),
        }
    }

    /// Fresh in-memory catalog with the bundled templates
    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(Catalog::in_memory(), Views::load()?))
    }
}
