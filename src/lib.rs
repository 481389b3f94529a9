//! Libris application library
//!
//! Catalog modules, the record collections they share and the HTML views
//! they render.

pub mod bootstrap;
pub mod catalog;
pub mod modules;
pub mod seed;
pub mod state;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::Catalog;
pub use state::AppState;
pub use views::Views;
