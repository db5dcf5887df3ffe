//! Catalog module exposing trainer records and their lookup store.
pub mod plugin;
pub mod records;
pub mod store;

pub use plugin::CatalogPlugin;
