//! Catalog plugin loading trainer records into the world.
use bevy::prelude::*;

use super::store::{ActiveCatalog, InMemoryCatalog};

pub struct CatalogPlugin;

impl Plugin for CatalogPlugin {
    fn build(&self, app: &mut App) {
        let catalog = InMemoryCatalog::load_or_fallback();
        info!("CatalogPlugin loaded {} records", catalog.len());
        app.insert_resource(ActiveCatalog::new(Box::new(catalog)));
    }
}
