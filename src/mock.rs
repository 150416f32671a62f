use async_trait::async_trait;
use maplit::hashmap;
use std::collections::HashMap;

use crate::catalog::{CatalogError, CatalogProvider, CatalogSession};

/// Canned catalog for offline runs and tests. Serves the same fixture in
/// every region.
#[derive(Clone, Default)]
pub struct StaticCatalog {
    keyspaces: Vec<String>,
    tables: HashMap<String, Vec<String>>,
}

impl StaticCatalog {
    pub fn new(keyspaces: Vec<String>, tables: HashMap<String, Vec<String>>) -> Self {
        Self { keyspaces, tables }
    }

    pub fn sample() -> Self {
        Self::new(
            vec!["app_events".to_string(), "user_profiles".to_string()],
            hashmap! {
                "app_events".to_string() => vec!["clicks".to_string(), "sessions".to_string()],
                "user_profiles".to_string() => vec!["profiles".to_string()],
            },
        )
    }
}

#[async_trait]
impl CatalogSession for StaticCatalog {
    async fn keyspaces(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.keyspaces.clone())
    }

    async fn tables(&self, keyspace: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self.tables.get(keyspace).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn open(&self, _region: &str) -> Result<Box<dyn CatalogSession>, CatalogError> {
        Ok(Box::new(self.clone()))
    }
}
