use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_keyspaces as keyspaces;
use aws_types::region::Region;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog session setup failed: {0}")]
    Setup(String),
    #[error("keyspace listing failed: {0}")]
    ListKeyspaces(String),
    #[error("table listing failed for keyspace {keyspace}: {reason}")]
    ListTables { keyspace: String, reason: String },
}

/// One authenticated, region-scoped view of the service catalog. Owned by a
/// single discover call and released on drop.
#[async_trait]
pub trait CatalogSession: Send + Sync {
    async fn keyspaces(&self) -> Result<Vec<String>, CatalogError>;

    /// Table names owned by the given keyspace, in catalog return order.
    /// The catalog makes no ordering guarantee across calls.
    async fn tables(&self, keyspace: &str) -> Result<Vec<String>, CatalogError>;
}

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn open(&self, region: &str) -> Result<Box<dyn CatalogSession>, CatalogError>;
}

/// Catalog backed by the managed-Cassandra control plane.
pub struct KeyspacesCatalog;

#[async_trait]
impl CatalogProvider for KeyspacesCatalog {
    async fn open(&self, region: &str) -> Result<Box<dyn CatalogSession>, CatalogError> {
        let conf = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        // Credentials are resolved up front: a broken auth chain is a setup
        // failure, not a query failure.
        let creds = conf
            .credentials_provider()
            .ok_or_else(|| CatalogError::Setup("no credentials provider configured".to_string()))?;
        creds
            .provide_credentials()
            .await
            .map_err(|e| CatalogError::Setup(e.to_string()))?;

        Ok(Box::new(KeyspacesSession {
            client: keyspaces::Client::new(&conf),
        }))
    }
}

struct KeyspacesSession {
    client: keyspaces::Client,
}

#[async_trait]
impl CatalogSession for KeyspacesSession {
    async fn keyspaces(&self) -> Result<Vec<String>, CatalogError> {
        let mut out = Vec::new();
        let mut pages = self.client.list_keyspaces().into_paginator().send();
        while let Some(page) = pages
            .try_next()
            .await
            .map_err(|e| CatalogError::ListKeyspaces(e.to_string()))?
        {
            for ks in page.keyspaces() {
                out.push(ks.keyspace_name().to_string());
            }
        }
        Ok(out)
    }

    async fn tables(&self, keyspace: &str) -> Result<Vec<String>, CatalogError> {
        let mut out = Vec::new();
        let mut pages = self
            .client
            .list_tables()
            .keyspace_name(keyspace)
            .into_paginator()
            .send();
        while let Some(page) = pages.try_next().await.map_err(|e| CatalogError::ListTables {
            keyspace: keyspace.to_string(),
            reason: e.to_string(),
        })? {
            for table in page.tables() {
                out.push(table.table_name().to_string());
            }
        }
        Ok(out)
    }
}
