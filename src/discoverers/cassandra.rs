use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

use crate::catalog::{CatalogProvider, CatalogSession};
use crate::discovery_core::{DiscoveryContext, DiscoveryModule, EmitSink, Envelope, ResourceRecord};

pub struct CassandraDiscovery {
    catalog: Arc<dyn CatalogProvider>,
}

impl CassandraDiscovery {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { catalog }
    }

    fn arn_keyspace(region: &str, account: &str, keyspace: &str) -> String {
        format!("arn:aws:cassandra:{region}:{account}:/keyspace/{keyspace}/")
    }

    async fn discover_keyspace(
        &self,
        session: &dyn CatalogSession,
        ctx: &DiscoveryContext,
        region: &str,
        keyspace: &str,
    ) -> anyhow::Result<Envelope> {
        let tables = session.tables(keyspace).await?;

        let mut record = ResourceRecord::new(
            json!({ "name": keyspace, "region": region }),
            region,
            &ctx.account_id,
            ctx,
        );
        record.id = Self::arn_keyspace(region, &ctx.account_id, keyspace);
        record.name = Some(keyspace.to_string());
        record.resource_id = Some(keyspace.to_string());
        record.resource_type = Some(self.type_tag("keyspace"));
        record.supplement("tables", json!(tables));

        Ok(Envelope::new(self.type_tag("keyspace"), &record)?)
    }
}

#[async_trait]
impl DiscoveryModule for CassandraDiscovery {
    fn service(&self) -> &'static str {
        "cassandra"
    }

    async fn discover(
        &self,
        ctx: &DiscoveryContext,
        region: &str,
        sink: &dyn EmitSink,
    ) -> anyhow::Result<usize> {
        // Both setup and keyspace-listing failures are terminal for this
        // region: log, emit nothing, move on.
        let session = match self.catalog.open(region).await {
            Ok(session) => session,
            Err(e) => {
                error!(region, error = %e, "cassandra catalog session setup failed");
                return Ok(0);
            }
        };

        let keyspaces = match session.keyspaces().await {
            Ok(keyspaces) => keyspaces,
            Err(e) => {
                error!(region, error = %e, "cassandra keyspace listing failed");
                return Ok(0);
            }
        };

        let mut emitted = 0;
        for keyspace in &keyspaces {
            // One bad keyspace must not abort the scan.
            match self
                .discover_keyspace(session.as_ref(), ctx, region, keyspace)
                .await
            {
                Ok(envelope) => {
                    sink.emit(envelope);
                    emitted += 1;
                }
                Err(e) => debug!(region, keyspace = %keyspace, error = %e, "keyspace discovery error"),
            }
        }

        Ok(emitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::discovery_core::{BufferSink, VersionStamp};
    use crate::mock::StaticCatalog;
    use maplit::hashmap;

    fn ctx() -> DiscoveryContext {
        DiscoveryContext {
            session_id: "session-1".to_string(),
            account_id: "123456789012".to_string(),
            version: VersionStamp::current(),
        }
    }

    /// Lists two keyspaces but fails the table query for `ks_b`.
    struct FlakyCatalog;

    #[async_trait]
    impl CatalogSession for FlakyCatalog {
        async fn keyspaces(&self) -> Result<Vec<String>, CatalogError> {
            Ok(vec!["ks_a".to_string(), "ks_b".to_string()])
        }

        async fn tables(&self, keyspace: &str) -> Result<Vec<String>, CatalogError> {
            match keyspace {
                "ks_a" => Ok(vec!["t1".to_string(), "t2".to_string()]),
                other => Err(CatalogError::ListTables {
                    keyspace: other.to_string(),
                    reason: "read timeout".to_string(),
                }),
            }
        }
    }

    #[async_trait]
    impl CatalogProvider for FlakyCatalog {
        async fn open(&self, _region: &str) -> Result<Box<dyn CatalogSession>, CatalogError> {
            Ok(Box::new(FlakyCatalog))
        }
    }

    struct UnreachableCatalog;

    #[async_trait]
    impl CatalogProvider for UnreachableCatalog {
        async fn open(&self, region: &str) -> Result<Box<dyn CatalogSession>, CatalogError> {
            Err(CatalogError::Setup(format!("no credentials resolvable in {region}")))
        }
    }

    struct BrokenListing;

    #[async_trait]
    impl CatalogSession for BrokenListing {
        async fn keyspaces(&self) -> Result<Vec<String>, CatalogError> {
            Err(CatalogError::ListKeyspaces("connection reset".to_string()))
        }

        async fn tables(&self, keyspace: &str) -> Result<Vec<String>, CatalogError> {
            Err(CatalogError::ListTables {
                keyspace: keyspace.to_string(),
                reason: "connection reset".to_string(),
            })
        }
    }

    #[async_trait]
    impl CatalogProvider for BrokenListing {
        async fn open(&self, _region: &str) -> Result<Box<dyn CatalogSession>, CatalogError> {
            Ok(Box::new(BrokenListing))
        }
    }

    #[tokio::test]
    async fn one_bad_keyspace_does_not_abort_the_scan() {
        let module = CassandraDiscovery::new(Arc::new(FlakyCatalog));
        let sink = BufferSink::new();

        let emitted = module.discover(&ctx(), "us-east-1", &sink).await.unwrap();
        assert_eq!(emitted, 1);

        let envelopes = sink.drain();
        assert_eq!(envelopes.len(), 1);

        let envelope = &envelopes[0];
        assert_eq!(envelope.type_tag, "cassandra:keyspace");
        assert_eq!(envelope.contents["name"], "ks_a");
        assert_eq!(envelope.contents["region"], "us-east-1");
        assert_eq!(envelope.contents["configuration"]["name"], "ks_a");
        assert_eq!(
            envelope.contents["supplementaryConfiguration"]["tables"],
            serde_json::json!(["t1", "t2"])
        );
    }

    #[tokio::test]
    async fn zero_keyspaces_means_zero_emissions() {
        let module = CassandraDiscovery::new(Arc::new(StaticCatalog::new(vec![], hashmap! {})));
        let sink = BufferSink::new();

        let emitted = module.discover(&ctx(), "us-east-1", &sink).await.unwrap();
        assert_eq!(emitted, 0);
        assert!(sink.drain().is_empty());
    }

    #[tokio::test]
    async fn keyspace_without_tables_gets_an_empty_sequence() {
        let catalog = StaticCatalog::new(vec!["empty_ks".to_string()], hashmap! {});
        let module = CassandraDiscovery::new(Arc::new(catalog));
        let sink = BufferSink::new();

        let emitted = module.discover(&ctx(), "eu-west-1", &sink).await.unwrap();
        assert_eq!(emitted, 1);

        let envelopes = sink.drain();
        assert_eq!(
            envelopes[0].contents["supplementaryConfiguration"]["tables"],
            serde_json::json!([])
        );
    }

    #[tokio::test]
    async fn setup_failure_is_terminal_without_emissions() {
        let module = CassandraDiscovery::new(Arc::new(UnreachableCatalog));
        let sink = BufferSink::new();

        let emitted = module.discover(&ctx(), "us-east-1", &sink).await.unwrap();
        assert_eq!(emitted, 0);
        assert!(sink.drain().is_empty());
    }

    #[tokio::test]
    async fn keyspace_listing_failure_is_terminal_without_emissions() {
        let module = CassandraDiscovery::new(Arc::new(BrokenListing));
        let sink = BufferSink::new();

        let emitted = module.discover(&ctx(), "us-east-1", &sink).await.unwrap();
        assert_eq!(emitted, 0);
        assert!(sink.drain().is_empty());
    }

    #[tokio::test]
    async fn document_ids_are_stable_across_runs() {
        let module = CassandraDiscovery::new(Arc::new(StaticCatalog::sample()));

        let first_sink = BufferSink::new();
        module.discover(&ctx(), "us-east-1", &first_sink).await.unwrap();
        let second_sink = BufferSink::new();
        module.discover(&ctx(), "us-east-1", &second_sink).await.unwrap();

        let first = first_sink.drain();
        let second = second_sink.drain();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].contents["documentId"], second[0].contents["documentId"]);
    }

    #[tokio::test]
    async fn records_carry_session_and_account_context() {
        let module = CassandraDiscovery::new(Arc::new(StaticCatalog::sample()));
        let sink = BufferSink::new();

        module.discover(&ctx(), "ap-northeast-2", &sink).await.unwrap();

        let envelopes = sink.drain();
        let contents = &envelopes[0].contents;
        assert_eq!(envelopes[0].session_id, "session-1");
        assert_eq!(contents["discoverySessionId"], "session-1");
        assert_eq!(contents["accountId"], "123456789012");
        assert_eq!(contents["resourceType"], "cassandra:keyspace");
        assert!(contents["id"]
            .as_str()
            .unwrap()
            .starts_with("arn:aws:cassandra:ap-northeast-2:123456789012:/keyspace/"));
    }
}
