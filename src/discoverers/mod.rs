mod cassandra;

pub use cassandra::CassandraDiscovery;

use anyhow::Result;
use std::sync::Arc;

use crate::catalog::KeyspacesCatalog;
use crate::discovery_core::DiscoveryModule;
use crate::mock::StaticCatalog;

#[derive(Debug, PartialEq, Eq)]
pub enum ServiceKind {
    Cassandra,
}

impl ServiceKind {
    pub fn parse_list(s: &str) -> Vec<ServiceKind> {
        s.split(',')
            .filter_map(|x| match x.trim().to_lowercase().as_str() {
                "cassandra" => Some(ServiceKind::Cassandra),
                _ => None,
            })
            .collect()
    }
}

pub fn build_discoverers(services: &[ServiceKind], mock: bool) -> Result<Vec<Arc<dyn DiscoveryModule>>> {
    let mut v: Vec<Arc<dyn DiscoveryModule>> = vec![];
    for svc in services {
        match svc {
            ServiceKind::Cassandra => {
                let module = if mock {
                    CassandraDiscovery::new(Arc::new(StaticCatalog::sample()))
                } else {
                    CassandraDiscovery::new(Arc::new(KeyspacesCatalog))
                };
                v.push(Arc::new(module));
            }
        }
    }
    Ok(v)
}
