use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use super::DiscoveryContext;

// Namespace for document ids. Fixed: changing it changes every documentId
// and breaks upsert matching downstream.
const DOCUMENT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x4da1_e3b2_c55f_4f76_a9d3_e8b4_2019_7c11);

const AWS_SDK_VERSION: &str = "1.5";

/// Scanner/SDK version pair stamped into every record's `discoveryMeta`.
/// Computed once at startup and passed around via [`DiscoveryContext`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionStamp {
    pub scanner: String,
    pub aws_sdk: String,
}

impl VersionStamp {
    pub fn current() -> Self {
        Self {
            scanner: env!("CARGO_PKG_VERSION").to_string(),
            aws_sdk: AWS_SDK_VERSION.to_string(),
        }
    }
}

/// Deterministic document id for a resource identifier. Any consumer holding
/// only the id can recompute it, which is what makes cross-run upserts work.
pub fn document_id(id: &str) -> String {
    Uuid::new_v5(&DOCUMENT_ID_NAMESPACE, id.as_bytes()).to_string()
}

/// Normalized envelope for one discovered cloud entity.
///
/// `configuration` is set once at construction; `supplementary_configuration`
/// and `tags` start empty and may be enriched by the producing module before
/// the record is emitted. Nothing mutates a record after emission.
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub id: String,
    pub name: Option<String>,
    pub resource_id: Option<String>,
    pub resource_type: Option<String>,
    pub region: String,
    pub account_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub discovery_session_id: String,
    pub max_size_bytes: Option<i64>,
    pub size_bytes: Option<i64>,
    pub configuration: Value,
    pub supplementary_configuration: Map<String, Value>,
    pub tags: HashMap<String, String>,
    pub discovery_meta: Map<String, Value>,
}

impl ResourceRecord {
    pub fn new(configuration: Value, region: &str, account_id: &str, ctx: &DiscoveryContext) -> Self {
        let mut discovery_meta = Map::new();
        discovery_meta.insert("version".to_string(), json!(ctx.version));

        Self {
            id: String::new(),
            name: None,
            resource_id: None,
            resource_type: None,
            region: region.to_string(),
            account_id: account_id.to_string(),
            created_at: None,
            updated_at: None,
            discovery_session_id: ctx.session_id.clone(),
            max_size_bytes: None,
            size_bytes: None,
            configuration,
            supplementary_configuration: Map::new(),
            tags: HashMap::new(),
            discovery_meta,
        }
    }

    pub fn supplement(&mut self, key: &str, value: Value) {
        self.supplementary_configuration.insert(key.to_string(), value);
    }

    pub fn set_tag(&mut self, key: &str, value: &str) {
        self.tags.insert(key.to_string(), value.to_string());
    }

    pub fn identity(&self) -> String {
        document_id(&self.id)
    }

    /// Wire document. Absent optionals serialize as `null`, not omission,
    /// and `documentId` is always the first field.
    pub fn serialize(&self) -> Value {
        json!({
            "documentId": self.identity(),
            "id": self.id,
            "name": self.name,
            "resourceId": self.resource_id,
            "resourceType": self.resource_type,
            "region": self.region,
            "accountId": self.account_id,
            "createdAt": self.created_at,
            "updatedAt": self.updated_at,
            "discoverySessionId": self.discovery_session_id,
            "maxSizeBytes": self.max_size_bytes,
            "sizeBytes": self.size_bytes,
            "configuration": self.configuration,
            "supplementaryConfiguration": self.supplementary_configuration,
            "tags": self.tags,
            "discoveryMeta": self.discovery_meta,
        })
    }
}
