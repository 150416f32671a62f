pub mod record;

pub use record::{document_id, ResourceRecord, VersionStamp};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Mutex;
use thiserror::Error;

/// Immutable per-run context. Built once at startup, passed explicitly into
/// every discovery call and record construction.
#[derive(Debug, Clone)]
pub struct DiscoveryContext {
    pub session_id: String,
    pub account_id: String,
    pub version: VersionStamp,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record has no resource id")]
    MissingId,
}

/// What actually goes over the wire: the record serialization plus the
/// routing tag and session correlation. Frozen at construction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub type_tag: String,
    pub session_id: String,
    pub contents: Value,
}

impl Envelope {
    pub fn new(type_tag: String, record: &ResourceRecord) -> Result<Self, RecordError> {
        if record.id.is_empty() {
            return Err(RecordError::MissingId);
        }
        Ok(Self {
            type_tag,
            session_id: record.discovery_session_id.clone(),
            contents: record.serialize(),
        })
    }
}

/// Fire-and-forget emission target. Must be safe to share across modules
/// running concurrently.
pub trait EmitSink: Send + Sync {
    fn emit(&self, envelope: Envelope);
}

/// Accumulates envelopes in memory; the caller drains the buffer and hands
/// it to the delivery layer.
#[derive(Default)]
pub struct BufferSink {
    buf: Mutex<Vec<Envelope>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Envelope> {
        let mut buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *buf)
    }
}

impl EmitSink for BufferSink {
    fn emit(&self, envelope: Envelope) {
        self.buf
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(envelope);
    }
}

// Discovery interface: one implementation per external service.
#[async_trait]
pub trait DiscoveryModule: Send + Sync {
    /// Stable lowercase service identifier, used as the namespace prefix of
    /// emitted record types.
    fn service(&self) -> &'static str;

    fn type_tag(&self, subtype: &str) -> String {
        format!("{}:{}", self.service(), subtype)
    }

    /// Read-only enumeration of one region. Returns the number of emitted
    /// records; per-entity failures are logged and skipped internally.
    async fn discover(
        &self,
        ctx: &DiscoveryContext,
        region: &str,
        sink: &dyn EmitSink,
    ) -> anyhow::Result<usize>;
}
