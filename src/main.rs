mod catalog;
mod discoverers;
mod discovery_core;
mod mock;
mod out;
mod utils;

use futures::future::join_all;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use discoverers::{build_discoverers, ServiceKind};
use discovery_core::{BufferSink, DiscoveryContext, VersionStamp};
use out::OutMode;
use utils::env_or;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mock = std::env::var("MOCK_MODE").is_ok();
    let services = ServiceKind::parse_list(&env_or("SERVICES", "cassandra"));
    let modules = build_discoverers(&services, mock)?;

    let regions = resolve_regions(mock).await?;
    let account_id = if mock {
        "111122223333".to_string()
    } else {
        utils::account_id().await.unwrap_or_else(|_| "000000000000".to_string())
    };

    let ctx = DiscoveryContext {
        session_id: Uuid::new_v4().to_string(),
        account_id,
        version: VersionStamp::current(),
    };
    info!(session_id = %ctx.session_id, regions = regions.len(), modules = modules.len(), "starting discovery run");

    let sink = BufferSink::new();
    for region in &regions {
        let results = join_all(modules.iter().map(|m| {
            let ctx = &ctx;
            let sink = &sink;
            async move { (m.service(), m.discover(ctx, region, sink).await) }
        }))
        .await;

        for (service, res) in results {
            match res {
                Ok(emitted) => info!(service, region = %region, emitted, "discovery finished"),
                Err(e) => error!(service, region = %region, error = %e, "discovery failed"),
            }
        }
    }

    let envelopes = sink.drain();
    match OutMode::parse(&env_or("OUT", "stdout")) {
        OutMode::Stdout => out::emit_stdout(&envelopes)?,
        OutMode::Http => {
            let endpoint = env_or("ANALYZER_ENDPOINT", "http://localhost:8080/api/records:bulk");
            let batch_size = env_or("BATCH_SIZE", "100").parse().unwrap_or(100);
            let flush_ms = env_or("BATCH_FLUSH_MS", "200").parse().unwrap_or(200);
            out::http::post_batches(&endpoint, &envelopes, batch_size, flush_ms).await?;
        }
    }

    Ok(())
}

async fn resolve_regions(mock: bool) -> anyhow::Result<Vec<String>> {
    let configured = env_or("REGIONS", "");
    if !configured.is_empty() {
        return Ok(configured
            .split(',')
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect());
    }
    if mock {
        return Ok(vec!["us-east-1".to_string()]);
    }
    utils::enabled_regions().await
}
