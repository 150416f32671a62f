use anyhow::{anyhow, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

use crate::discovery_core::Envelope;

const CONNECT_TIMEOUT: u64 = 5;
const READ_TIMEOUT: u64 = 60;
const RETRIES: usize = 3;

pub async fn post_batches(
    endpoint: &str,
    envelopes: &[Envelope],
    batch_size: usize,
    batch_flush_ms: u64,
) -> Result<()> {
    if envelopes.is_empty() {
        return Ok(());
    }

    let client = Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT))
        .timeout(Duration::from_secs(READ_TIMEOUT))
        .build()?;

    let batch_size = batch_size.max(1);
    let mut i = 0;
    while i < envelopes.len() {
        let j = (i + batch_size).min(envelopes.len());
        post_with_retry(&client, endpoint, &envelopes[i..j]).await?;

        // flush interval between batches
        tokio::time::sleep(Duration::from_millis(batch_flush_ms)).await;
        i = j;
    }

    Ok(())
}

async fn post_with_retry(client: &Client, endpoint: &str, batch: &[Envelope]) -> Result<()> {
    let mut last = None;
    for attempt in 1..=RETRIES {
        match client.post(endpoint).json(&batch).send().await {
            Ok(r) if r.status().is_success() => return Ok(()),
            Ok(r) => {
                let code = r.status();
                let body = r.text().await.unwrap_or_default();
                warn!(attempt, status = %code, "record batch post rejected");
                last = Some(anyhow!("HTTP {code} - {body}"));
            }
            Err(e) => {
                warn!(attempt, error = %e, "record batch post failed");
                last = Some(anyhow!(e));
            }
        }
        tokio::time::sleep(Duration::from_millis(300 * attempt as u64)).await;
    }
    Err(last.unwrap_or_else(|| anyhow!("record batch post failed")))
}
