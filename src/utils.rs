use anyhow::Result;
use aws_config::BehaviorVersion;
use aws_sdk_ec2 as ec2;
use aws_sdk_sts as sts;

pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

pub async fn enabled_regions() -> Result<Vec<String>> {
    let conf = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = ec2::Client::new(&conf);
    let resp = client.describe_regions().send().await?;
    let regions = resp
        .regions()
        .iter()
        .filter_map(|r| r.region_name().map(|s| s.to_string()))
        .collect();
    Ok(regions)
}

pub async fn account_id() -> Result<String> {
    let conf = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = sts::Client::new(&conf);
    let who = client.get_caller_identity().send().await?;
    Ok(who.account().unwrap_or("000000000000").to_string())
}
