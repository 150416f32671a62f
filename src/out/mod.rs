use anyhow::Result;

use crate::discovery_core::Envelope;

pub mod http;

#[derive(Clone, Copy, Debug)]
pub enum OutMode {
    Stdout,
    Http,
}

impl OutMode {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "http" => OutMode::Http,
            _ => OutMode::Stdout,
        }
    }
}

pub fn emit_stdout(envelopes: &[Envelope]) -> Result<()> {
    println!("discovered records = {}", envelopes.len());
    println!("{}", serde_json::to_string_pretty(&envelopes)?);
    Ok(())
}
