//! `mostrador enhance` — Rewrite a knowledge-base block through the model.
//!
//! Reads the block from stdin and prints the improved text, so it can sit
//! in a shell pipeline while editing the business context.

use anyhow::{Result, bail};
use tokio::io::AsyncReadExt;

use mostrador_core::Gateway;
use mostrador_gateway::GeminiGateway;

pub async fn run(label: String, api_key: Option<String>) -> Result<()> {
    let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
        bail!("No API key found. Set GEMINI_API_KEY.");
    };

    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    let text = text.trim();
    if text.is_empty() {
        bail!("Nothing to enhance: stdin was empty.");
    }

    let gateway = GeminiGateway::new(api_key);
    let improved = gateway.enhance(text, &label).await?;
    println!("{improved}");

    Ok(())
}
