//! `mostrador calendar` — Query busy intervals through a running relay.
//!
//! Expects the relay to be up and already authorized via `/auth/google`;
//! points there otherwise.

use anyhow::Result;

use mostrador_core::RelayError;
use mostrador_relay::RelayClient;
use mostrador_relay::client::DEFAULT_RELAY_URL;

pub async fn run(start: String, end: String, relay_url: Option<String>) -> Result<()> {
    let base_url = relay_url.unwrap_or_else(|| DEFAULT_RELAY_URL.to_string());
    let client = RelayClient::new(base_url);

    match client.free_busy(&start, &end).await {
        Ok(busy) if busy.is_empty() => {
            println!("Sin eventos ocupados entre {start} y {end}.");
        }
        Ok(busy) => {
            println!("Intervalos ocupados:");
            for interval in busy {
                println!("  {} — {}", interval.start, interval.end);
            }
        }
        Err(RelayError::NotAuthenticated) => {
            eprintln!("El relay no está autorizado todavía.");
            eprintln!("Abre en tu navegador: {}", client.auth_url());
            anyhow::bail!("relay not authenticated");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
