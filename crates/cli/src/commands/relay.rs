//! `mostrador relay` — Start the Google Calendar OAuth relay.

use std::sync::Arc;

use anyhow::{Result, bail};

use mostrador_relay::{GoogleCalendar, RelayState, TokenStore, server};

pub async fn run(
    port_override: Option<u16>,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
) -> Result<()> {
    let (Some(client_id), Some(client_secret)) = (
        client_id.filter(|v| !v.is_empty()),
        client_secret.filter(|v| !v.is_empty()),
    ) else {
        eprintln!();
        eprintln!("  ERROR: Google OAuth credentials are not configured!");
        eprintln!();
        eprintln!("  Set both environment variables:");
        eprintln!("    GOOGLE_CLIENT_ID='....apps.googleusercontent.com'");
        eprintln!("    GOOGLE_CLIENT_SECRET='...'");
        eprintln!();
        eprintln!("  Create credentials at: https://console.cloud.google.com/apis/credentials");
        eprintln!();
        bail!("Missing OAuth credentials. See above for setup instructions.");
    };

    let port = port_override.unwrap_or_else(server::default_port);
    let redirect_uri = redirect_uri
        .unwrap_or_else(|| format!("http://localhost:{port}/oauth2callback"));

    let state = Arc::new(RelayState {
        provider: Arc::new(GoogleCalendar::new(
            client_id,
            client_secret,
            redirect_uri.clone(),
        )),
        tokens: Arc::new(TokenStore::new()),
    });

    println!("📅 Mostrador Calendar Relay");
    println!("   Escuchando: 0.0.0.0:{port}");
    println!("   Callback:   {redirect_uri}");

    server::run(state, port).await?;

    Ok(())
}
