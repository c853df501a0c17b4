//! `mostrador chat` — Interactive or single-message chat mode.

use std::sync::Arc;

use anyhow::{Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};

use mostrador_config::ConfigStore;
use mostrador_gateway::GeminiGateway;
use mostrador_session::ChatSession;

pub async fn run(message: Option<String>, api_key: Option<String>) -> Result<()> {
    let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
        eprintln!();
        eprintln!("  ERROR: No Gemini API key configured!");
        eprintln!();
        eprintln!("  Set the environment variable:");
        eprintln!("    GEMINI_API_KEY='AIza...'");
        eprintln!();
        eprintln!("  Get a key at: https://aistudio.google.com/apikey");
        eprintln!();
        bail!("No API key found. See above for setup instructions.");
    };

    let store = ConfigStore::open();
    let config = store.current().clone();

    let gateway = Arc::new(GeminiGateway::new(api_key));
    let mut session = ChatSession::new(gateway, config.clone());

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Pensando...");
        session.send(msg).await?;
        eprint!("\r             \r");
        while let Some(chunk) = session.next_chunk().await {
            println!("{}", chunk.text);
            if chunk.last {
                break;
            }
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║         Mostrador — Modo Interactivo         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Modelo:      {}", config.model);
    println!(
        "  Voz:         {}",
        if config.enable_speech { "activada" } else { "desactivada" }
    );
    println!(
        "  Calendario:  {}",
        if config.google_calendar_integration { "activado" } else { "desactivado" }
    );
    println!();
    println!("  Escribe tu mensaje y presiona Enter.");
    println!("  Escribe 'salir' para terminar, '/reiniciar' para empezar de nuevo.");
    println!();

    if config.proactive_assistant {
        session.greet().await?;
        print_exchange(&mut session).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  Tú > ");
    use std::io::Write;
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            print!("  Tú > ");
            std::io::stdout().flush()?;
            continue;
        }
        if input.eq_ignore_ascii_case("salir") || input.eq_ignore_ascii_case("exit") {
            break;
        }
        if input == "/reiniciar" {
            session.reset();
            println!("  (conversación reiniciada)");
            println!();
            print!("  Tú > ");
            std::io::stdout().flush()?;
            continue;
        }

        session.send(input).await?;
        print_exchange(&mut session).await;

        print!("  Tú > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  ¡Hasta luego! 👋");
    println!();

    Ok(())
}

/// Print every chunk of the exchange in flight, then the usage footer.
async fn print_exchange(session: &mut ChatSession) {
    while let Some(chunk) = session.next_chunk().await {
        println!();
        for line in chunk.text.lines() {
            println!("  Asistente > {line}");
        }
        if chunk.last {
            break;
        }
    }
    println!();
    println!("  [{}]", session.usage_summary());
    println!();
}
