//! `confab chat` — Interactive or single-message chat mode.

use std::io::Write;

use confab_agent::ChatOrchestrator;
use confab_config::AppConfig;
use confab_tools::ToolCatalog;
use tokio::io::{self, AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GROQ_API_KEY   = 'gsk_...'    (recommended)");
        eprintln!("    OPENAI_API_KEY = 'sk-...'     (for OpenAI direct)");
        eprintln!("    CONFAB_API_KEY = '...'        (generic)");
        eprintln!();
        eprintln!("  Or add api_key to your confab.toml.");
        eprintln!();
        eprintln!("  Get a Groq key at: https://console.groq.com/keys");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let catalog =
        ToolCatalog::load(&config.tools_path).map_err(|e| format!("Failed to load tools: {e}"))?;
    let model = confab_providers::build_from_config(&config)?;
    let orchestrator = ChatOrchestrator::from_config(model, &catalog, &config);

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let response = orchestrator.handle_query(&msg).await?;
        eprint!("\r             \r");
        println!("{response}");
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Confab — Interactive Chat Mode        ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.provider.name);
    println!("  Model:     {}", config.model);
    if catalog.is_empty() {
        println!("  Tools:     (none)");
    } else {
        println!("  Tools:     {}", catalog.names().join(", "));
    }
    println!("  Memory:    last {} exchanges", config.memory.window);
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or 'quit' to leave.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();

    print!("You: ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            print!("You: ");
            std::io::stdout().flush()?;
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        match orchestrator.handle_query(line).await {
            Ok(response) => println!("Bot: {response}"),
            Err(e) => eprintln!("  [Error] {e}"),
        }

        print!("You: ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}
