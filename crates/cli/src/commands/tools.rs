//! `confab tools` — Show the configured tool descriptors.

use confab_config::AppConfig;
use confab_tools::ToolCatalog;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let catalog =
        ToolCatalog::load(&config.tools_path).map_err(|e| format!("Failed to load tools: {e}"))?;

    println!("🔧 Configured Tools");
    println!("===================");
    println!();
    println!("  File: {}", config.tools_path.display());
    println!();

    if catalog.is_empty() {
        println!("  (no tools configured)");
        return Ok(());
    }

    for tool in catalog.iter() {
        println!("  {} — {}", tool.name, tool.description);
        for param in &tool.parameters {
            let req = if param.required { "required" } else { "optional" };
            println!("      {} ({req}): {}", param.name, param.description);
        }
        println!();
    }

    Ok(())
}
