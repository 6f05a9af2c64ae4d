//! System status dashboard command.

use anyhow::Result;
use console::style;

use postpilot_core::chat::repository::ChatRepository;
use postpilot_core::generation::generator::TextGenerator;
use postpilot_infra::config::gemini_api_key;

use crate::state::AppState;

/// Display chat counts, storage location and generation settings.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let repo = state.chat_service.repo();
    let chats = repo.count_chats().await?;
    let messages = repo.count_messages().await?;
    let api_key_set = gemini_api_key().is_some();
    let generation = &state.config.generation;

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "database_url": state.database_url,
            "chats": chats,
            "messages": messages,
            "server": {
                "host": state.config.server.host,
                "port": state.config.server.port,
            },
            "generation": {
                "provider": state.chat_service.generator().name(),
                "model": generation.model,
                "timeout_secs": generation.timeout_secs,
                "api_key_set": api_key_set,
            },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} PostPilot v{}",
        style("✈").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Chats ──").dim());
    println!("  Chats:    {}", style(chats).bold());
    println!("  Messages: {}", style(messages).bold());
    println!();

    println!("  {}", style("── Generation ──").dim());
    println!("  Provider: {}", state.chat_service.generator().name());
    println!("  Model:    {}", generation.model);
    println!("  Timeout:  {}s", generation.timeout_secs);
    println!(
        "  API key:  {}",
        if api_key_set {
            style("set").green()
        } else {
            style("missing (set GEMINI_API_KEY)").yellow()
        }
    );
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Database: {}", style(&state.database_url).dim());
    println!(
        "  Server:   {}",
        style(format!(
            "http://{}:{}",
            state.config.server.host, state.config.server.port
        ))
        .dim()
    );
    println!();

    Ok(())
}
