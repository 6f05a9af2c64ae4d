//! Admin commands for stored chats: list, show, delete.
//!
//! These run against the database directly through the chat service, so
//! they work without a running server.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use postpilot_types::chat::{ListChatsQuery, MessageRole};

use crate::cli::chat::renderer::ChatRenderer;
use crate::cli::format_relative_time;
use crate::state::AppState;

/// List one page of a user's chats as a table or JSON.
pub async fn list_chats(
    state: &AppState,
    user: &str,
    page: i64,
    limit: i64,
    full: bool,
    json: bool,
) -> Result<()> {
    let query = ListChatsQuery {
        user_id: Some(user.to_string()),
        page: Some(page.to_string()),
        limit: Some(limit.to_string()),
    };

    if full {
        let page = state.chat_service.list_chats(&query).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&page)?);
            return Ok(());
        }
        let summaries: Vec<_> = page.chats.iter().map(|c| (c.summary(), c.messages.len())).collect();
        print_table(user, &summaries, page.pagination.total, page.pagination.page, page.pagination.pages);
        return Ok(());
    }

    let page = state.chat_service.list_chat_summaries(&query).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let rows: Vec<_> = page.chats.into_iter().map(|c| (c, 0)).collect();
    print_table(user, &rows, page.pagination.total, page.pagination.page, page.pagination.pages);
    Ok(())
}

fn print_table(
    user: &str,
    rows: &[(postpilot_types::chat::ChatSummary, usize)],
    total: u64,
    page: u32,
    pages: u64,
) {
    if rows.is_empty() {
        println!();
        println!(
            "  {} No chats found for {}.",
            style("i").blue().bold(),
            style(user).yellow()
        );
        println!();
        return;
    }

    let with_counts = rows.iter().any(|(_, n)| *n > 0);

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![
        Cell::new("Title").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ];
    if with_counts {
        header.push(Cell::new("Messages").fg(Color::White));
    }
    table.set_header(header);

    for (chat, count) in rows {
        let mut row = vec![
            Cell::new(&chat.title).fg(Color::Cyan),
            Cell::new(chat.id.to_string()).fg(Color::DarkGrey),
            Cell::new(format_relative_time(&chat.updated_at)).fg(Color::DarkGrey),
        ];
        if with_counts {
            row.push(Cell::new(count));
        }
        table.add_row(row);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} chat{} · page {} of {}",
        style(total).bold(),
        if total == 1 { "" } else { "s" },
        page,
        pages.max(1)
    );
    println!();
}

/// Print a chat with all its messages.
pub async fn show_chat(state: &AppState, id: &str, json: bool) -> Result<()> {
    let chat = state.chat_service.get_chat(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chat)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&chat.title).cyan().bold());
    println!();
    println!("  {}", style("── Details ──").dim());
    println!("  {}       {}", style("ID:").bold(), style(chat.id.to_string()).dim());
    println!("  {}     {}", style("User:").bold(), chat.owner_id);
    println!(
        "  {}  {}",
        style("Created:").bold(),
        chat.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "  {}  {}",
        style("Updated:").bold(),
        chat.updated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "  {} {} ({} turns)",
        style("Messages:").bold(),
        chat.messages.len(),
        chat.messages.iter().filter(|m| m.role == MessageRole::User).count()
    );
    println!();

    let renderer = ChatRenderer::new();
    renderer.print_conversation(None, &chat.messages);

    Ok(())
}

/// Delete a chat permanently with confirmation.
pub async fn delete_chat(state: &AppState, id: &str, force: bool, json: bool) -> Result<()> {
    let chat = state.chat_service.get_chat(id).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete chat '{}' and its {} messages?",
                style(&chat.title).red().bold(),
                chat.messages.len()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.chat_service.delete_chat(id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "id": chat.id.to_string()})
        );
    } else {
        println!(
            "  {} Chat '{}' deleted.",
            style("✓").red().bold(),
            chat.title
        );
    }

    Ok(())
}
