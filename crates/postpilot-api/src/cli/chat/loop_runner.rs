//! Main chat loop orchestration.
//!
//! Reads lines from the terminal, routes slash commands and messages to the
//! [`ChatController`], and prints whatever changed.

use console::style;

use postpilot_types::chat::{ChatId, MessageRole};

use super::backend::{ChatBackend, HttpChatBackend};
use super::commands::{self, ChatCommand, ChatTarget};
use super::controller::ChatController;
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Run the interactive chat client against the server at `server`.
pub async fn run_chat_loop(user_id: &str, server: &str) -> anyhow::Result<()> {
    let backend = HttpChatBackend::new(server)?;
    let mut controller = ChatController::new(backend, user_id);
    let renderer = ChatRenderer::new();

    renderer.print_banner(user_id, server);

    controller.refresh().await;
    if let Some(err) = controller.error() {
        renderer.print_error(err);
    } else if !controller.chats().is_empty() {
        renderer.print_notice(&format!(
            "You have {} recent chat(s). Use /list to see them.",
            controller.chats().len()
        ));
        println!();
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let line = match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                renderer.print_notice("Press Ctrl+D or type /quit to exit.");
                continue;
            }
            InputEvent::Line(line) if line.is_empty() => continue,
            InputEvent::Line(line) => line,
        };

        let Some(command) = commands::parse(&line) else {
            send_message(&mut controller, &renderer, &line).await;
            continue;
        };

        match command {
            ChatCommand::Exit => {
                println!("  {}", style("Session ended.").dim());
                break;
            }
            ChatCommand::Help => commands::print_help(),
            ChatCommand::Clear => chat_input.clear(),
            ChatCommand::New => {
                controller.new_chat();
                renderer.print_notice("Started a new chat.");
            }
            ChatCommand::List => {
                controller.refresh().await;
                report_error(&controller, &renderer);
                renderer.print_chat_list(controller.chats(), controller.current_chat_id());
            }
            ChatCommand::Open(target) => {
                let Some(chat_id) = resolve_target(&controller, target) else {
                    renderer.print_error("No such chat in the list. Use /list first.");
                    continue;
                };
                controller.load(chat_id).await;
                if !report_error(&controller, &renderer) {
                    renderer.print_conversation(controller.current_title(), controller.messages());
                }
            }
            ChatCommand::Title(title) => {
                if controller.current_chat_id().is_none() {
                    renderer.print_error("No chat is open. Send a message or /open one first.");
                    continue;
                }
                controller.rename(&title).await;
                if !report_error(&controller, &renderer) {
                    renderer.print_notice(&format!("Renamed to \"{}\".", title.trim()));
                }
            }
            ChatCommand::Delete(target) => {
                let chat_id = match target {
                    Some(target) => resolve_target(&controller, target),
                    None => controller.current_chat_id(),
                };
                let Some(chat_id) = chat_id else {
                    renderer.print_error("Nothing to delete.");
                    continue;
                };
                controller.delete(chat_id).await;
                if !report_error(&controller, &renderer) {
                    renderer.print_notice("Chat deleted.");
                }
            }
            ChatCommand::Unknown(what) => {
                renderer.print_error(&format!("Unknown command: {what}. Type /help."));
            }
        }
    }

    chat_input.flush();
    Ok(())
}

/// Send a message and print the reply (or the local apology).
async fn send_message<B: ChatBackend>(
    controller: &mut ChatController<B>,
    renderer: &ChatRenderer,
    text: &str,
) {
    println!("  {}", style("thinking...").dim());

    let was_new = controller.current_chat_id().is_none();
    controller.send(text).await;

    if let Some(reply) = controller
        .messages()
        .last()
        .filter(|m| m.role == MessageRole::Assistant)
    {
        renderer.print_message(reply);
    }

    if !report_error(controller, renderer) && was_new {
        if let Some(title) = controller.current_title() {
            renderer.print_notice(&format!("Saved as \"{title}\"."));
            println!();
        }
    }
}

/// Print the controller's error, if any. Returns whether one was printed.
fn report_error<B: ChatBackend>(controller: &ChatController<B>, renderer: &ChatRenderer) -> bool {
    match controller.error() {
        Some(err) => {
            renderer.print_error(err);
            true
        }
        None => false,
    }
}

fn resolve_target<B: ChatBackend>(controller: &ChatController<B>, target: ChatTarget) -> Option<ChatId> {
    match target {
        ChatTarget::Index(n) => controller.chats().get(n.checked_sub(1)?).map(|c| c.id),
        ChatTarget::Id(id) => Some(id),
    }
}
