//! Terminal output for the chat loop.
//!
//! Assistant replies are markdown (line breaks, emphasis, lists) and are
//! rendered through `termimad`; everything else is styled with `console`.

use console::style;
use termimad::MadSkin;

use postpilot_types::chat::{ChatId, ChatMessage, ChatSummary, MessageRole};

use crate::cli::format_relative_time;

/// Terminal renderer for messages, chat lists and notices.
pub struct ChatRenderer {
    skin: MadSkin,
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
        Self { skin }
    }

    /// Render markdown for the terminal.
    pub fn render_markdown(&self, markdown: &str) -> String {
        self.skin.term_text(markdown).to_string()
    }

    /// Print the welcome banner at the start of a session.
    pub fn print_banner(&self, user_id: &str, server: &str) {
        println!();
        println!("  {} {}", style("✈").cyan(), style("PostPilot").cyan().bold());
        println!("  {}", style("Your social media content teammate").dim());
        println!();
        println!("  {}    {}", style("User:").bold(), style(user_id).dim());
        println!("  {}  {}", style("Server:").bold(), style(server).dim());
        println!();
        println!(
            "  {}",
            style("Type a message to start a chat, /help for commands").dim()
        );
        println!();
    }

    /// Print one message with a role label.
    pub fn print_message(&self, message: &ChatMessage) {
        match message.role {
            MessageRole::User => {
                println!("  {} {}", style("You >").green().bold(), message.content);
            }
            MessageRole::Assistant => {
                println!("  {}", style("PostPilot >").cyan().bold());
                let rendered = self.render_markdown(&message.content);
                for line in rendered.trim_end().lines() {
                    println!("  {line}");
                }
            }
        }
        println!();
    }

    /// Print every message of the open conversation under its title.
    pub fn print_conversation(&self, title: Option<&str>, messages: &[ChatMessage]) {
        println!();
        println!(
            "  {} {}",
            style("──").dim(),
            style(title.unwrap_or("New chat")).bold()
        );
        println!();
        for message in messages {
            self.print_message(message);
        }
    }

    /// Print the numbered chat list, marking the open chat.
    pub fn print_chat_list(&self, chats: &[ChatSummary], current: Option<ChatId>) {
        println!();
        if chats.is_empty() {
            println!("  {}", style("No chats yet.").dim());
            println!();
            return;
        }
        for (i, chat) in chats.iter().enumerate() {
            let marker = if Some(chat.id) == current { "●" } else { " " };
            println!(
                "  {} {:>2}. {}  {}",
                style(marker).green(),
                i + 1,
                chat.title,
                style(format_relative_time(&chat.updated_at)).dim()
            );
        }
        println!();
    }

    pub fn print_notice(&self, text: &str) {
        println!("  {} {}", style("i").blue().bold(), text);
    }

    pub fn print_error(&self, text: &str) {
        eprintln!("  {} {}", style("!").red().bold(), style(text).red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_markdown_keeps_text() {
        let renderer = ChatRenderer::new();
        let out = renderer.render_markdown("Launch day 🚀\n\n#BuildInPublic");
        assert!(out.contains("Launch day"));
        assert!(out.contains("#BuildInPublic"));
    }
}
