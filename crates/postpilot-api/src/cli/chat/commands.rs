//! Slash command parsing for the chat loop.
//!
//! Commands start with `/`; anything else is a message to send.

use console::style;

use postpilot_types::chat::ChatId;

/// A chat picked either by its position in the last listing or by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTarget {
    /// 1-based position in the chat list.
    Index(usize),
    Id(ChatId),
}

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Start a new chat.
    New,
    /// Show the chat list.
    List,
    /// Open a chat from the list.
    Open(ChatTarget),
    /// Rename the open chat.
    Title(String),
    /// Delete a chat; the open one when no target is given.
    Delete(Option<ChatTarget>),
    /// Unknown or malformed command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd.to_lowercase(), arg.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/new" => ChatCommand::New,
        "/list" | "/ls" => ChatCommand::List,
        "/open" => match parse_target(arg) {
            Some(target) => ChatCommand::Open(target),
            None => ChatCommand::Unknown("/open requires a list number or chat id".to_string()),
        },
        "/title" | "/rename" => {
            if arg.is_empty() {
                ChatCommand::Unknown("/title requires a title".to_string())
            } else {
                ChatCommand::Title(arg.to_string())
            }
        }
        "/delete" | "/rm" => {
            if arg.is_empty() {
                ChatCommand::Delete(None)
            } else {
                match parse_target(arg) {
                    Some(target) => ChatCommand::Delete(Some(target)),
                    None => ChatCommand::Unknown(format!("not a list number or chat id: {arg}")),
                }
            }
        }
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

fn parse_target(arg: &str) -> Option<ChatTarget> {
    if let Ok(n) = arg.parse::<usize>() {
        return (n >= 1).then_some(ChatTarget::Index(n));
    }
    arg.parse::<ChatId>().ok().map(ChatTarget::Id)
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}              {}", style("/new").cyan(), "Start a new chat");
    println!("  {}             {}", style("/list").cyan(), "Show your chats");
    println!("  {}      {}", style("/open <n|id>").cyan(), "Open a chat from the list");
    println!("  {}    {}", style("/title <text>").cyan(), "Rename the open chat");
    println!("  {}  {}", style("/delete [n|id]").cyan(), "Delete a chat (default: the open one)");
    println!("  {}            {}", style("/clear").cyan(), "Clear the screen");
    println!("  {}             {}", style("/quit").cyan(), "End the session");
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse("write a post about rust"), None);
        assert_eq!(parse("  hello /new"), None);
    }

    #[test]
    fn test_parse_exit() {
        assert_eq!(parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/quit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/q"), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("/new"), Some(ChatCommand::New));
        assert_eq!(parse("/LIST"), Some(ChatCommand::List));
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("/cls"), Some(ChatCommand::Clear));
    }

    #[test]
    fn test_parse_open() {
        assert_eq!(parse("/open 2"), Some(ChatCommand::Open(ChatTarget::Index(2))));

        let id = ChatId::new();
        assert_eq!(
            parse(&format!("/open {id}")),
            Some(ChatCommand::Open(ChatTarget::Id(id)))
        );

        assert!(matches!(parse("/open"), Some(ChatCommand::Unknown(_))));
        assert!(matches!(parse("/open 0"), Some(ChatCommand::Unknown(_))));
        assert!(matches!(parse("/open nope"), Some(ChatCommand::Unknown(_))));
    }

    #[test]
    fn test_parse_title_keeps_spacing_inside() {
        assert_eq!(
            parse("/title  Launch  plan "),
            Some(ChatCommand::Title("Launch  plan".to_string()))
        );
        assert!(matches!(parse("/title"), Some(ChatCommand::Unknown(_))));
    }

    #[test]
    fn test_parse_delete() {
        assert_eq!(parse("/delete"), Some(ChatCommand::Delete(None)));
        assert_eq!(
            parse("/delete 3"),
            Some(ChatCommand::Delete(Some(ChatTarget::Index(3))))
        );
        assert!(matches!(parse("/delete x"), Some(ChatCommand::Unknown(_))));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse("/frobnicate"),
            Some(ChatCommand::Unknown("/frobnicate".to_string()))
        );
    }
}
