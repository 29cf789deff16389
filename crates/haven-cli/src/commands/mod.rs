//! Slash commands for interactive mode

mod compare;
mod contact;
mod filter;
mod saved;

pub use compare::CompareCommand;
pub use contact::ContactCommand;
pub use filter::FilterCommand;
pub use saved::SavedCommand;

use std::path::PathBuf;

/// Result of executing a slash command.
///
/// Parsing is synchronous; anything that needs the backend or the saved-list
/// store is returned as a request for the event loop to carry out.
pub enum CommandResult {
    /// Show a message to the user (not sent to the assistant)
    Message(String),
    /// Send this text as a chat prompt
    Prompt(String),
    /// Run a personalized recommendation turn
    Personalized,
    /// Show the saved-listings panel
    ListSaved,
    /// Save a listing (numbered link from the last response, or a URL)
    Save(String),
    /// Remove a saved listing (index into the saved list, or a URL)
    Unsave(String),
    /// Send an enquiry to the listing agent
    Contact {
        target: String,
        message: Option<String>,
    },
    /// Print a share link for a saved listing
    Share(String),
    /// Compare saved listings, optionally on a basis
    Compare {
        items: Vec<String>,
        basis: Option<String>,
    },
    /// Transcribe an audio file and submit the text
    Voice(PathBuf),
    /// Clear the conversation
    Clear,
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse a slash command
pub fn execute_command(input: &str) -> Option<CommandResult> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = input[1..].splitn(2, ' ').collect();
    let command = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "clear" | "c" => CommandResult::Clear,

        "quit" | "exit" | "q" => CommandResult::Exit,

        "saved" | "list" => CommandResult::ListSaved,

        "save" => {
            if args.is_empty() {
                CommandResult::Message(
                    "Usage: /save <number|url>\nNumbers refer to listing links in the last response.".to_string(),
                )
            } else {
                CommandResult::Save(args.to_string())
            }
        }

        "unsave" | "delete" => {
            if args.is_empty() {
                CommandResult::Message(
                    "Usage: /unsave <number|url>\nNumbers refer to the /saved list.".to_string(),
                )
            } else {
                CommandResult::Unsave(args.to_string())
            }
        }

        "contact" => ContactCommand::execute(args),

        "share" => {
            if args.is_empty() {
                CommandResult::Message("Usage: /share <number|url>".to_string())
            } else {
                CommandResult::Share(args.to_string())
            }
        }

        "compare" => CompareCommand::execute(args),

        "filter" | "f" => FilterCommand::execute(args),

        "voice" | "v" => {
            if args.is_empty() {
                CommandResult::Message("Usage: /voice <audio file>".to_string())
            } else {
                CommandResult::Voice(PathBuf::from(args))
            }
        }

        "personalized" | "p" => CommandResult::Personalized,

        _ => CommandResult::Unknown(command),
    })
}

/// Split command arguments, honoring double quotes
pub(crate) fn tokenize(args: &str) -> Vec<String> {
    let mut tokens = vec![];
    let mut current = String::new();
    let mut in_quotes = false;
    for c in args.chars() {
        match c {
            '"' => {
                if in_quotes {
                    tokens.push(std::mem::take(&mut current));
                }
                in_quotes = !in_quotes;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?          Show this help message
  /saved                 List saved properties
  /save <n|url>          Save a listing (n = numbered link in last response)
  /unsave <n|url>        Remove a saved listing
  /contact <n|url> [msg] Enquire with the listing agent
  /share <n|url>         Print a share link for a saved listing
  /compare <a> <b> [on <basis>]
                         Compare saved listings (guests get 3 uses)
  /filter k=v ...        Build a filtered search (see /filter)
  /voice <file>          Transcribe an audio file and send it
  /personalized, /p      Personalized pick from your history
  /clear, /c             Clear conversation history
  /quit, /exit, /q       Exit haven

Examples:
  /save 2                Save the second listing link in the last response
  /contact 1 When can I view?
  /compare 1 2 on price
  /filter area=Camden min=1500 max=2500 beds=2"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_honors_quotes() {
        assert_eq!(
            tokenize(r#""Flat in Camden" 2 on price"#),
            vec!["Flat in Camden", "2", "on", "price"]
        );
    }

    #[test]
    fn test_non_command_is_none() {
        assert!(execute_command("show me flats").is_none());
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(
            execute_command("/frobnicate"),
            Some(CommandResult::Unknown(cmd)) if cmd == "frobnicate"
        ));
    }

    #[test]
    fn test_save_requires_argument() {
        assert!(matches!(
            execute_command("/save"),
            Some(CommandResult::Message(_))
        ));
        assert!(matches!(
            execute_command("/save 2"),
            Some(CommandResult::Save(arg)) if arg == "2"
        ));
    }
}
