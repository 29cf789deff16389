//! /contact command - enquire with a listing agent

use super::CommandResult;

pub struct ContactCommand;

impl ContactCommand {
    /// Execute /contact - first token picks the listing, the rest is an
    /// optional message overriding the default enquiry text
    pub fn execute(args: &str) -> CommandResult {
        let args = args.trim();
        if args.is_empty() {
            return CommandResult::Message(
                "Usage: /contact <number|url> [message]\nNumbers refer to the /saved list."
                    .to_string(),
            );
        }

        let (target, message) = match args.split_once(' ') {
            Some((target, rest)) => (target.to_string(), Some(rest.trim().to_string())),
            None => (args.to_string(), None),
        };

        CommandResult::Contact { target, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_and_message() {
        let CommandResult::Contact { target, message } =
            ContactCommand::execute("2 When can I view?")
        else {
            panic!("expected contact");
        };
        assert_eq!(target, "2");
        assert_eq!(message.as_deref(), Some("When can I view?"));
    }

    #[test]
    fn test_message_is_optional() {
        let CommandResult::Contact { target, message } = ContactCommand::execute("1") else {
            panic!("expected contact");
        };
        assert_eq!(target, "1");
        assert!(message.is_none());
    }
}
