//! /compare command - compare saved listings

use super::{tokenize, CommandResult};

pub struct CompareCommand;

impl CompareCommand {
    /// Execute /compare - items are saved-list numbers or quoted names,
    /// with an optional `on <basis>` tail
    pub fn execute(args: &str) -> CommandResult {
        let tokens = tokenize(args);

        let mut items = vec![];
        let mut basis: Option<String> = None;
        let mut iter = tokens.into_iter().peekable();
        while let Some(token) = iter.next() {
            if token == "on" {
                let rest: Vec<String> = iter.collect();
                if !rest.is_empty() {
                    basis = Some(rest.join(" "));
                }
                break;
            }
            items.push(token);
        }

        if items.len() < 2 {
            return CommandResult::Message(
                "Usage: /compare <a> <b> [...] [on <basis>]\nItems are /saved numbers or quoted names.".to_string(),
            );
        }

        CommandResult::Compare { items, basis }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_items_and_basis() {
        let CommandResult::Compare { items, basis } = CompareCommand::execute("1 2 on price") else {
            panic!("expected compare");
        };
        assert_eq!(items, vec!["1", "2"]);
        assert_eq!(basis.as_deref(), Some("price"));
    }

    #[test]
    fn test_basis_is_optional() {
        let CommandResult::Compare { items, basis } =
            CompareCommand::execute(r#""Flat A" "Flat B""#)
        else {
            panic!("expected compare");
        };
        assert_eq!(items, vec!["Flat A", "Flat B"]);
        assert!(basis.is_none());
    }

    #[test]
    fn test_needs_at_least_two_items() {
        assert!(matches!(
            CompareCommand::execute("1"),
            CommandResult::Message(_)
        ));
    }
}
