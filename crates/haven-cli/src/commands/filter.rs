//! /filter command - structured search built from key=value arguments

use super::{tokenize, CommandResult};
use haven_chat::FilterDraft;

pub struct FilterCommand;

impl FilterCommand {
    /// Execute /filter - accumulate key=value pairs and bare flags into a
    /// draft, then submit it as a single search prompt
    pub fn execute(args: &str) -> CommandResult {
        if args.trim().is_empty() {
            return CommandResult::Message(usage());
        }

        let mut draft = FilterDraft::default();
        for token in tokenize(args) {
            match token.split_once('=') {
                Some((key, value)) => match key {
                    "area" => draft.area = Some(value.to_string()),
                    "close-to" | "close_to" => draft.close_to = Some(value.to_string()),
                    "min" | "min-price" => match value.parse() {
                        Ok(v) => draft.min_price = Some(v),
                        Err(_) => {
                            return CommandResult::Message(format!(
                                "'{value}' is not a price\n\n{}",
                                usage()
                            ));
                        }
                    },
                    "max" | "max-price" => match value.parse() {
                        Ok(v) => draft.max_price = Some(v),
                        Err(_) => {
                            return CommandResult::Message(format!(
                                "'{value}' is not a price\n\n{}",
                                usage()
                            ));
                        }
                    },
                    "beds" | "bedrooms" => match value.parse() {
                        Ok(v) => draft.bedrooms = Some(v),
                        Err(_) => {
                            return CommandResult::Message(format!(
                                "'{value}' is not a bedroom count\n\n{}",
                                usage()
                            ));
                        }
                    },
                    "furnishing" => draft.furnishing = Some(value.to_string()),
                    "postcode" => draft.postcode = Some(value.to_string()),
                    _ => {
                        return CommandResult::Message(format!(
                            "Unknown filter key '{key}'\n\n{}",
                            usage()
                        ));
                    }
                },
                None => match token.as_str() {
                    "bills" => draft.bills_included = true,
                    "low-crime" | "crime" => draft.low_crime_rate = true,
                    "windows" => draft.big_windows = true,
                    "quiet" => draft.quiet_neighbourhood = true,
                    other => {
                        return CommandResult::Message(format!(
                            "Unknown filter flag '{other}'\n\n{}",
                            usage()
                        ));
                    }
                },
            }
        }

        match draft.to_prompt() {
            Ok(prompt) => CommandResult::Prompt(prompt),
            Err(e) => CommandResult::Message(format!("{}\n\n{}", e.user_message(), usage())),
        }
    }
}

fn usage() -> String {
    r#"Usage: /filter key=value ... [flags]
  Keys:  area, close-to, min, max, beds, furnishing, postcode
  Flags: bills, low-crime, windows, quiet
  Example: /filter area="Swiss Cottage" min=1500 max=2500 beds=2 bills quiet"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_prompt_from_pairs_and_flags() {
        let result = FilterCommand::execute("furnishing=furnished area=Camden min=1000 max=2000 bills");
        let CommandResult::Prompt(prompt) = result else {
            panic!("expected prompt");
        };
        assert_eq!(
            prompt,
            "Show furnished properties near Camden minimum price 1000 maximum price 2000 bills included"
        );
    }

    #[test]
    fn test_quoted_values_keep_spaces() {
        let result = FilterCommand::execute(r#"area="Swiss Cottage""#);
        let CommandResult::Prompt(prompt) = result else {
            panic!("expected prompt");
        };
        assert_eq!(prompt, "Show properties near Swiss Cottage");
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let result = FilterCommand::execute("min=3000 max=1000");
        assert!(matches!(result, CommandResult::Message(_)));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = FilterCommand::execute("colour=blue");
        assert!(matches!(result, CommandResult::Message(_)));
    }
}
