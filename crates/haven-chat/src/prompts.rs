//! Canned query text the client submits on the user's behalf.
//!
//! The backend keys behavior off these exact phrasings, so they are built
//! here rather than scattered through the UI.

/// Query sent by the personalized-property operation
pub const PERSONALIZED_PROMPT: &str =
    "Show me a very personalized single property based on my previous questions";

/// Default enquiry message for contact-agent
pub const DEFAULT_CONTACT_MESSAGE: &str = "I am interested in viewing this property";

/// Starter queries offered on the welcome screen
pub const EXAMPLE_PROMPTS: [&str; 5] = [
    "Find me charming homes in low-crime neighborhoods.",
    "I have a dog, so show me cozy homes near parks.",
    "Show me properties that feature a bathtub.",
    "I'm a gym enthusiast, so find me properties with easy access to fitness facilities.",
    "I want to live near my friends. Show me homes for both of us in the same neighborhood.",
];

/// Query for a property deep link (`--property <id>`)
pub fn property_prompt(id: &str) -> String {
    format!("Show me the property with id {id}")
}

/// Comparison query over the saved properties, optionally on a stated basis
pub fn compare_prompt(names: &[String], basis: Option<&str>) -> String {
    let list = names
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ");
    match basis {
        Some(basis) => format!("Compare these properties {list} on basis of their {basis}"),
        None => format!("Compare these properties {list}"),
    }
}

/// Query built from a stored search handoff
pub fn search_handoff_prompt(
    location: &str,
    budget: &str,
    occupants: &str,
    move_in_date: &str,
) -> String {
    format!(
        "Find me rental properties in {location} within the budget of {budget} \
         allowing the occupancy of {occupants} with the availability to move in on {move_in_date}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_prompt() {
        assert_eq!(
            property_prompt("1bD2"),
            "Show me the property with id 1bD2"
        );
    }

    #[test]
    fn test_compare_prompt_quotes_each_name() {
        let names = vec!["Flat A".to_string(), "Flat B".to_string()];
        assert_eq!(
            compare_prompt(&names, None),
            r#"Compare these properties "Flat A", "Flat B""#
        );
    }

    #[test]
    fn test_compare_prompt_with_basis() {
        let names = vec!["Flat A".to_string()];
        assert_eq!(
            compare_prompt(&names, Some("price and location")),
            r#"Compare these properties "Flat A" on basis of their price and location"#
        );
    }

    #[test]
    fn test_search_handoff_prompt() {
        assert_eq!(
            search_handoff_prompt("Hackney", "£2000", "2 adults", "2026-10-01"),
            "Find me rental properties in Hackney within the budget of £2000 \
             allowing the occupancy of 2 adults with the availability to move in on 2026-10-01"
        );
    }
}
