//! /saved command - render and resolve the saved-listings list

use haven_api::SavedProperty;

pub struct SavedCommand;

impl SavedCommand {
    /// Format the saved list for display, most recently saved first
    pub fn format_list(properties: &[SavedProperty]) -> String {
        if properties.is_empty() {
            return "No saved properties yet. Use /save <n> on a response with listing links."
                .to_string();
        }

        let mut out = String::from("Saved properties:\n");
        for (i, p) in properties.iter().enumerate() {
            let contacted = if p.contacted { " (contacted)" } else { "" };
            out.push_str(&format!("  {}. {}{}\n     {}\n", i + 1, p.name, contacted, p.url));
        }
        out.push_str("\n/contact <n>, /share <n>, /unsave <n>, /compare <n> <n>");
        out
    }

    /// Resolve a command target against the saved list.
    ///
    /// A 1-based number picks by position; otherwise match by exact URL,
    /// then by case-insensitive name.
    pub fn resolve<'a>(target: &str, properties: &'a [SavedProperty]) -> Option<&'a SavedProperty> {
        if let Ok(n) = target.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| properties.get(i));
        }
        if let Some(p) = properties.iter().find(|p| p.url == target) {
            return Some(p);
        }
        let lower = target.to_lowercase();
        properties
            .iter()
            .find(|p| p.name.to_lowercase().contains(&lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(name: &str, url: &str) -> SavedProperty {
        SavedProperty {
            name: name.to_string(),
            url: url.to_string(),
            contacted: false,
            property_tag: "tag-1".to_string(),
        }
    }

    #[test]
    fn test_resolve_by_number_is_one_based() {
        let list = vec![saved("Flat A", "https://a.test"), saved("Flat B", "https://b.test")];
        assert_eq!(SavedCommand::resolve("2", &list).map(|p| p.name.as_str()), Some("Flat B"));
        assert!(SavedCommand::resolve("0", &list).is_none());
        assert!(SavedCommand::resolve("3", &list).is_none());
    }

    #[test]
    fn test_resolve_by_url_then_name() {
        let list = vec![saved("Garden flat in Camden", "https://a.test")];
        assert!(SavedCommand::resolve("https://a.test", &list).is_some());
        assert!(SavedCommand::resolve("camden", &list).is_some());
        assert!(SavedCommand::resolve("brixton", &list).is_none());
    }

    #[test]
    fn test_format_lists_positions() {
        let list = vec![saved("Flat A", "https://a.test")];
        let text = SavedCommand::format_list(&list);
        assert!(text.contains("1. Flat A"));
        assert!(text.contains("https://a.test"));
    }
}
