//! Terminal presentation for the catalog: search filtering, tree cards and
//! notification rendering.

use std::fmt::Write as _;

use crate::client::{Notification, Notifier, Variant};
use crate::types::Tree;

pub const NO_MATCHES: &str = "No matches found for your search term.";
pub const EMPTY_FOREST: &str = "Your forest is empty. Start planting today!";

/// Case-insensitive substring match on common name, scientific name and
/// location. A blank term matches every tree.
pub fn matches_search(tree: &Tree, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    tree.common_name.to_lowercase().contains(&needle)
        || tree
            .scientific_name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(&needle))
        || tree.location.to_lowercase().contains(&needle)
}

pub fn filter_trees<'a>(trees: &'a [Tree], term: &str) -> Vec<&'a Tree> {
    trees.iter().filter(|tree| matches_search(tree, term)).collect()
}

pub fn render_card(tree: &Tree) -> String {
    let mut out = String::new();
    let star = if tree.is_favorite { " ★" } else { "" };
    let _ = writeln!(out, "#{} {}{}", tree.id, tree.common_name, star);
    if let Some(name) = &tree.scientific_name {
        let _ = writeln!(out, "   {}", name);
    }
    let _ = writeln!(out, "   📍 {}", tree.location);
    if let Some(height) = tree.height {
        let _ = writeln!(out, "   📏 {}m tall", height);
    }
    if let Some(description) = &tree.description {
        let _ = writeln!(out, "   {}", description);
    }
    let _ = writeln!(out, "   planted {}", tree.created_at.format("%Y-%m-%d %H:%M"));
    out
}

/// Renders the filtered list, or the matching empty state.
pub fn render_list(trees: &[Tree], term: Option<&str>) -> String {
    let term = term.unwrap_or("");
    let visible = filter_trees(trees, term);
    if visible.is_empty() {
        return if term.trim().is_empty() {
            EMPTY_FOREST.to_string()
        } else {
            NO_MATCHES.to_string()
        };
    }
    visible
        .into_iter()
        .map(render_card)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_notification(notification: &Notification) -> String {
    let marker = match notification.variant {
        Variant::Default => "✅",
        Variant::Destructive => "❌",
    };
    format!(
        "{} {}: {}",
        marker, notification.title, notification.description
    )
}

/// Prints notifications to stderr so stdout stays clean for data.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", render_notification(&notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tree(id: i64, common: &str, scientific: Option<&str>, location: &str) -> Tree {
        Tree {
            id,
            common_name: common.to_string(),
            scientific_name: scientific.map(str::to_string),
            location: location.to_string(),
            height: None,
            description: None,
            is_favorite: false,
            created_at: Utc.with_ymd_and_hms(2024, 4, 2, 9, 30, 0).unwrap(),
        }
    }

    fn grove() -> Vec<Tree> {
        vec![
            tree(1, "Coast Redwood", Some("Sequoia sempervirens"), "Muir Woods"),
            tree(2, "Japanese Cherry", Some("Prunus serrulata"), "Botanical Garden"),
            tree(3, "Live Oak", None, "Savannah Square"),
        ]
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let trees = grove();
        let ids = |term| {
            filter_trees(&trees, term)
                .iter()
                .map(|t| t.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids("oak"), vec![3]);
        assert_eq!(ids("SEQUOIA"), vec![1]);
        assert_eq!(ids("garden"), vec![2]);
        assert_eq!(ids(""), vec![1, 2, 3]);
        assert_eq!(ids("   "), vec![1, 2, 3]);
        assert!(ids("baobab").is_empty());
    }

    #[test]
    fn empty_states_depend_on_search_term() {
        assert_eq!(render_list(&[], None), EMPTY_FOREST);
        assert_eq!(render_list(&grove(), Some("baobab")), NO_MATCHES);
    }

    #[test]
    fn card_shows_optional_fields_only_when_present() {
        let mut oak = tree(9, "Oak", None, "Yard");
        let plain = render_card(&oak);
        assert!(plain.starts_with("#9 Oak\n"));
        assert!(!plain.contains("tall"));

        oak.height = Some(10.0);
        oak.is_favorite = true;
        oak.description = Some("Old and wide".to_string());
        let full = render_card(&oak);
        assert!(full.contains("★"));
        assert!(full.contains("10m tall"));
        assert!(full.contains("Old and wide"));
        assert!(full.contains("planted 2024-04-02 09:30"));
    }

    #[test]
    fn notification_marks_failures() {
        let ok = render_notification(&Notification::success("Tree Removed", "gone"));
        assert!(ok.starts_with("✅ Tree Removed"));
        let bad = render_notification(&Notification::failure("Error", "Tree not found"));
        assert_eq!(bad, "❌ Error: Tree not found");
    }
}
