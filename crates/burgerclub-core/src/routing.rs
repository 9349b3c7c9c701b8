//! Attributing ratings to ranked items.
//!
//! Ratings carry the item id; the label string recorded beside it is only
//! consulted for legacy rows written before ids were stored. Labels that
//! more than one item could produce are treated as unresolvable.

use std::collections::{HashMap, HashSet};

use crate::models::{RankedItem, Rating};

#[derive(Debug, Clone, Default)]
pub struct ItemIndex {
    ids: HashSet<i64>,
    /// label -> item id, or `None` when two items share the label
    labels: HashMap<String, Option<i64>>,
}

impl ItemIndex {
    pub fn new(items: &[RankedItem]) -> Self {
        let mut index = Self::default();
        for item in items {
            index.ids.insert(item.id);
            let mut keys = vec![item.label(), item.name.trim().to_string()];
            if !item.details.is_empty() {
                keys.push(format!("{} — {}", item.name, item.details));
                keys.push(format!("{} ||| {}", item.name, item.details));
            }
            for key in keys {
                index.add_label(key, item.id);
            }
        }
        index
    }

    fn add_label(&mut self, key: String, id: i64) {
        let key = key.trim().to_string();
        if key.is_empty() {
            return;
        }
        self.labels
            .entry(key)
            .and_modify(|existing| {
                if *existing != Some(id) {
                    *existing = None;
                }
            })
            .or_insert(Some(id));
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// Resolve an item reference. A present id is authoritative: if it no
    /// longer names a current item the reference is dropped, not re-routed
    /// by label.
    pub fn resolve(&self, item_id: Option<i64>, label: &str) -> Option<i64> {
        match item_id {
            Some(id) => self.contains(id).then_some(id),
            None => self.labels.get(label.trim()).copied().flatten(),
        }
    }

    pub fn resolve_rating(&self, rating: &Rating) -> Option<i64> {
        self.resolve(rating.item_id, &rating.item_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, details: &str) -> RankedItem {
        RankedItem {
            id,
            rank: id as u32,
            score: None,
            name: name.to_string(),
            details: details.to_string(),
            price: String::new(),
            place: String::new(),
            visit_date: String::new(),
        }
    }

    #[test]
    fn test_id_wins_over_label() {
        let items = vec![item(1, "Emily", "Emmy burger"), item(2, "Au Cheval", "Double")];
        let index = ItemIndex::new(&items);
        assert_eq!(index.resolve(Some(2), "Emily — Emmy burger"), Some(2));
    }

    #[test]
    fn test_stale_id_is_not_rerouted_by_label() {
        let items = vec![item(1, "Emily", "Emmy burger")];
        let index = ItemIndex::new(&items);
        assert_eq!(index.resolve(Some(99), "Emily — Emmy burger"), None);
    }

    #[test]
    fn test_legacy_label_fallback() {
        let items = vec![item(1, "Emily", "Emmy burger"), item(2, "Au Cheval", "Double")];
        let index = ItemIndex::new(&items);
        assert_eq!(index.resolve(None, "Emily — Emmy burger"), Some(1));
        assert_eq!(index.resolve(None, "Au Cheval ||| Double"), Some(2));
        assert_eq!(index.resolve(None, " Au Cheval "), Some(2));
        assert_eq!(index.resolve(None, "Shake Shack"), None);
    }

    #[test]
    fn test_colliding_labels_are_unresolvable() {
        let long = "a".repeat(70);
        let items = vec![
            item(1, "Minetta Tavern", &format!("{}x", long)),
            item(2, "Minetta Tavern", &format!("{}y", long)),
        ];
        let index = ItemIndex::new(&items);
        // Truncated labels collide, and so does the bare name
        assert_eq!(index.resolve(None, &items[0].label()), None);
        assert_eq!(index.resolve(None, "Minetta Tavern"), None);
        // The untruncated pair is still unique
        assert_eq!(
            index.resolve(None, &format!("Minetta Tavern — {}x", long)),
            Some(1)
        );
        // Ids always work
        assert_eq!(index.resolve(Some(2), ""), Some(2));
    }
}
