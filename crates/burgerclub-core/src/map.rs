//! Map pins: one pin per normalised address listing every burger there.

use std::collections::BTreeMap;

use crate::models::{BurgerLocation, RankedItem};

#[derive(Debug, Clone, PartialEq)]
pub struct MapPin {
    /// Normalised address shared by every entry
    pub address_key: String,
    pub coordinates: Option<(f64, f64)>,
    pub entries: Vec<RankedItem>,
}

impl MapPin {
    /// Restaurant name of the first entry, used as the pin title.
    pub fn title(&self) -> &str {
        self.entries.first().map(|i| i.name.as_str()).unwrap_or("")
    }

    pub fn address(&self) -> &str {
        self.entries.first().map(|i| i.place.as_str()).unwrap_or("")
    }

    pub fn is_placed(&self) -> bool {
        self.coordinates.is_some()
    }
}

pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Normalised address to coordinates, for locations that have both.
fn coordinate_table(locations: &[BurgerLocation]) -> Vec<(String, (f64, f64))> {
    locations
        .iter()
        .filter_map(|loc| {
            let key = normalize_address(&loc.location);
            let coords = loc.coordinates()?;
            (!key.is_empty()).then_some((key, coords))
        })
        .collect()
}

/// Exact address first, then the first entry where either address contains
/// the other.
fn lookup(table: &[(String, (f64, f64))], address: &str) -> Option<(f64, f64)> {
    table
        .iter()
        .find(|(key, _)| key == address)
        .or_else(|| {
            table
                .iter()
                .find(|(key, _)| address.contains(key.as_str()) || key.contains(address))
        })
        .map(|(_, coords)| *coords)
}

/// Group items by place and resolve coordinates. Items without a place are
/// skipped; places without coordinates come back with `coordinates: None`.
pub fn build_pins(items: &[RankedItem], locations: &[BurgerLocation]) -> Vec<MapPin> {
    let table = coordinate_table(locations);
    let mut grouped: BTreeMap<String, Vec<RankedItem>> = BTreeMap::new();
    for item in items {
        let key = normalize_address(&item.place);
        if key.is_empty() {
            continue;
        }
        grouped.entry(key).or_default().push(item.clone());
    }

    grouped
        .into_iter()
        .map(|(address_key, entries)| MapPin {
            coordinates: lookup(&table, &address_key),
            address_key,
            entries,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, place: &str) -> RankedItem {
        RankedItem {
            id,
            rank: id as u32,
            score: None,
            name: name.to_string(),
            details: String::new(),
            price: String::new(),
            place: place.to_string(),
            visit_date: String::new(),
        }
    }

    fn location(id: i64, address: &str, lat: Option<f64>, lng: Option<f64>) -> BurgerLocation {
        BurgerLocation {
            id,
            restaurant: String::new(),
            description: String::new(),
            location: address.to_string(),
            lat,
            lng,
        }
    }

    #[test]
    fn test_groups_by_normalised_address() {
        let items = vec![
            item(1, "Red Hook Tavern", "329 Van Brunt St, Brooklyn, NY 11231"),
            item(2, "Red Hook Tavern", " 329 van brunt st, brooklyn, ny 11231 "),
            item(3, "Nowhere", ""),
        ];
        let locations = vec![location(
            1,
            "329 Van Brunt St, Brooklyn, NY 11231",
            Some(40.678),
            Some(-74.012),
        )];
        let pins = build_pins(&items, &locations);
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].entries.len(), 2);
        assert_eq!(pins[0].coordinates, Some((40.678, -74.012)));
        assert_eq!(pins[0].title(), "Red Hook Tavern");
    }

    #[test]
    fn test_substring_fallback_and_unplaced() {
        let items = vec![
            item(1, "Emily", "East 3rd St, New York, NY 10009"),
            item(2, "Mystery", "1 Unknown Rd"),
        ];
        let locations = vec![
            location(1, "1 Unknown Rd", None, None),
            location(2, "Corner of East 3rd St, New York, NY 10009", Some(40.72), Some(-73.98)),
        ];
        let pins = build_pins(&items, &locations);
        let emily = pins.iter().find(|p| p.title() == "Emily").expect("pin");
        assert_eq!(emily.coordinates, Some((40.72, -73.98)));
        let mystery = pins.iter().find(|p| p.title() == "Mystery").expect("pin");
        assert!(!mystery.is_placed());
    }
}
