//! Plain-text views of club data.

use chrono::{DateTime, Local, Utc};

use burgerclub_core::api::AddressCandidate;
use burgerclub_core::map::MapPin;
use burgerclub_core::models::{
    FormConfig, GalleryPhoto, Member, RankedItem, RestaurantRequest, Suggestion,
};
use burgerclub_core::roster::{AttendeeSource, Roster};
use burgerclub_core::summary::{row_average, RatingSummary};
use burgerclub_core::utils::truncate_with_ellipsis;

/// Widest description shown in the rankings table.
const DETAILS_WIDTH: usize = 40;

fn local_date(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.with_timezone(&Local).format("%-m/%-d/%Y").to_string())
        .unwrap_or_default()
}

fn local_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.with_timezone(&Local).format("%-m/%-d/%Y %H:%M").to_string())
        .unwrap_or_default()
}

pub fn rankings(items: &[&RankedItem]) {
    if items.is_empty() {
        println!("No burgers found.");
        return;
    }
    println!(
        "{:>4}  {:>6}  {:<24} {:<42} {:>8}  {:<10}  {:<5}",
        "Rank", "Rating", "Restaurant", "Description", "Price", "Visited", "Id"
    );
    for item in items {
        println!(
            "{:>4}  {:>6}  {:<24} {:<42} {:>8}  {:<10}  {:<5}",
            item.rank,
            item.score_display(),
            truncate_with_ellipsis(&item.name, 21),
            truncate_with_ellipsis(&item.details, DETAILS_WIDTH - 3),
            item.price,
            item.visit_date,
            item.id
        );
    }
}

pub fn items_by_name(items: &[RankedItem]) {
    if items.is_empty() {
        println!("No burgers yet.");
        return;
    }
    for item in items {
        println!("#{:<3} {:<5} {}", item.rank, item.id, item.option_label());
        println!("           {} · {} · {}", item.price, item.place, item.visit_date);
    }
}

pub fn gallery(photos: &[GalleryPhoto]) {
    if photos.is_empty() {
        println!("No photos yet.");
        return;
    }
    for photo in photos {
        println!("[{}] {}", photo.id, photo.title());
        println!("      {}", photo.url);
    }
}

pub fn roster(item: &RankedItem, roster: &Roster) {
    println!("#{} {} ({} attended)", item.rank, item.label(), roster.len());
    if roster.is_empty() {
        println!("    nobody recorded");
        return;
    }
    let names: Vec<String> = roster
        .attendees
        .iter()
        .map(|a| match a.source {
            AttendeeSource::Placeholder { persisted: false } => format!("{}*", a.name),
            _ => a.name.clone(),
        })
        .collect();
    println!("    {}", names.join(", "));
}

fn map_view(center: (f64, f64), zoom: u8) -> String {
    format!("Map view: ({:.4}, {:.4}) zoom {}", center.0, center.1, zoom)
}

pub fn pins(pins: &[MapPin], center: (f64, f64), zoom: u8) {
    if pins.is_empty() {
        println!("No locations yet.");
        return;
    }
    println!("{}", map_view(center, zoom));
    println!();
    for pin in pins {
        match pin.coordinates {
            Some((lat, lng)) => println!("{} ({:.4}, {:.4})", pin.title(), lat, lng),
            None => println!("{} (no map pin)", pin.title()),
        }
        println!("    {}", pin.address());
        for item in &pin.entries {
            println!(
                "    {:>6}  {} · {} · {}",
                item.score_display(),
                item.details,
                item.price,
                item.visit_date
            );
        }
    }
}

pub fn form(form: Option<&FormConfig>) {
    match form {
        Some(f) if f.is_open => {
            println!("Status: OPEN");
            println!("Currently rating: {}", f.active_label_display());
        }
        Some(_) => println!("Status: CLOSED"),
        None => println!("Status: CLOSED (form not configured)"),
    }
}

pub fn rating_summary(summary: &RatingSummary) {
    if summary.is_empty() {
        println!("No ratings submitted yet.");
        return;
    }
    for group in summary.groups() {
        let votes = group.votes();
        println!(
            "{}  Avg: {:.2} ({} vote{})  Score: {:.2}",
            group.label,
            group.average,
            votes,
            if votes == 1 { "" } else { "s" },
            group.weighted
        );
        println!(
            "  Toppings: {:.1} | Bun: {:.1} | Doneness: {:.1} | Flavor: {:.1}",
            group.means.toppings, group.means.bun, group.means.doneness, group.means.flavor
        );
        println!(
            "  {:<16} {:>8} {:>5} {:>8} {:>6} {:>5}  {}",
            "Name", "Toppings", "Bun", "Doneness", "Flavor", "Avg", "Date"
        );
        for r in &group.ratings {
            let s = &r.subscores;
            println!(
                "  {:<16} {:>8} {:>5} {:>8} {:>6} {:>5.1}  {}",
                truncate_with_ellipsis(&r.rater, 13),
                s.toppings,
                s.bun,
                s.doneness,
                s.flavor,
                row_average(r),
                local_date(r.submitted_at)
            );
        }
        println!();
    }
}

pub fn members(members: &[Member]) {
    if members.is_empty() {
        println!("No members yet.");
        return;
    }
    for m in members {
        println!("{:<5} {}", m.id, m.name);
    }
}

pub fn suggestions(suggestions: &[Suggestion]) {
    if suggestions.is_empty() {
        println!("No suggestions yet.");
        return;
    }
    for s in suggestions {
        let mark = if s.addressed { "x" } else { " " };
        println!("[{}] {:<5} {} ({})", mark, s.id, s.name, local_time(s.created_at));
        println!("          {}", s.suggestion);
        if s.addressed {
            println!("          Addressed {}", local_time(s.addressed_at));
        }
    }
}

pub fn requests(requests: &[RestaurantRequest]) {
    if requests.is_empty() {
        println!("No restaurant requests yet.");
        return;
    }
    for r in requests {
        println!("{:<5} {} (from {}, {})", r.id, r.restaurant, r.name, local_time(r.created_at));
        if let Some(address) = &r.address {
            println!("      {}", address);
        }
        if let Some(notes) = &r.notes {
            println!("      {}", notes);
        }
    }
}

pub fn candidates(candidates: &[AddressCandidate]) {
    if candidates.is_empty() {
        println!("No addresses found.");
        return;
    }
    for (i, c) in candidates.iter().enumerate() {
        println!("{}. {}", i + 1, c.formatted);
        println!("   {} ({:.5}, {:.5})", c.detail_line(), c.lat, c.lon);
    }
}
