use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use burgerclub_core::api::StoreClient;
use burgerclub_core::auth::CredentialStore;
use burgerclub_core::club::{
    content_type_for, PhotoUpload, RatingSubmission, RestaurantRequestInput,
};
use burgerclub_core::config::API_KEY_ENV;
use burgerclub_core::listing::SortMode;
use burgerclub_core::models::Subscores;
use burgerclub_core::{Club, Config};

use super::render;
use crate::cli::RateArgs;

pub async fn rankings(club: &Club<StoreClient>, search: &str, sort: SortMode) -> Result<()> {
    let items = club.rankings(search, sort).await?;
    let rows: Vec<_> = items.iter().collect();
    render::rankings(&rows);
    Ok(())
}

pub async fn gallery(club: &Club<StoreClient>) -> Result<()> {
    render::gallery(&club.gallery().await?);
    Ok(())
}

pub async fn rosters(club: &Club<StoreClient>, only: Option<i64>) -> Result<()> {
    let state = club.load_state().await?;
    let rosters = state.rosters_for(only);
    if rosters.is_empty() {
        match only {
            Some(id) => println!("No attendance data for burger {}.", id),
            None => println!("No burgers yet."),
        }
        return Ok(());
    }

    let mut pending = false;
    for (item, roster) in rosters {
        pending |= roster.pending_placeholders().next().is_some();
        render::roster(item, roster);
    }
    if pending {
        println!();
        println!("* placeholder not stored yet; run `burgerclub admin backfill`");
    }
    Ok(())
}

pub async fn map(club: &Club<StoreClient>, config: &Config) -> Result<()> {
    render::pins(&club.map_pins().await?, config.map_center, config.map_zoom);
    Ok(())
}

pub async fn form(club: &Club<StoreClient>) -> Result<()> {
    render::form(club.form_status().await?.as_ref());
    Ok(())
}

pub(super) fn read_photo(path: &Path) -> Result<PhotoUpload> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    Ok(PhotoUpload {
        content_type: content_type_for(&file_name).to_string(),
        file_name,
        bytes,
    })
}

pub async fn rate(club: &Club<StoreClient>, args: RateArgs) -> Result<()> {
    let subscores = Subscores::new(args.toppings, args.bun, args.doneness, args.flavor)?;
    let photo = args.photo.as_deref().map(read_photo).transpose()?;
    let with_photo = photo.is_some();
    let outcome = club
        .submit_rating(RatingSubmission {
            rater: args.name,
            subscores,
            photo,
        })
        .await?;

    println!("Rating submitted! Thanks for your vote.");
    if with_photo && outcome.photo_url.is_none() {
        println!("The photo could not be uploaded; the rating was saved without it.");
    }
    if let Some(score) = outcome.recompute.score {
        println!("{} now scores {:.2}.", outcome.rating.item_label, score);
    }
    if !outcome.recompute.ranks.is_clean() || !outcome.recompute.score_saved {
        println!("Some rankings could not be updated; they will catch up on the next change.");
    }
    Ok(())
}

pub async fn suggest(club: &Club<StoreClient>, name: &str, text: &str) -> Result<()> {
    club.submit_suggestion(name, text).await?;
    println!("Thanks for the suggestion!");
    Ok(())
}

pub async fn request(
    club: &Club<StoreClient>,
    name: String,
    restaurant: String,
    address: String,
    notes: String,
) -> Result<()> {
    let request = club
        .request_restaurant(RestaurantRequestInput {
            name,
            restaurant,
            address,
            notes,
        })
        .await?;
    println!("Thanks! We'll look into {}.", request.restaurant);
    Ok(())
}

pub fn configure(
    mut config: Config,
    url: Option<String>,
    api_key: Option<String>,
    forget_api_key: bool,
    log_dir: Option<PathBuf>,
) -> Result<()> {
    let mut changed = false;
    if let Some(url) = url {
        config.store_url = Some(url);
        changed = true;
    }
    if let Some(dir) = log_dir {
        config.log_dir = Some(dir);
        changed = true;
    }
    if let Some(key) = api_key {
        CredentialStore::store_api_key(&key)?;
        println!("API key saved to the keychain.");
    }
    if forget_api_key {
        CredentialStore::delete_api_key()?;
        println!("API key removed from the keychain.");
    }
    if changed {
        // Keys from the environment never go into the file
        if std::env::var(API_KEY_ENV).is_ok() {
            config.api_key = None;
        }
        config.save()?;
        println!("Saved {}", Config::config_path()?.display());
    }

    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("(set)".to_string());
    }
    println!("{}", serde_json::to_string_pretty(&shown)?);
    println!(
        "API key in keychain: {}",
        if CredentialStore::has_api_key() { "yes" } else { "no" }
    );
    Ok(())
}
