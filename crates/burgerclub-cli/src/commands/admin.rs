use anyhow::{bail, Result};
use burgerclub_core::api::{Geocoder, StoreClient};
use burgerclub_core::auth::{hash_password, AdminSession};
use burgerclub_core::club::NewItem;
use burgerclub_core::{Club, Config};
use tracing::warn;

use super::public::read_photo;
use super::{connect, prompt, render};
use crate::cli::{AddArgs, AdminCommand, MemberCommand, PhotoCommand, SuggestionCommand};

fn session(config: &Config) -> Result<AdminSession> {
    let mut session = AdminSession::new(config.cache_dir()?);
    if let Err(e) = session.load() {
        warn!(error = %e, "Ignoring unreadable admin session");
    }
    Ok(session)
}

/// Refuse unless a login within the last 30 minutes matches the current
/// admin password.
async fn require_admin(club: &Club<StoreClient>, config: &Config) -> Result<()> {
    let session = session(config)?;
    if session.is_valid_for(&club.admin_hash().await) {
        Ok(())
    } else {
        bail!("Admin panel is locked. Run `burgerclub admin login` first.")
    }
}

pub async fn run(command: AdminCommand, config: &Config) -> Result<()> {
    // Commands that need neither the store nor an unlocked session
    match command {
        AdminCommand::Hash { password } => {
            println!("{}", hash_password(&password));
            return Ok(());
        }
        AdminCommand::Logout => {
            session(config)?.clear()?;
            println!("Admin panel locked.");
            return Ok(());
        }
        AdminCommand::Geocode { query } => {
            let geocoder = Geocoder::new(&config.geocoder_country_codes)?;
            render::candidates(&geocoder.search(&query).await?);
            return Ok(());
        }
        _ => {}
    }

    let club = connect(config)?;
    if let AdminCommand::Login = command {
        let password = prompt::password("Admin password: ")?;
        let hash = club.admin_login(&password).await?;
        session(config)?.start(hash)?;
        println!("Admin unlocked for 30 minutes.");
        return Ok(());
    }

    require_admin(&club, config).await?;
    match command {
        AdminCommand::Password => {
            let new = prompt::password("New password: ")?;
            let confirm = prompt::password("Confirm password: ")?;
            let hash = club.change_password(&new, &confirm).await?;
            session(config)?.start(hash)?;
            println!("Password changed!");
        }
        AdminCommand::Open { item_id } => {
            let form = club.open_form(item_id).await?;
            println!("Form opened for \"{}\"!", form.active_label_display());
        }
        AdminCommand::Close => {
            club.close_form().await?;
            println!("Form closed.");
        }
        AdminCommand::Add(args) => add(&club, config, args).await?,
        AdminCommand::Delete { item_id, confirm } => {
            let item = club
                .items_by_name()
                .await?
                .into_iter()
                .find(|i| i.id == item_id);
            let Some(item) = item else {
                bail!("No burger with id {}", item_id);
            };
            let confirmation = prompt::confirm_twice(
                confirm,
                &format!("Are you sure you want to delete #{} {}?", item.rank, item.name),
                &format!(
                    "FINAL WARNING: This will permanently delete #{} {}. Are you absolutely sure?",
                    item.rank, item.name
                ),
            )?;
            if !confirmation.is_complete() {
                println!("Cancelled.");
                return Ok(());
            }
            let report = club.delete_item(item_id, confirmation).await?;
            println!("Burger deleted successfully.");
            if !report.is_clean() {
                println!(
                    "{} rank update(s) failed; they will catch up on the next change.",
                    report.failed.len()
                );
            }
        }
        AdminCommand::Items => render::items_by_name(&club.items_by_name().await?),
        AdminCommand::Photos(cmd) => photos(&club, cmd).await?,
        AdminCommand::Ratings => render::rating_summary(&club.rating_summary().await?),
        AdminCommand::Members(cmd) => members(&club, cmd).await?,
        AdminCommand::Backfill => {
            let report = club.backfill_placeholders().await?;
            println!("Stored {} placeholder attendee(s).", report.created.len());
            if !report.failed.is_empty() {
                bail!("{} placeholder(s) could not be stored", report.failed.len());
            }
        }
        AdminCommand::Suggestions(cmd) => suggestions(&club, cmd).await?,
        AdminCommand::Requests => render::requests(&club.restaurant_requests().await?),
        AdminCommand::Hash { .. }
        | AdminCommand::Logout
        | AdminCommand::Geocode { .. }
        | AdminCommand::Login => {}
    }
    Ok(())
}

async fn add(club: &Club<StoreClient>, config: &Config, args: AddArgs) -> Result<()> {
    let geocoder = Geocoder::for_store(club.store(), &config.geocoder_country_codes);
    let candidates = geocoder.search(&args.address).await?;
    let Some(chosen) = args.pick.checked_sub(1).and_then(|i| candidates.get(i)) else {
        render::candidates(&candidates);
        bail!("Pick one of the addresses above with --pick");
    };
    println!("Using {}", chosen.formatted);

    let added = club
        .add_item(NewItem {
            restaurant: args.restaurant,
            description: args.description,
            price: args.price,
            location: chosen.formatted.clone(),
            visit_date: args.date,
            coordinates: Some((chosen.lat, chosen.lon)),
        })
        .await?;
    println!(
        "Burger added to the rankings as #{} (id {}).",
        added.item.rank, added.item.id
    );
    Ok(())
}

async fn photos(club: &Club<StoreClient>, command: PhotoCommand) -> Result<()> {
    match command {
        PhotoCommand::List => render::gallery(&club.gallery().await?),
        PhotoCommand::Upload {
            item_id,
            files,
            caption,
        } => {
            let uploads = files
                .iter()
                .map(|path| read_photo(path))
                .collect::<Result<Vec<_>>>()?;
            let added = club.upload_photos(item_id, uploads, caption.as_deref()).await?;
            println!("{} photo(s) uploaded!", added.len());
        }
        PhotoCommand::Delete { photo_id, confirm } => {
            let confirmation = prompt::confirm_twice(
                confirm,
                &format!("Delete photo {}?", photo_id),
                "This cannot be undone. Delete it?",
            )?;
            if !confirmation.is_complete() {
                println!("Cancelled.");
                return Ok(());
            }
            club.delete_photo(photo_id, confirmation).await?;
            println!("Photo deleted.");
        }
    }
    Ok(())
}

async fn members(club: &Club<StoreClient>, command: MemberCommand) -> Result<()> {
    match command {
        MemberCommand::List => render::members(&club.members().await?),
        MemberCommand::Add { name } => {
            let member = club.add_member(&name).await?;
            println!("Added {} (id {}).", member.name, member.id);
        }
        MemberCommand::Remove { member_id } => {
            club.remove_member(member_id).await?;
            println!("Member removed.");
        }
    }
    Ok(())
}

async fn suggestions(club: &Club<StoreClient>, command: SuggestionCommand) -> Result<()> {
    match command {
        SuggestionCommand::List => render::suggestions(&club.suggestions().await?),
        SuggestionCommand::Done { id } => {
            club.set_suggestion_addressed(id, true).await?;
            println!("Marked addressed.");
        }
        SuggestionCommand::Undo { id } => {
            club.set_suggestion_addressed(id, false).await?;
            println!("Marked unaddressed.");
        }
        SuggestionCommand::Delete { id, confirm } => {
            let confirmation = prompt::confirm_twice(
                confirm,
                &format!("Delete suggestion {}?", id),
                "This cannot be undone. Delete it?",
            )?;
            if !confirmation.is_complete() {
                println!("Cancelled.");
                return Ok(());
            }
            club.delete_suggestion(id, confirmation).await?;
            println!("Suggestion deleted.");
        }
    }
    Ok(())
}
