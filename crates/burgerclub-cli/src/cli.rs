use std::path::PathBuf;

use burgerclub_core::listing::SortMode;
use clap::{ArgAction, Args, Parser, Subcommand};

/// Command-line front end for the burger club: rankings, ratings,
/// attendance and the admin panel.
#[derive(Parser)]
#[command(name = "burgerclub", version = env!("CARGO_PKG_VERSION"), long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the ranked list
    Rankings {
        /// Case-insensitive filter over restaurant, description and location
        #[arg(short, long, default_value = "")]
        search: String,

        /// rank, rating-desc, rating-asc, price-asc, price-desc, date-desc, date-asc
        #[arg(long, default_value = "rank")]
        sort: SortMode,
    },

    /// List gallery photos, newest first
    Gallery,

    /// Show who attended each tasting
    Rosters {
        /// Only this burger
        #[arg(long)]
        item: Option<i64>,
    },

    /// List map pins grouped by address
    Map,

    /// Show whether the rating form is open
    Form,

    /// Rate the burger the form is open for
    Rate(RateArgs),

    /// Send the club a suggestion
    Suggest {
        #[arg(long)]
        name: String,
        text: String,
    },

    /// Ask the club to try a restaurant
    Request {
        #[arg(long)]
        name: String,
        #[arg(long)]
        restaurant: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// View or change connection settings
    Config {
        /// Backend base URL
        #[arg(long)]
        url: Option<String>,

        /// Save the API key to the OS keychain
        #[arg(long)]
        api_key: Option<String>,

        /// Remove the API key from the OS keychain
        #[arg(long)]
        forget_api_key: bool,

        /// Directory for daily log files
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// Admin panel
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args)]
pub struct RateArgs {
    /// Your name
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub toppings: f64,
    #[arg(long)]
    pub bun: f64,
    #[arg(long)]
    pub doneness: f64,
    #[arg(long)]
    pub flavor: f64,
    /// Optional photo to attach
    #[arg(long)]
    pub photo: Option<PathBuf>,
}

/// `--yes` may be given twice to skip both confirmation prompts.
#[derive(Args, Clone, Copy)]
pub struct ConfirmArgs {
    #[arg(short = 'y', long = "yes", action = ArgAction::Count)]
    pub yes: u8,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Unlock the admin panel for 30 minutes
    Login,

    /// Lock the admin panel
    Logout,

    /// Print the digest of a password (for the config file)
    Hash { password: String },

    /// Change the admin password
    Password,

    /// Open the rating form for a burger
    Open { item_id: i64 },

    /// Close the rating form
    Close,

    /// Add a burger to the rankings
    Add(AddArgs),

    /// Delete a burger from the rankings
    Delete {
        item_id: i64,
        #[command(flatten)]
        confirm: ConfirmArgs,
    },

    /// List burgers alphabetically with their ids
    Items,

    /// Search addresses for a map pin
    Geocode { query: String },

    /// Manage gallery photos
    #[command(subcommand)]
    Photos(PhotoCommand),

    /// Submitted ratings grouped by burger
    Ratings,

    /// Manage the member list
    #[command(subcommand)]
    Members(MemberCommand),

    /// Store the placeholder attendees rosters currently show
    Backfill,

    /// Manage suggestions
    #[command(subcommand)]
    Suggestions(SuggestionCommand),

    /// List restaurant requests
    Requests,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub restaurant: String,
    #[arg(long)]
    pub description: String,
    /// e.g. 18.5 or $18.50
    #[arg(long)]
    pub price: String,
    /// Visit date, YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub date: String,
    /// Address to search for the map pin
    #[arg(long)]
    pub address: String,
    /// Which search result to use (1-based)
    #[arg(long, default_value_t = 1)]
    pub pick: usize,
}

#[derive(Subcommand)]
pub enum PhotoCommand {
    /// List photos with their ids
    List,
    /// Upload photos for a burger
    Upload {
        item_id: i64,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        caption: Option<String>,
    },
    /// Delete a photo
    Delete {
        photo_id: i64,
        #[command(flatten)]
        confirm: ConfirmArgs,
    },
}

#[derive(Subcommand)]
pub enum MemberCommand {
    List,
    Add { name: String },
    Remove { member_id: i64 },
}

#[derive(Subcommand)]
pub enum SuggestionCommand {
    List,
    /// Mark addressed
    Done { id: i64 },
    /// Clear the addressed mark
    Undo { id: i64 },
    Delete {
        id: i64,
        #[command(flatten)]
        confirm: ConfirmArgs,
    },
}
