//! Command handlers. Each one runs a `Club` workflow and prints the result.

mod admin;
mod public;
mod prompt;
mod render;

use anyhow::Result;
use burgerclub_core::api::StoreClient;
use burgerclub_core::{Club, Config};

use crate::cli::Commands;

pub async fn dispatch(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Config {
            url,
            api_key,
            forget_api_key,
            log_dir,
        } => public::configure(config, url, api_key, forget_api_key, log_dir),
        Commands::Admin(cmd) => admin::run(cmd, &config).await,
        Commands::Rankings { search, sort } => {
            public::rankings(&connect(&config)?, &search, sort).await
        }
        Commands::Gallery => public::gallery(&connect(&config)?).await,
        Commands::Rosters { item } => public::rosters(&connect(&config)?, item).await,
        Commands::Map => public::map(&connect(&config)?, &config).await,
        Commands::Form => public::form(&connect(&config)?).await,
        Commands::Rate(args) => public::rate(&connect(&config)?, args).await,
        Commands::Suggest { name, text } => {
            public::suggest(&connect(&config)?, &name, &text).await
        }
        Commands::Request {
            name,
            restaurant,
            address,
            notes,
        } => public::request(&connect(&config)?, name, restaurant, address, notes).await,
    }
}

/// Build a club handle from the configured store URL and API key.
pub(crate) fn connect(config: &Config) -> Result<Club<StoreClient>> {
    let url = config.store_url()?;
    let api_key = config.resolve_api_key()?;
    let client = StoreClient::new(url, &api_key)?;
    Ok(Club::new(client, config))
}
