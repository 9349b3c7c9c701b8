//! Core library for the burger club site.
//!
//! Ratings are aggregated into a weighted score per burger and the ranked
//! list is recomputed after every change. Rosters of who attended each
//! tasting are merged from explicit attendance, ratings and historical
//! headcounts. Everything lives in a hosted row store reached through the
//! [`api::Store`] trait; [`club::Club`] exposes each user action.

pub mod api;
pub mod auth;
pub mod club;
pub mod config;
pub mod error;
pub mod listing;
pub mod map;
pub mod models;
pub mod ranking;
pub mod roster;
pub mod routing;
pub mod state;
pub mod summary;
pub mod utils;

pub use club::{Club, Confirmation};
pub use config::Config;
pub use error::ClubError;
pub use state::AppState;
