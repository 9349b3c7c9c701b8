//! Clients for the club's external collaborators.
//!
//! - `StoreClient`: the hosted row store and photo storage, behind the
//!   `Store` / `BlobStore` traits
//! - `Geocoder`: address search for new map pins
//!
//! Every store request carries the project API key. Failures surface as
//! `ApiError` values carrying the HTTP status and response body.

pub mod client;
pub mod error;
pub mod geocode;
pub mod store;

#[cfg(test)]
pub(crate) mod fake;

pub use client::StoreClient;
pub use error::ApiError;
pub use geocode::{AddressCandidate, Geocoder};
pub use store::{insert_as, select_as, BlobStore, Direction, Query, Store, Table};
