//! Address lookup against the OpenStreetMap Nominatim geocoder.
//!
//! Used by the admin "add burger" flow to pick map coordinates. Results are
//! best-effort and never feed scoring or ranking.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::debug;

use super::client::{http_client, StoreClient, REQUEST_TIMEOUT_SECS};
use super::ApiError;

const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Nominatim returns at most this many candidates per query.
pub const MAX_CANDIDATES: usize = 5;

#[derive(Clone)]
pub struct Geocoder {
    client: Client,
    search_url: String,
    country_codes: String,
}

impl Geocoder {
    pub fn new(country_codes: &str) -> Result<Self> {
        let client = http_client(Duration::from_secs(REQUEST_TIMEOUT_SECS))?;
        Ok(Self::with_client(client, NOMINATIM_SEARCH_URL, country_codes))
    }

    /// Reuse the store client's connection pool and timeout.
    pub fn for_store(store: &StoreClient, country_codes: &str) -> Self {
        Self::with_client(store.http().clone(), NOMINATIM_SEARCH_URL, country_codes)
    }

    /// Share an existing connection pool, optionally against another endpoint.
    pub fn with_client(client: Client, search_url: &str, country_codes: &str) -> Self {
        Self {
            client,
            search_url: search_url.to_string(),
            country_codes: country_codes.to_string(),
        }
    }

    /// Search for up to five candidate addresses matching `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<AddressCandidate>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = MAX_CANDIDATES.to_string();
        let mut params = vec![
            ("q", query),
            ("format", "json"),
            ("addressdetails", "1"),
            ("limit", limit.as_str()),
        ];
        if !self.country_codes.is_empty() {
            params.push(("countrycodes", self.country_codes.as_str()));
        }

        let response = self
            .client
            .get(&self.search_url)
            .header(header::ACCEPT, "application/json")
            .query(&params)
            .send()
            .await
            .context("Failed to send geocoder request")?;

        let status = response.status();
        let text = response.text().await.context("Failed to read geocoder response")?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &text).into());
        }

        let places: Vec<NominatimPlace> =
            serde_json::from_str(&text).context("Failed to parse geocoder response")?;
        debug!(query, count = places.len(), "Geocoder response received");

        Ok(places
            .into_iter()
            .filter_map(AddressCandidate::from_place)
            .take(MAX_CANDIDATES)
            .collect())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

/// A geocoded address an admin can pick for a map pin.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressCandidate {
    pub lat: f64,
    pub lon: f64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub display_name: String,
    /// "592 Leonard Street, Brooklyn, NY 11222"
    pub formatted: String,
}

impl AddressCandidate {
    fn from_place(place: NominatimPlace) -> Option<Self> {
        let lat = place.lat.parse::<f64>().ok()?;
        let lon = place.lon.parse::<f64>().ok()?;
        let addr = &place.address;

        let street = [addr.house_number.as_deref(), addr.road.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let street = if street.is_empty() {
            place.display_name.split(',').next().unwrap_or("").trim().to_string()
        } else {
            street
        };

        let city = [&addr.city, &addr.town, &addr.village, &addr.hamlet]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_default();
        let borough = [&addr.suburb, &addr.neighbourhood]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_default();
        // NYC addresses read better with the borough than "City of New York"
        let city = if city.to_lowercase().contains("new york") && !borough.is_empty() {
            borough
        } else {
            city
        };

        let state = addr.state.as_deref().map(abbreviate_state).unwrap_or_default();
        let zip = addr.postcode.clone().unwrap_or_default();

        let state_zip = join_nonempty(&[state.as_str(), zip.as_str()], " ");
        let formatted = join_nonempty(&[street.as_str(), city.as_str(), state_zip.as_str()], ", ");

        Some(Self {
            lat,
            lon,
            street,
            city,
            state,
            zip,
            display_name: place.display_name,
            formatted,
        })
    }

    /// Secondary line for a candidate list: "Brooklyn, NY, 11222".
    pub fn detail_line(&self) -> String {
        join_nonempty(&[self.city.as_str(), self.state.as_str(), self.zip.as_str()], ", ")
    }
}

fn join_nonempty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(sep)
}

const US_STATES: &[(&str, &str)] = &[
    ("alabama", "AL"), ("alaska", "AK"), ("arizona", "AZ"), ("arkansas", "AR"),
    ("california", "CA"), ("colorado", "CO"), ("connecticut", "CT"), ("delaware", "DE"),
    ("district of columbia", "DC"), ("florida", "FL"), ("georgia", "GA"), ("hawaii", "HI"),
    ("idaho", "ID"), ("illinois", "IL"), ("indiana", "IN"), ("iowa", "IA"),
    ("kansas", "KS"), ("kentucky", "KY"), ("louisiana", "LA"), ("maine", "ME"),
    ("maryland", "MD"), ("massachusetts", "MA"), ("michigan", "MI"), ("minnesota", "MN"),
    ("mississippi", "MS"), ("missouri", "MO"), ("montana", "MT"), ("nebraska", "NE"),
    ("nevada", "NV"), ("new hampshire", "NH"), ("new jersey", "NJ"), ("new mexico", "NM"),
    ("new york", "NY"), ("north carolina", "NC"), ("north dakota", "ND"), ("ohio", "OH"),
    ("oklahoma", "OK"), ("oregon", "OR"), ("pennsylvania", "PA"), ("rhode island", "RI"),
    ("south carolina", "SC"), ("south dakota", "SD"), ("tennessee", "TN"), ("texas", "TX"),
    ("utah", "UT"), ("vermont", "VT"), ("virginia", "VA"), ("washington", "WA"),
    ("west virginia", "WV"), ("wisconsin", "WI"), ("wyoming", "WY"),
];

/// Two-letter postal code for a US state name; anything else is returned as-is.
pub fn abbreviate_state(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    US_STATES
        .iter()
        .find(|(state, _)| *state == lower)
        .map(|(_, code)| code.to_string())
        .unwrap_or_else(|| name.to_string())
}
