//! Client for the French national address API (Base Adresse Nationale).

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::{GeocodeOutcome, Geocoder};
use crate::models::GeoPoint;

pub const DEFAULT_BASE_URL: &str = "https://api-adresse.data.gouv.fr";

/// GeoJSON FeatureCollection returned by `/search/`
#[derive(Debug, Deserialize)]
struct SearchResponse {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// [longitude, latitude]
    coordinates: Vec<f64>,
}

impl SearchResponse {
    fn into_outcome(self) -> GeocodeOutcome {
        let Some(feature) = self.features.into_iter().next() else {
            return GeocodeOutcome::NoMatch;
        };

        match feature.geometry.coordinates.as_slice() {
            [lon, lat] if lon.is_finite() && lat.is_finite() => {
                GeocodeOutcome::Found(GeoPoint::new(*lat, *lon))
            }
            other => GeocodeOutcome::Unavailable(format!("invalid coordinates {:?}", other)),
        }
    }
}

/// Geocoder backed by api-adresse.data.gouv.fr
#[derive(Clone)]
pub struct BanGeocoder {
    client: Client,
    search_url: Url,
}

impl BanGeocoder {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let mut search_url = Url::parse(base_url)
            .with_context(|| format!("Invalid geocoder URL '{}'", base_url))?;
        // Append to any path prefix the base URL carries
        search_url
            .path_segments_mut()
            .map_err(|_| anyhow!("Geocoder URL '{}' cannot be a base", base_url))?
            .pop_if_empty()
            .push("search")
            .push("");

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        info!("Geocoding with {}", search_url);

        Ok(Self { client, search_url })
    }

    fn request_url(&self, address: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("limit", "1");
        url
    }
}

impl Geocoder for BanGeocoder {
    async fn geocode(&self, address: &str) -> GeocodeOutcome {
        let response = match self.client.get(self.request_url(address)).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Network error geocoding '{}': {}", address, e);
                return GeocodeOutcome::Unavailable(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Geocoder returned {} for '{}'", status, address);
            return GeocodeOutcome::Unavailable(format!("status {}", status));
        }

        let body: SearchResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!("Invalid geocoder response for '{}': {}", address, e);
                return GeocodeOutcome::Unavailable(e.to_string());
            }
        };

        let outcome = body.into_outcome();
        match &outcome {
            GeocodeOutcome::Found(point) => debug!("Geocoded '{}' to {}", address, point),
            GeocodeOutcome::NoMatch => warn!("No geocoding results for '{}'", address),
            GeocodeOutcome::Unavailable(reason) => {
                warn!("Unusable geocoder result for '{}': {}", address, reason)
            }
        }
        outcome
    }
}
