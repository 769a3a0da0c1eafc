// ============================
// tripmate-backend-lib/src/places.rs
// ============================
//! Outbound places lookup.
//!
//! One GET against a third-party nearby-search endpoint with fixed query
//! parameters, reshaped into [`HotelOffer`]s with a mock price. The photo
//! URL is built from the entry's photo reference and the same API key; the
//! image itself is never fetched server-side. There is no timeout and no
//! retry: callers log a failure and move on.

use rand::Rng;
use serde::Deserialize;

use tripmate_common::{GeoPoint, HotelOffer};

use crate::config::PlacesSettings;
use crate::error::AppError;

/// Client for the nearby-lodging lookup.
pub struct PlacesClient {
    http: reqwest::Client,
    settings: PlacesSettings,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    results: Vec<PlaceEntry>,
}

#[derive(Debug, Deserialize)]
struct PlaceEntry {
    name: String,
    rating: Option<f64>,
    geometry: Geometry,
    vicinity: Option<String>,
    #[serde(default)]
    photos: Vec<PlacePhoto>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: GeoPoint,
}

#[derive(Debug, Deserialize)]
struct PlacePhoto {
    photo_reference: String,
}

impl PlacesClient {
    pub fn new(settings: PlacesSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Fetch nearby lodging and reshape it into offers.
    ///
    /// # Errors
    /// Network failures, non-2xx statuses and unparseable bodies all come
    /// back as [`AppError::Places`].
    pub async fn nearby_lodging(&self) -> Result<Vec<HotelOffer>, AppError> {
        let response: NearbyResponse = self
            .http
            .get(&self.settings.nearby_url)
            .query(&[
                ("location", self.settings.location.as_str()),
                ("radius", &self.settings.radius_m.to_string()),
                ("type", "lodging"),
                ("keyword", "hotel"),
                ("key", self.settings.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(self.reshape(response))
    }

    fn reshape(&self, response: NearbyResponse) -> Vec<HotelOffer> {
        response
            .results
            .into_iter()
            .filter_map(|entry| {
                // entries without a photo are dropped rather than offered imageless
                let photo = entry.photos.first()?;
                Some(HotelOffer {
                    img: self.photo_url(&photo.photo_reference),
                    name: entry.name,
                    rating: entry.rating,
                    location: entry.geometry.location,
                    address: entry.vicinity,
                    price: mock_price(),
                })
            })
            .collect()
    }

    fn photo_url(&self, photo_reference: &str) -> String {
        format!(
            "{}?maxheight=200&photoreference={photo_reference}&key={}",
            self.settings.photo_url, self.settings.api_key
        )
    }
}

/// Random mock price in [200, 2000), rounded to 2 decimal places.
fn mock_price() -> f64 {
    let raw: f64 = rand::rng().random_range(200.0..2000.0);
    (raw * 100.0).round() / 100.0
}
