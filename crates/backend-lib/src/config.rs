// ============================
// tripmate-backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Places lookup settings
    pub places: PlacesSettings,
}

/// Settings for the outbound places lookup.
///
/// The query parameters are fixed; only the key and (for tests) the endpoint
/// URLs vary. Everything is read once at startup, there is no runtime
/// reconfiguration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesSettings {
    /// API key appended to the nearby-search and photo URLs
    pub api_key: String,
    /// Nearby-search endpoint
    pub nearby_url: String,
    /// Photo endpoint used when constructing image URLs
    pub photo_url: String,
    /// Search origin as a `lat,lng` pair
    pub location: String,
    /// Search radius in meters
    pub radius_m: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            places: PlacesSettings::default(),
        }
    }
}

impl Default for PlacesSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            nearby_url: "https://maps.googleapis.com/maps/api/place/nearbysearch/json".to_string(),
            photo_url: "https://maps.googleapis.com/maps/api/place/photo".to_string(),
            location: "-33.8670522,151.1957362".to_string(),
            radius_m: 25_000,
        }
    }
}

/// Load settings from `tripmate.toml` and `TRIPMATE_`-prefixed environment
/// variables, environment winning. Nested keys use `__`, e.g.
/// `TRIPMATE_PLACES__API_KEY`.
pub fn load_settings() -> Result<Settings> {
    let settings = Figment::from(Serialized::defaults(Settings::default()))
        .merge(Toml::file("tripmate.toml"))
        .merge(Env::prefixed("TRIPMATE_").split("__"))
        .extract()?;

    Ok(settings)
}
