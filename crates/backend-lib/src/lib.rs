// ============================
// tripmate-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the TripMate trip-planning server.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod places;
pub mod registry;
pub mod store;
pub mod ws_router;

use std::sync::Arc;

use crate::config::Settings;
use crate::places::PlacesClient;
use crate::registry::ConnectionRegistry;

/// Application state shared across all handlers
pub struct AppState<S> {
    /// Trip/user store
    pub store: S,
    /// Live connection registry
    pub registry: ConnectionRegistry,
    /// Outbound places lookup client
    pub places: PlacesClient,
    /// Settings manager
    pub settings: Arc<Settings>,
}

impl<S> AppState<S> {
    /// Create a new application state
    pub fn new(store: S, settings: Settings) -> Self {
        let places = PlacesClient::new(settings.places.clone());
        Self {
            store,
            registry: ConnectionRegistry::new(),
            places,
            settings: Arc::new(settings),
        }
    }
}
