// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between the TripMate client and server.
//! This module defines the event-channel protocol and supporting types.
//!
//! Frames are adjacently tagged JSON, `{"event": "...", "data": ...}`, and
//! the event names on the wire are the ones the web client already speaks
//! (`"new user"`, `"startReady"`, ...), so variant renames below are load
//! bearing.

use serde::{Deserialize, Serialize};

/// Events sent from client to server
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Announce which stored user this connection belongs to.
    /// The server replies (to this connection only) with a [`UserProfile`].
    #[serde(rename = "new user")]
    NewUser(i64),
    /// A chat message; relayed verbatim to every connection.
    #[serde(rename = "new message")]
    NewMessage(serde_json::Value),
    /// Readiness signal for the flights step. The payload is a toggle hint:
    /// a set flag flips, an unset flag adopts the payload.
    #[serde(rename = "startReady")]
    StartReady(bool),
    /// Readiness signal for the hotels step; carries no payload.
    #[serde(rename = "hotels request")]
    HotelsRequest,
}

/// Events sent from server to client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Private reply to a `new user` announcement.
    #[serde(rename = "new user")]
    NewUser(UserProfile),
    /// Relay of a chat message to every connection, sender included.
    #[serde(rename = "new message")]
    NewMessage(serde_json::Value),
    /// Group transition fired when every live connection is ready for a step.
    /// The payload names the step, currently always `"flights"`.
    #[serde(rename = "next step")]
    NextStep(String),
    /// Lodging options fanned out to every connection.
    #[serde(rename = "hotel data")]
    HotelData(Vec<HotelOffer>),
}

/// Profile handed back to a connection that announced its user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    /// Stored user id
    pub id: i64,
    /// Stored display name
    pub name: String,
    /// Display color assigned at announcement time
    pub color: String,
}

/// A latitude/longitude pair as returned by the places API.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One lodging option synthesized from a places lookup.
///
/// `img` is a URL the client fetches itself; the server never downloads the
/// photo. `price` is a mock value in [200, 2000) with two decimal places.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HotelOffer {
    pub name: String,
    pub rating: Option<f64>,
    pub location: GeoPoint,
    pub address: Option<String>,
    pub img: String,
    pub price: f64,
}
