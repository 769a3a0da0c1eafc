// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const WS_CONNECTION: &str = "ws.connection";
pub const WS_DISCONNECTION: &str = "ws.disconnection";
pub const WS_ACTIVE: &str = "ws.active";
pub const USER_ANNOUNCED: &str = "user.announced";
pub const MESSAGE_RELAYED: &str = "message.relayed";
pub const READY_TRANSITION: &str = "ready.transition";
pub const HOTEL_BROADCAST: &str = "hotel.broadcast";
pub const HOTEL_LOOKUP_FAILED: &str = "hotel.lookup_failed";
