// ============================
// crates/backend-lib/src/handlers/live.rs
// ============================
//! Live event handlers.
//!
//! One entry point per inbound event-channel frame. Each handler mutates
//! the connection's registry entry and recomputes the relevant readiness
//! aggregate over all live connections; when a step becomes unanimous the
//! transition fans out to everyone. Two failure modes are swallowed on
//! purpose: an unknown user id produces no reply at all, and a failed
//! places lookup means the `hotel data` event simply never fires.

use metrics::counter;

use tripmate_common::{ClientEvent, ServerEvent, UserProfile};

use crate::error::AppError;
use crate::metrics::{
    HOTEL_BROADCAST, HOTEL_LOOKUP_FAILED, MESSAGE_RELAYED, READY_TRANSITION, USER_ANNOUNCED,
};
use crate::registry::{ConnId, ConnectionRegistry, ReadinessKind};
use crate::store::Store;
use crate::AppState;

/// Step name broadcast when the flights readiness becomes unanimous.
const FLIGHTS_STEP: &str = "flights";

/// Handle one inbound event from a connection.
///
/// # Errors
/// Store and transport failures bubble up; the connection loop logs them
/// without sending anything back, so event-channel errors are never
/// client-visible.
pub async fn handle_event<S: Store>(
    state: &AppState<S>,
    conn_id: ConnId,
    event: ClientEvent,
) -> Result<(), AppError> {
    match event {
        ClientEvent::NewUser(user_id) => {
            let Some(user) = state.store.find_user(user_id).await? else {
                // swallowed: no reply, no error event
                tracing::debug!(user_id, "new user event for unknown id, dropping");
                return Ok(());
            };

            let color = ConnectionRegistry::color_for_count(state.registry.live_count());
            state.registry.send_to(
                conn_id,
                ServerEvent::NewUser(UserProfile {
                    id: user.id,
                    name: user.name,
                    color: color.to_string(),
                }),
            );
            counter!(USER_ANNOUNCED).increment(1);
        }

        ClientEvent::NewMessage(message) => {
            // relayed verbatim to everyone, sender included
            state.registry.broadcast(&ServerEvent::NewMessage(message));
            counter!(MESSAGE_RELAYED).increment(1);
        }

        ClientEvent::StartReady(hint) => {
            state
                .registry
                .toggle_or_set(conn_id, ReadinessKind::Flights, hint);

            if state.registry.is_unanimous(ReadinessKind::Flights) {
                state
                    .registry
                    .broadcast(&ServerEvent::NextStep(FLIGHTS_STEP.to_string()));
                counter!(READY_TRANSITION).increment(1);
            }
        }

        ClientEvent::HotelsRequest => {
            state.registry.mark_ready(conn_id, ReadinessKind::Hotels);

            if state.registry.is_unanimous(ReadinessKind::Hotels) {
                // The flag is never reset, so every further request while the
                // group stays unanimous triggers another broadcast.
                match state.places.nearby_lodging().await {
                    Ok(hotels) => {
                        state.registry.broadcast(&ServerEvent::HotelData(hotels));
                        counter!(HOTEL_BROADCAST).increment(1);
                    }
                    Err(e) => {
                        // swallowed: waiting clients never hear about this
                        tracing::warn!(error = %e, "places lookup failed, no hotel data broadcast");
                        counter!(HOTEL_LOOKUP_FAILED).increment(1);
                    }
                }
            }
        }
    }

    Ok(())
}
