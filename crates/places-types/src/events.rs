//! Real-time channel messages.
//!
//! Every frame on the channel is a JSON object of the form
//! `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::PlaceId;
use crate::structs::Place;

/// A message pushed from the server to real-time subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum ChannelEvent {
    /// A place was created.
    PlaceAdded(Place),
    /// A place's fields were updated.
    PlaceUpdated(Place),
    /// A place was deleted. Carries only the identifier.
    PlaceDeleted(PlaceId),
    /// A place's visit counter was incremented.
    PlaceVisited(Place),
    /// An arbitrary payload relayed from another subscriber.
    UserAction(serde_json::Value),
}

impl ChannelEvent {
    /// The wire name of this event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PlaceAdded(_) => "place-added",
            Self::PlaceUpdated(_) => "place-updated",
            Self::PlaceDeleted(_) => "place-deleted",
            Self::PlaceVisited(_) => "place-visited",
            Self::UserAction(_) => "user-action",
        }
    }
}

/// A message a subscriber may send to the server.
///
/// Only `user-action` is accepted; it is relayed to every other
/// subscriber unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum ClientMessage {
    /// Relay this payload to everyone else.
    UserAction(serde_json::Value),
}

impl From<ClientMessage> for ChannelEvent {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::UserAction(data) => Self::UserAction(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_event_carries_id_string() {
        let id = PlaceId::new();
        let json = serde_json::to_value(ChannelEvent::PlaceDeleted(id)).unwrap_or_default();
        assert_eq!(json["event"], "place-deleted");
        assert_eq!(json["data"], id.to_string());
    }

    #[test]
    fn name_matches_serialized_tag() {
        let event = ChannelEvent::UserAction(serde_json::json!({"x": 1}));
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["event"], event.name());
        assert_eq!(json["data"]["x"], 1);
    }

    #[test]
    fn client_may_only_send_user_action() {
        let ok: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"event":"user-action","data":{"cursor":[1,2]}}"#);
        assert!(ok.is_ok());

        let forged: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"event":"place-deleted","data":"x"}"#);
        assert!(forged.is_err());
    }
}
