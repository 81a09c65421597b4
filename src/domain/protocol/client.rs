//! Client → Server messages.
//!
//! Text frames are JSON objects tagged by `type`. Signaling frames carry an
//! opaque `payload` that must reach the target byte-for-byte, so they are
//! decoded separately into a plain struct holding a `RawValue`; serde's
//! internally tagged enums buffer their content and cannot keep raw JSON.

use serde::Deserialize;
use serde_json::value::RawValue;
use thiserror::Error;

use crate::domain::foundation::ConnectionId;
use crate::domain::station::TrackUpdate;

use super::SignalKind;

/// All message types that can be received from a client.
#[derive(Debug, Clone)]
pub enum ClientMessage {
    /// Ask for the broadcaster slot, optionally announcing a track.
    BroadcasterConnect { track: Option<TrackUpdate> },

    /// Register as a listener.
    ListenerConnect,

    /// Leave the listener set without closing the socket.
    ListenerDisconnect,

    /// Broadcaster changes the current track.
    TrackUpdate(TrackUpdate),

    /// Request a `status` reply.
    GetStatus,

    /// Offer, answer, or ICE candidate addressed to another connection.
    Signal(InboundSignal),

    /// Broadcaster goes off air but keeps the socket open.
    BroadcasterDisconnect,

    /// Heartbeat request.
    Ping,
}

/// Signaling envelope as received; the sender is implicit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundSignal {
    #[serde(rename = "type")]
    pub kind: SignalKind,
    pub target_id: ConnectionId,
    pub payload: Box<RawValue>,
}

/// Reasons a text frame could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported message type '{0}'")]
    UnsupportedType(String),
}

#[derive(Deserialize)]
struct TypeTag {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum ControlMessage {
    BroadcasterConnect {
        #[serde(default)]
        track: Option<TrackUpdate>,
    },
    ListenerConnect,
    ListenerDisconnect,
    TrackUpdate(TrackUpdate),
    GetStatus,
    BroadcasterDisconnect,
    Ping,
}

impl From<ControlMessage> for ClientMessage {
    fn from(msg: ControlMessage) -> Self {
        match msg {
            ControlMessage::BroadcasterConnect { track } => ClientMessage::BroadcasterConnect { track },
            ControlMessage::ListenerConnect => ClientMessage::ListenerConnect,
            ControlMessage::ListenerDisconnect => ClientMessage::ListenerDisconnect,
            ControlMessage::TrackUpdate(update) => ClientMessage::TrackUpdate(update),
            ControlMessage::GetStatus => ClientMessage::GetStatus,
            ControlMessage::BroadcasterDisconnect => ClientMessage::BroadcasterDisconnect,
            ControlMessage::Ping => ClientMessage::Ping,
        }
    }
}

const CONTROL_TYPES: &[&str] = &[
    "broadcaster-connect",
    "listener-connect",
    "listener-disconnect",
    "track-update",
    "get-status",
    "broadcaster-disconnect",
    "ping",
];

impl ClientMessage {
    /// Decode a text frame.
    ///
    /// # Errors
    ///
    /// - `Json` if the frame is not valid JSON or misses required fields
    /// - `UnsupportedType` if `type` names nothing a client may send
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let tag: TypeTag = serde_json::from_str(text)?;

        if SignalKind::from_wire(&tag.kind).is_some() {
            let signal: InboundSignal = serde_json::from_str(text)?;
            return Ok(ClientMessage::Signal(signal));
        }
        if !CONTROL_TYPES.contains(&tag.kind.as_str()) {
            return Err(DecodeError::UnsupportedType(tag.kind));
        }

        let control: ControlMessage = serde_json::from_str(text)?;
        Ok(control.into())
    }

    /// Wire name of the message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::BroadcasterConnect { .. } => "broadcaster-connect",
            ClientMessage::ListenerConnect => "listener-connect",
            ClientMessage::ListenerDisconnect => "listener-disconnect",
            ClientMessage::TrackUpdate(_) => "track-update",
            ClientMessage::GetStatus => "get-status",
            ClientMessage::Signal(signal) => signal.kind.as_str(),
            ClientMessage::BroadcasterDisconnect => "broadcaster-disconnect",
            ClientMessage::Ping => "ping",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_broadcaster_connect_with_track() {
        let msg = ClientMessage::decode(
            r#"{"type":"broadcaster-connect","track":{"title":"T","artist":"Ar"}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::BroadcasterConnect { track: Some(track) } => {
                assert_eq!(track, TrackUpdate::full("T", "Ar"));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn decodes_broadcaster_connect_without_track() {
        let msg = ClientMessage::decode(r#"{"type":"broadcaster-connect"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::BroadcasterConnect { track: None }));
    }

    #[test]
    fn decodes_unit_messages_ignoring_extra_fields() {
        let msg = ClientMessage::decode(r#"{"type":"listener-connect","extra":1}"#).unwrap();
        assert!(matches!(msg, ClientMessage::ListenerConnect));

        let msg = ClientMessage::decode(r#"{"type":"get-status"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::GetStatus));
    }

    #[test]
    fn decodes_flat_track_update() {
        let msg = ClientMessage::decode(r#"{"type":"track-update","title":"T2"}"#).unwrap();
        match msg {
            ClientMessage::TrackUpdate(update) => assert_eq!(update, TrackUpdate::titled("T2")),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn signal_payload_is_kept_verbatim() {
        let target = ConnectionId::new();
        let payload = r#"{ "sdp" : "v=0\r\n", "type":"offer" }"#;
        let text = format!(
            r#"{{"type":"offer","targetId":"{}","payload":{}}}"#,
            target, payload
        );

        match ClientMessage::decode(&text).unwrap() {
            ClientMessage::Signal(signal) => {
                assert_eq!(signal.kind, SignalKind::Offer);
                assert_eq!(signal.target_id, target);
                assert_eq!(signal.payload.get(), payload);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn signal_without_target_is_rejected() {
        let err = ClientMessage::decode(r#"{"type":"answer","payload":{}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let err = ClientMessage::decode(r#"{"type":"watcher","id":"x"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedType(kind) if kind == "watcher"));
    }

    #[test]
    fn garbage_is_json_error() {
        assert!(matches!(
            ClientMessage::decode("not json").unwrap_err(),
            DecodeError::Json(_)
        ));
    }
}
