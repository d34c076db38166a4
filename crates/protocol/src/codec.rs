//! Live channel packet codec (Engine.IO v4 / Socket.IO v5 text packets)
//!
//! The camera service pushes frames over Socket.IO. On the websocket
//! transport each text message is one Engine.IO packet:
//!
//! ```text
//! <engine type digit>[payload]
//! ```
//!
//! Engine.IO `message` packets (type `4`) carry a Socket.IO packet:
//!
//! ```text
//! <socket type digit>[<namespace>,][<ack id>][<json>]
//! ```
//!
//! so the frame event arrives as `42["update_frame",{"current_frame":"..."}]`.
//! Binary attachments are not used by the camera service and are rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, Result};

/// Engine.IO protocol revision requested in the handshake query
pub const ENGINE_IO_VERSION: u8 = 4;

/// Default Socket.IO namespace
pub const DEFAULT_NAMESPACE: &str = "/";

/// Payload of the Engine.IO `open` packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

/// Engine.IO packet
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// Socket.IO packet carried inside an Engine.IO message
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack_id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
}

impl SocketPacket {
    /// Namespace connect packet for the default namespace
    pub fn connect_default() -> Self {
        SocketPacket::Connect {
            namespace: DEFAULT_NAMESPACE.to_string(),
            data: None,
        }
    }

    /// Event packet on the default namespace with a single argument
    pub fn event(name: &str, arg: Value) -> Self {
        SocketPacket::Event {
            namespace: DEFAULT_NAMESPACE.to_string(),
            ack_id: None,
            name: name.to_string(),
            args: vec![arg],
        }
    }
}

/// Decode one websocket text message into an Engine.IO packet
///
/// # Example
/// ```
/// use protocol::codec::{decode_packet, EnginePacket};
///
/// assert_eq!(decode_packet("2").unwrap(), EnginePacket::Ping(String::new()));
/// ```
pub fn decode_packet(text: &str) -> Result<EnginePacket> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(ProtocolError::EmptyPacket)?;
    let payload = chars.as_str();

    match kind {
        '0' => Ok(EnginePacket::Open(serde_json::from_str(payload)?)),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(payload.to_string())),
        '3' => Ok(EnginePacket::Pong(payload.to_string())),
        '4' => Ok(EnginePacket::Message(decode_socket_packet(payload)?)),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(ProtocolError::UnknownPacketType {
            layer: "Engine.IO",
            kind: other,
        }),
    }
}

/// Encode an Engine.IO packet as websocket text
///
/// # Example
/// ```
/// use protocol::codec::{encode_packet, EnginePacket, SocketPacket};
///
/// let text = encode_packet(&EnginePacket::Message(SocketPacket::connect_default())).unwrap();
/// assert_eq!(text, "40");
/// ```
pub fn encode_packet(packet: &EnginePacket) -> Result<String> {
    let text = match packet {
        EnginePacket::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
        EnginePacket::Close => "1".to_string(),
        EnginePacket::Ping(data) => format!("2{}", data),
        EnginePacket::Pong(data) => format!("3{}", data),
        EnginePacket::Message(inner) => format!("4{}", encode_socket_packet(inner)?),
        EnginePacket::Upgrade => "5".to_string(),
        EnginePacket::Noop => "6".to_string(),
    };
    Ok(text)
}

fn decode_socket_packet(text: &str) -> Result<SocketPacket> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(ProtocolError::EmptyPacket)?;
    let mut rest = chars.as_str();

    if matches!(kind, '5' | '6') {
        return Err(ProtocolError::Unsupported(
            "binary Socket.IO packets".to_string(),
        ));
    }

    let namespace = if rest.starts_with('/') {
        match rest.split_once(',') {
            Some((ns, tail)) => {
                rest = tail;
                ns.to_string()
            }
            None => {
                let ns = rest.to_string();
                rest = "";
                ns
            }
        }
    } else {
        DEFAULT_NAMESPACE.to_string()
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let ack_id = if digits > 0 {
        let id = rest[..digits]
            .parse::<u64>()
            .map_err(|e| ProtocolError::Malformed(format!("ack id: {}", e)))?;
        rest = &rest[digits..];
        Some(id)
    } else {
        None
    };

    let data: Option<Value> = if rest.is_empty() {
        None
    } else {
        Some(serde_json::from_str(rest)?)
    };

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace, data }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let Some(Value::Array(mut items)) = data else {
                return Err(ProtocolError::Malformed(
                    "event payload must be a JSON array".to_string(),
                ));
            };
            if items.is_empty() {
                return Err(ProtocolError::Malformed("event without a name".to_string()));
            }
            let Value::String(name) = items.remove(0) else {
                return Err(ProtocolError::Malformed(
                    "event name must be a string".to_string(),
                ));
            };
            Ok(SocketPacket::Event {
                namespace,
                ack_id,
                name,
                args: items,
            })
        }
        '3' => Err(ProtocolError::Unsupported("acknowledgements".to_string())),
        '4' => Ok(SocketPacket::ConnectError { namespace, data }),
        other => Err(ProtocolError::UnknownPacketType {
            layer: "Socket.IO",
            kind: other,
        }),
    }
}

fn encode_socket_packet(packet: &SocketPacket) -> Result<String> {
    fn namespace_prefix(namespace: &str) -> String {
        if namespace == DEFAULT_NAMESPACE {
            String::new()
        } else {
            format!("{},", namespace)
        }
    }

    let text = match packet {
        SocketPacket::Connect { namespace, data } => {
            let body = match data {
                Some(value) => serde_json::to_string(value)?,
                None => String::new(),
            };
            format!("0{}{}", namespace_prefix(namespace), body)
        }
        SocketPacket::Disconnect { namespace } => format!("1{}", namespace_prefix(namespace)),
        SocketPacket::Event {
            namespace,
            ack_id,
            name,
            args,
        } => {
            let mut items = Vec::with_capacity(args.len() + 1);
            items.push(Value::String(name.clone()));
            items.extend(args.iter().cloned());
            let ack = ack_id.map(|id| id.to_string()).unwrap_or_default();
            format!(
                "2{}{}{}",
                namespace_prefix(namespace),
                ack,
                serde_json::to_string(&Value::Array(items))?
            )
        }
        SocketPacket::ConnectError { namespace, data } => {
            let body = match data {
                Some(value) => serde_json::to_string(value)?,
                None => String::new(),
            };
            format!("4{}{}", namespace_prefix(namespace), body)
        }
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open() {
        let text = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        let EnginePacket::Open(handshake) = decode_packet(text).unwrap() else {
            panic!("expected open packet");
        };
        assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
        assert_eq!(handshake.ping_interval, 25000);
        assert_eq!(handshake.ping_timeout, 20000);
        assert_eq!(handshake.max_payload, Some(1_000_000));
    }

    #[test]
    fn test_ping_pong() {
        assert_eq!(decode_packet("2").unwrap(), EnginePacket::Ping(String::new()));
        assert_eq!(
            encode_packet(&EnginePacket::Pong(String::new())).unwrap(),
            "3"
        );
        assert_eq!(
            decode_packet("2probe").unwrap(),
            EnginePacket::Ping("probe".to_string())
        );
    }

    #[test]
    fn test_decode_connect_ack() {
        let packet = decode_packet(r#"40{"sid":"abc"}"#).unwrap();
        let EnginePacket::Message(SocketPacket::Connect { namespace, data }) = packet else {
            panic!("expected connect");
        };
        assert_eq!(namespace, "/");
        assert_eq!(data, Some(json!({"sid": "abc"})));
    }

    #[test]
    fn test_decode_frame_event() {
        let packet = decode_packet(r#"42["update_frame",{"current_frame":"/9j/4AAQ"}]"#).unwrap();
        let EnginePacket::Message(SocketPacket::Event {
            namespace,
            ack_id,
            name,
            args,
        }) = packet
        else {
            panic!("expected event");
        };
        assert_eq!(namespace, "/");
        assert_eq!(ack_id, None);
        assert_eq!(name, "update_frame");
        assert_eq!(args, vec![json!({"current_frame": "/9j/4AAQ"})]);
    }

    #[test]
    fn test_decode_event_with_namespace_and_ack() {
        let packet = decode_packet(r#"42/camera,17["hello",1,2]"#).unwrap();
        let EnginePacket::Message(SocketPacket::Event {
            namespace,
            ack_id,
            name,
            args,
        }) = packet
        else {
            panic!("expected event");
        };
        assert_eq!(namespace, "/camera");
        assert_eq!(ack_id, Some(17));
        assert_eq!(name, "hello");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_encode_event_matches_wire_format() {
        let packet = EnginePacket::Message(SocketPacket::event(
            "update_frame",
            json!({"current_frame": "AAAA"}),
        ));
        assert_eq!(
            encode_packet(&packet).unwrap(),
            r#"42["update_frame",{"current_frame":"AAAA"}]"#
        );
    }

    #[test]
    fn test_encode_namespaced_connect() {
        let packet = EnginePacket::Message(SocketPacket::Connect {
            namespace: "/admin".to_string(),
            data: None,
        });
        assert_eq!(encode_packet(&packet).unwrap(), "40/admin,");
    }

    #[test]
    fn test_rejects_bad_packets() {
        assert!(matches!(decode_packet(""), Err(ProtocolError::EmptyPacket)));
        assert!(matches!(
            decode_packet("9"),
            Err(ProtocolError::UnknownPacketType { .. })
        ));
        assert!(matches!(
            decode_packet(r#"451-["frame",{"_placeholder":true,"num":0}]"#),
            Err(ProtocolError::Unsupported(_))
        ));
        assert!(matches!(
            decode_packet(r#"42{"not":"an array"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(decode_packet("42[]"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(decode_packet("42[1]"), Err(ProtocolError::Malformed(_))));
        assert!(decode_packet("0{not json").is_err());
    }

    #[test]
    fn test_connect_error() {
        let packet = decode_packet(r#"44{"message":"Not authorized"}"#).unwrap();
        assert!(matches!(
            packet,
            EnginePacket::Message(SocketPacket::ConnectError { .. })
        ));
    }
}
