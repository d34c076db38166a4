//! Protocol error types

use thiserror::Error;

/// Protocol-level errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// JSON payload could not be parsed or produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame payload was not valid base64
    #[error("Invalid base64 frame payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Empty packet received on the live channel
    #[error("Empty packet")]
    EmptyPacket,

    /// Unknown Engine.IO or Socket.IO packet type
    #[error("Unknown {layer} packet type '{kind}'")]
    UnknownPacketType { layer: &'static str, kind: char },

    /// Packet type that this client does not handle (binary attachments)
    #[error("Unsupported packet: {0}")]
    Unsupported(String),

    /// Structurally invalid packet
    #[error("Malformed packet: {0}")]
    Malformed(String),

    /// Argument that does not name a known command or calibration target
    #[error("Unknown {kind} '{value}'")]
    UnknownName { kind: &'static str, value: String },

    /// Coordinate outside the normalized range
    #[error("Coordinate {axis}={value} outside [0, 1]")]
    CoordinateOutOfRange { axis: char, value: f64 },
}

/// Type alias for protocol results
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::UnknownPacketType {
            layer: "Engine.IO",
            kind: '9',
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Engine.IO"));
        assert!(msg.contains("'9'"));
    }

    #[test]
    fn test_coordinate_error() {
        let err = ProtocolError::CoordinateOutOfRange {
            axis: 'x',
            value: 1.5,
        };
        assert_eq!(format!("{}", err), "Coordinate x=1.5 outside [0, 1]");
    }
}
