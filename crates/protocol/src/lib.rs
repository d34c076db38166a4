//! Protocol library for topdon-remote
//!
//! This crate defines what travels between the control client and the
//! camera web service: the JSON bodies of the HTTP endpoints, the
//! fire-and-forget [`Command`] set with its endpoint paths, and the
//! Engine.IO/Socket.IO text packet codec used by the live frame channel.
//!
//! # Example
//!
//! ```
//! use protocol::{Command, FileEntry, delete_path};
//!
//! assert_eq!(Command::TakePhoto.path(), "/take_photo");
//!
//! let entry = FileEntry {
//!     name: "TC001_1".to_string(),
//!     ending: "png".to_string(),
//!     filename: "TC001_1.png".to_string(),
//! };
//! assert_eq!(delete_path(&entry.filename), "/delete_file/TC001_1.png");
//! ```
//!
//! # Live channel
//!
//! ```
//! use protocol::codec::{decode_packet, EnginePacket, SocketPacket};
//! use protocol::{Frame, FRAME_EVENT};
//!
//! let packet = decode_packet(r#"42["update_frame",{"current_frame":"/9j/"}]"#).unwrap();
//! if let EnginePacket::Message(SocketPacket::Event { name, mut args, .. }) = packet {
//!     assert_eq!(name, FRAME_EVENT);
//!     let frame: Frame = serde_json::from_value(args.remove(0)).unwrap();
//!     assert_eq!(frame.current_frame, "/9j/");
//! }
//! ```

pub mod codec;
pub mod command;
pub mod error;
pub mod types;

pub use codec::{ENGINE_IO_VERSION, EnginePacket, Handshake, SocketPacket, decode_packet, encode_packet};
pub use command::{
    Command, FILE_LIST_PATH, IS_RECORDING_PATH, Method, SET_TEMPERATURE_PATH, coordinates_path,
    delete_path, download_path, encode_uri_component,
};
pub use error::{ProtocolError, Result};
pub use types::{
    Calibration, CalibrationResponse, CalibrationTarget, FileEntry, Frame, RecordingStatus, Target,
};

/// Socket.IO event name carrying live frames
pub const FRAME_EVENT: &str = "update_frame";
