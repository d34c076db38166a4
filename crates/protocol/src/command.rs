//! Control commands and endpoint paths
//!
//! Every fire-and-forget control action of the camera service maps to one
//! variant of [`Command`]. The other endpoints (status, file list,
//! download, delete, coordinates, calibration) carry data and get their
//! own path builders here so request construction lives in one place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProtocolError, Result};
use crate::types::Target;

/// HTTP method used for an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// Fire-and-forget device command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    ToggleRecording,
    FlipImage,
    Quit,
    CycleHud,
    TakePhoto,
    RotateImage,
}

impl Command {
    /// All commands, in toolbar order
    pub const ALL: [Command; 6] = [
        Command::ToggleRecording,
        Command::TakePhoto,
        Command::FlipImage,
        Command::RotateImage,
        Command::CycleHud,
        Command::Quit,
    ];

    /// HTTP method for this command
    pub fn method(&self) -> Method {
        Method::Get
    }

    /// Endpoint path for this command
    pub fn path(&self) -> &'static str {
        match self {
            Command::ToggleRecording => "/toggle_recording",
            Command::FlipImage => "/flip_image",
            Command::Quit => "/quit",
            Command::CycleHud => "/cycle_hud",
            Command::TakePhoto => "/take_photo",
            Command::RotateImage => "/rotate_image",
        }
    }

    /// Kebab-case name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Command::ToggleRecording => "toggle-recording",
            Command::FlipImage => "flip-image",
            Command::Quit => "quit",
            Command::CycleHud => "cycle-hud",
            Command::TakePhoto => "take-photo",
            Command::RotateImage => "rotate-image",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Command::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| ProtocolError::UnknownName {
                kind: "command",
                value: s.to_string(),
            })
    }
}

/// Recording status endpoint
pub const IS_RECORDING_PATH: &str = "/is_recording";

/// File list endpoint
pub const FILE_LIST_PATH: &str = "/get_file_list";

/// Calibration endpoint
pub const SET_TEMPERATURE_PATH: &str = "/api/set_temperature";

/// `/download_file/{filename}` with the filename percent-encoded
pub fn download_path(filename: &str) -> String {
    format!("/download_file/{}", encode_uri_component(filename))
}

/// `/delete_file/{filename}` with the filename percent-encoded
pub fn delete_path(filename: &str) -> String {
    format!("/delete_file/{}", encode_uri_component(filename))
}

/// `/send_coordinates?x=..&y=..` with both values percent-encoded
pub fn coordinates_path(target: Target) -> String {
    format!(
        "/send_coordinates?x={}&y={}",
        encode_uri_component(&target.x.to_string()),
        encode_uri_component(&target.y.to_string())
    )
}

/// Percent-encode like JavaScript's `encodeURIComponent`
///
/// Keeps `A-Z a-z 0-9 - _ . ! ~ * ' ( )` and encodes every other byte of
/// the UTF-8 representation as `%XX`.
pub fn encode_uri_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for b in value.bytes() {
        let is_unreserved = b.is_ascii_alphanumeric()
            || matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')');
        if is_unreserved {
            encoded.push(char::from(b));
        } else {
            let _ = std::fmt::Write::write_fmt(&mut encoded, format_args!("%{:02X}", b));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_paths() {
        let expected = [
            (Command::ToggleRecording, "/toggle_recording"),
            (Command::FlipImage, "/flip_image"),
            (Command::Quit, "/quit"),
            (Command::CycleHud, "/cycle_hud"),
            (Command::TakePhoto, "/take_photo"),
            (Command::RotateImage, "/rotate_image"),
        ];
        for (command, path) in expected {
            assert_eq!(command.path(), path);
            assert_eq!(command.method(), Method::Get);
        }
    }

    #[test]
    fn test_command_from_str() {
        assert_eq!("flip-image".parse::<Command>().unwrap(), Command::FlipImage);
        assert_eq!("cycle_hud".parse::<Command>().unwrap(), Command::CycleHud);
        assert_eq!("Take-Photo".parse::<Command>().unwrap(), Command::TakePhoto);
        assert!("explode".parse::<Command>().is_err());

        for command in Command::ALL {
            assert_eq!(command.name().parse::<Command>().unwrap(), command);
        }
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("img1.jpg"), "img1.jpg");
        assert_eq!(encode_uri_component("my file.png"), "my%20file.png");
        assert_eq!(encode_uri_component("a/b?c&d=e#f"), "a%2Fb%3Fc%26d%3De%23f");
        assert_eq!(encode_uri_component("(it's)!*~"), "(it's)!*~");
        assert_eq!(encode_uri_component("ä"), "%C3%A4");
        assert_eq!(encode_uri_component("0.5"), "0.5");
    }

    #[test]
    fn test_file_paths() {
        assert_eq!(download_path("img1.jpg"), "/download_file/img1.jpg");
        assert_eq!(delete_path("img1.jpg"), "/delete_file/img1.jpg");
        assert_eq!(delete_path("a b.mp4"), "/delete_file/a%20b.mp4");
    }

    #[test]
    fn test_coordinates_path() {
        let target = Target { x: 0.5, y: 0.25 };
        assert_eq!(coordinates_path(target), "/send_coordinates?x=0.5&y=0.25");

        let target = Target { x: 0.0, y: 1.0 };
        assert_eq!(coordinates_path(target), "/send_coordinates?x=0&y=1");
    }
}
