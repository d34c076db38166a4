//! Camera service data types
//!
//! These mirror the JSON bodies exchanged with the camera web service:
//! saved capture listings, recording state, live frames, and the
//! calibration request.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProtocolError, Result};

/// One saved capture on the device
///
/// `filename` is the opaque server-side identifier used for download and
/// delete. `name` and `ending` only make up the display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Base name without extension
    pub name: String,
    /// Extension without the leading dot
    pub ending: String,
    /// Server-side identifier
    pub filename: String,
}

impl FileEntry {
    /// Label shown to the user: `name.ending`
    pub fn display_name(&self) -> String {
        format!("{}.{}", self.name, self.ending)
    }
}

/// Response body of `/is_recording`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingStatus {
    pub recording: bool,
}

/// Payload of the `update_frame` live event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Base64 JPEG, no `data:` prefix
    pub current_frame: String,
}

impl Frame {
    /// Build a frame payload from raw JPEG bytes
    pub fn from_jpeg(jpeg: &[u8]) -> Self {
        Self {
            current_frame: BASE64_ENGINE.encode(jpeg),
        }
    }

    /// Decode the base64 payload into JPEG bytes
    pub fn decode_jpeg(&self) -> Result<Vec<u8>> {
        // Tolerate a data URL in case the server ever starts sending one
        let payload = match self.current_frame.split_once(";base64,") {
            Some((_, data)) => data,
            None => self.current_frame.as_str(),
        };
        Ok(BASE64_ENGINE.decode(payload.trim())?)
    }
}

/// Normalized click position on the video image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f64,
    pub y: f64,
}

impl Target {
    /// Create a target, rejecting values outside `[0, 1]`
    pub fn new(x: f64, y: f64) -> Result<Self> {
        for (axis, value) in [('x', x), ('y', y)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ProtocolError::CoordinateOutOfRange { axis, value });
            }
        }
        Ok(Self { x, y })
    }

    /// Map an offset inside an area of `width` x `height` to normalized
    /// coordinates. Returns `None` for a degenerate area.
    pub fn from_offset(offset_x: f64, offset_y: f64, width: f64, height: f64) -> Option<Self> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Self {
            x: offset_x / width,
            y: offset_y / height,
        })
    }
}

/// Which temperature reading a calibration pins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationTarget {
    Min,
    Max,
    Average,
}

impl FromStr for CalibrationTarget {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "average" | "avg" => Ok(Self::Average),
            other => Err(ProtocolError::UnknownName {
                kind: "calibration target",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for CalibrationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Average => "average",
        };
        f.write_str(s)
    }
}

/// Body of `POST /api/set_temperature`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub destination: CalibrationTarget,
    pub temperature: f64,
}

impl FromStr for Calibration {
    type Err = ProtocolError;

    /// Parses `"<min|max|average> <temperature>"`, e.g. `"max 36.5"`
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let (Some(destination), Some(temperature), None) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(ProtocolError::Malformed(format!(
                "expected '<min|max|average> <temperature>', got '{}'",
                s.trim()
            )));
        };

        let temperature: f64 = temperature.parse().map_err(|_| {
            ProtocolError::Malformed(format!("invalid temperature '{}'", temperature))
        })?;
        if !temperature.is_finite() {
            return Err(ProtocolError::Malformed(format!(
                "invalid temperature '{}'",
                temperature
            )));
        }

        Ok(Self {
            destination: destination.parse()?,
            temperature,
        })
    }
}

/// Response body of `POST /api/set_temperature`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationResponse {
    pub message: String,
}
