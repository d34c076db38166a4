//! Network layer: HTTP requests to the camera and the live frame channel

pub mod client;
pub mod live;

pub use client::{CameraClient, Download};
pub use live::{LiveChannel, LiveHandle, LiveState, VideoFrame, decode_frame, socket_url};
