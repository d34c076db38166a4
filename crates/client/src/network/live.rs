//! Live frame channel
//!
//! Speaks just enough Engine.IO v4 / Socket.IO v5 over a websocket to
//! receive the camera's `update_frame` events. Decoded frames are
//! published on a `watch` channel so consumers only ever see the newest
//! one.

use common::{Error, Result};
use futures::{SinkExt, StreamExt};
use protocol::codec::{EnginePacket, Handshake, SocketPacket, decode_packet, encode_packet};
use protocol::{ENGINE_IO_VERSION, Frame};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::LiveSettings;

/// Read timeout used until the server announces its ping schedule
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(20);

/// Live channel state shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveState {
    Connecting,
    Connected,
    Disconnected,
}

/// A decoded frame ready to draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Packed RGB8, row-major
    pub rgb: Vec<u8>,
}

impl VideoFrame {
    /// Pixel at (x, y), clamped to the image bounds
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let i = ((y * self.width + x) * 3) as usize;
        match self.rgb.get(i..i + 3) {
            Some(px) => [px[0], px[1], px[2]],
            None => [0, 0, 0],
        }
    }
}

/// Decode a frame event payload into RGB pixels
pub fn decode_frame(frame: &Frame) -> Result<VideoFrame> {
    let jpeg = frame.decode_jpeg()?;
    let image = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg)
        .map_err(|e| Error::Decode(format!("Invalid JPEG frame: {}", e)))?
        .to_rgb8();

    Ok(VideoFrame {
        width: image.width(),
        height: image.height(),
        rgb: image.into_raw(),
    })
}

/// Socket.IO websocket URL for a camera base URL
///
/// # Example
/// ```
/// use client::network::live::socket_url;
///
/// let url = socket_url("http://camera.local:5000").unwrap();
/// assert_eq!(url.as_str(), "ws://camera.local:5000/socket.io/?EIO=4&transport=websocket");
/// ```
pub fn socket_url(base_url: &str) -> Result<Url> {
    let mut url =
        Url::parse(base_url).map_err(|e| Error::Config(format!("Invalid base URL: {}", e)))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::Config(format!("Unsupported URL scheme '{}'", other)));
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| Error::Config(format!("Cannot use scheme '{}'", scheme)))?;

    let prefix = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{}/socket.io/", prefix));
    url.set_query(Some(&format!(
        "EIO={}&transport=websocket",
        ENGINE_IO_VERSION
    )));
    url.set_fragment(None);
    Ok(url)
}

/// Receiving side of a running live channel
pub struct LiveHandle {
    pub frames: watch::Receiver<Option<Arc<VideoFrame>>>,
    pub state: watch::Receiver<LiveState>,
    task: JoinHandle<()>,
}

impl LiveHandle {
    pub(crate) fn new(
        frames: watch::Receiver<Option<Arc<VideoFrame>>>,
        state: watch::Receiver<LiveState>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            frames,
            state,
            task,
        }
    }

    /// Stop the channel task
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Live channel connection task
pub struct LiveChannel {
    url: Url,
    settings: LiveSettings,
    frames: watch::Sender<Option<Arc<VideoFrame>>>,
    state: watch::Sender<LiveState>,
}

/// How a session ended
enum SessionEnd {
    /// Server closed the socket or the namespace
    Closed,
    /// Every receiver is gone
    Abandoned,
}

/// Double the reconnect delay, capped at `max_ms`
fn next_backoff(current_ms: u64, max_ms: u64) -> u64 {
    current_ms.saturating_mul(2).min(max_ms)
}

/// Read timeout for an open session
///
/// A handshake without ping timing keeps the handshake timeout.
fn session_read_timeout(handshake: &Handshake) -> Duration {
    match handshake
        .ping_interval
        .saturating_add(handshake.ping_timeout)
    {
        0 => HANDSHAKE_TIMEOUT,
        ms => Duration::from_millis(ms),
    }
}

impl LiveChannel {
    /// Spawn the channel for the camera at `base_url`
    pub fn spawn(base_url: &str, settings: LiveSettings) -> Result<LiveHandle> {
        let url = socket_url(base_url)?;
        let (frames_tx, frames_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(LiveState::Connecting);

        let channel = LiveChannel {
            url,
            settings,
            frames: frames_tx,
            state: state_tx,
        };
        let task = tokio::spawn(channel.run());

        Ok(LiveHandle::new(frames_rx, state_rx, task))
    }

    /// Connect, receive, and reconnect with exponential backoff
    async fn run(self) {
        let mut backoff_ms = self.settings.initial_backoff_ms;

        loop {
            self.state.send_replace(LiveState::Connecting);
            info!("Connecting live channel: {}", self.url);

            let mut connected = false;
            match self.session(&mut connected).await {
                Ok(SessionEnd::Abandoned) => {
                    debug!("Live channel has no receivers left, stopping");
                    return;
                }
                Ok(SessionEnd::Closed) => info!("Live channel closed by server"),
                Err(e) => error!("Live channel failed: {}", e),
            }
            self.state.send_replace(LiveState::Disconnected);

            if !self.settings.reconnect {
                info!("Live channel reconnect disabled");
                return;
            }
            if connected {
                backoff_ms = self.settings.initial_backoff_ms;
            }

            let jitter = rand::rng().random_range(0..=backoff_ms / 10);
            let delay_ms = backoff_ms.saturating_add(jitter);
            warn!("Reconnecting live channel in {}ms", delay_ms);
            sleep(Duration::from_millis(delay_ms)).await;

            if self.frames.is_closed() {
                return;
            }
            backoff_ms = next_backoff(backoff_ms, self.settings.max_backoff_ms);
        }
    }

    /// One websocket session from connect to close
    async fn session(&self, connected: &mut bool) -> Result<SessionEnd> {
        let (ws, _) = timeout(HANDSHAKE_TIMEOUT, connect_async(self.url.as_str()))
            .await
            .map_err(|_| Error::LiveChannel("Connect timed out".to_string()))?
            .map_err(|e| Error::LiveChannel(format!("Connect failed: {}", e)))?;
        let (mut write, mut read) = ws.split();

        let mut read_timeout = HANDSHAKE_TIMEOUT;

        loop {
            if self.frames.is_closed() {
                return Ok(SessionEnd::Abandoned);
            }

            let message = match timeout(read_timeout, read.next()).await {
                Ok(Some(Ok(message))) => message,
                Ok(Some(Err(e))) => {
                    return Err(Error::LiveChannel(format!("Websocket error: {}", e)));
                }
                Ok(None) => return Ok(SessionEnd::Closed),
                Err(_) => {
                    return Err(Error::LiveChannel(format!(
                        "No packet from server within {:?}",
                        read_timeout
                    )));
                }
            };

            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => return Ok(SessionEnd::Closed),
                Message::Binary(_) => {
                    debug!("Ignoring binary websocket message");
                    continue;
                }
                _ => continue,
            };

            let packet = match decode_packet(&text) {
                Ok(packet) => packet,
                Err(e) => {
                    warn!("Dropping malformed packet: {}", e);
                    continue;
                }
            };

            let reply = match packet {
                EnginePacket::Open(handshake) => {
                    debug!(
                        "Engine.IO open: sid={} pingInterval={}ms pingTimeout={}ms",
                        handshake.sid, handshake.ping_interval, handshake.ping_timeout
                    );
                    read_timeout = session_read_timeout(&handshake);
                    Some(EnginePacket::Message(SocketPacket::connect_default()))
                }
                EnginePacket::Ping(data) => Some(EnginePacket::Pong(data)),
                EnginePacket::Close => return Ok(SessionEnd::Closed),
                EnginePacket::Message(SocketPacket::Connect { .. }) => {
                    info!("Live channel connected");
                    *connected = true;
                    self.state.send_replace(LiveState::Connected);
                    None
                }
                EnginePacket::Message(SocketPacket::ConnectError { data, .. }) => {
                    return Err(Error::LiveChannel(format!(
                        "Namespace connect refused: {}",
                        data.map(|d| d.to_string()).unwrap_or_default()
                    )));
                }
                EnginePacket::Message(SocketPacket::Disconnect { .. }) => {
                    return Ok(SessionEnd::Closed);
                }
                EnginePacket::Message(SocketPacket::Event { name, args, .. }) => {
                    if name == self.settings.event {
                        self.publish(args);
                    } else {
                        debug!("Ignoring event '{}'", name);
                    }
                    None
                }
                EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => None,
            };

            if let Some(reply) = reply {
                let text = encode_packet(&reply)?;
                write
                    .send(Message::Text(text))
                    .await
                    .map_err(|e| Error::LiveChannel(format!("Send failed: {}", e)))?;
            }
        }
    }

    fn publish(&self, mut args: Vec<serde_json::Value>) {
        if args.is_empty() {
            warn!("Frame event without payload");
            return;
        }
        let frame: Frame = match serde_json::from_value(args.swap_remove(0)) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Dropping frame with unexpected payload: {}", e);
                return;
            }
        };
        match decode_frame(&frame) {
            Ok(video) => {
                self.frames.send_replace(Some(Arc::new(video)));
            }
            Err(e) => warn!("Dropping undecodable frame: {}", e),
        }
    }
}
