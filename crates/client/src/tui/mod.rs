//! Terminal User Interface
//!
//! Provides an interactive TUI for watching and controlling the camera.
//!
//! # Layout
//!
//! The TUI is organized in four sections:
//! - **Status bar**: live channel state and the last status message
//! - **Tabs**: Video and saved files
//! - **Tab content**: toolbar plus live frame, or the file list
//! - **Help bar**: context-sensitive keybindings
//!
//! # Keybindings
//!
//! - `Tab`, `1`/`v`, `2`/`f`: Switch tabs
//! - `Space`: Start/stop recording
//! - `p`, `m`, `o`, `h`: Photo, flip, rotate, cycle HUD
//! - `x`: Stop the camera service (with confirmation)
//! - Left click on the video: Set the target
//! - `Enter` / `d` / `r` on the file list: Download / Delete / Refresh
//! - `q`: Quit (with confirmation)
//! - `?`: Show help

pub mod app;
pub mod events;
pub mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::ClientConfig;
use crate::network::{CameraClient, LiveChannel, LiveHandle};

pub use app::{App, AppAction, InputMode, Tab, Update};
pub use events::EventHandler;

/// TUI runner that manages the terminal and event loop
pub struct TuiRunner {
    /// Terminal instance
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application state
    app: App,
    /// Event handler
    event_handler: EventHandler,
    camera: CameraClient,
    /// Live frame channel, if enabled
    live: Option<LiveHandle>,
    download_dir: PathBuf,
    sequence_toggle_poll: bool,
    /// Channel for receiving results from async tasks
    update_rx: mpsc::Receiver<Update>,
    /// Channel for sending results from async tasks
    update_tx: mpsc::Sender<Update>,
}

impl TuiRunner {
    /// Create a new TUI runner
    pub fn new(camera: CameraClient, live: Option<LiveHandle>, config: &ClientConfig) -> Result<Self> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        // Create update channel
        let (update_tx, update_rx) = mpsc::channel(100);

        Ok(Self {
            terminal,
            app: App::new(config.client.language),
            event_handler: EventHandler::with_tick_rate(Duration::from_millis(
                config.ui.tick_rate_ms,
            )),
            camera,
            live,
            download_dir: config.download_dir(),
            sequence_toggle_poll: config.ui.sequence_toggle_poll,
            update_rx,
            update_tx,
        })
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        info!("Starting TUI against {}", self.camera.base_url());

        // The record button starts out unknown
        self.handle_action(AppAction::RefreshRecordingStatus);
        self.draw()?;

        loop {
            // Process any pending results from async tasks
            while let Ok(update) = self.update_rx.try_recv() {
                let follow_up = self.app.apply(update);
                self.handle_action(follow_up);
            }
            self.sync_live_state();

            // Poll for terminal events
            if let Some(event) = self.event_handler.poll()? {
                let action = match event {
                    Event::Key(key) => self.event_handler.handle_key(&mut self.app, key),
                    Event::Mouse(mouse) => self.event_handler.handle_mouse(&mut self.app, mouse),
                    Event::Resize(_, _) => {
                        // Terminal will re-render on next draw
                        AppAction::None
                    }
                    _ => AppAction::None,
                };

                // Handle the action
                self.handle_action(action);
            }

            // Check if we should quit
            if self.app.should_quit {
                break;
            }

            // Render
            self.draw()?;
        }

        info!("TUI shutting down");
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let video = self
            .live
            .as_ref()
            .and_then(|live| live.frames.borrow().clone());
        let app = &self.app;
        let mut video_area = None;
        self.terminal
            .draw(|f| video_area = ui::render(f, app, video.as_deref()))?;
        self.app.video_area = video_area;
        Ok(())
    }

    /// Mirror the live channel state into the app
    fn sync_live_state(&mut self) {
        let ended = match self.live.as_mut() {
            Some(live) => !sync_live_state(&mut self.app, live),
            None => false,
        };
        if ended {
            self.live = None;
        }
    }

    /// Handle an application action
    fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::None => {}
            AppAction::Quit => {
                self.app.should_quit = true;
            }
            AppAction::Send(command) => {
                let camera = self.camera.clone();
                tokio::spawn(async move { camera.dispatch(command).await });
            }
            AppAction::ToggleRecording => self.spawn_toggle_recording(),
            AppAction::RefreshRecordingStatus => {
                spawn_recording_status(self.camera.clone(), self.update_tx.clone());
            }
            AppAction::RefreshFileList => self.spawn_refresh_files(),
            AppAction::Download(filename) => self.spawn_download(filename),
            AppAction::Delete(filename) => self.spawn_delete(filename),
            AppAction::SendCoordinates(target) => {
                let camera = self.camera.clone();
                tokio::spawn(async move {
                    if let Err(e) = camera.send_coordinates(target).await {
                        error!("Failed to send coordinates: {}", e);
                    }
                });
            }
            AppAction::Calibrate(calibration) => self.spawn_calibrate(calibration),
        }
    }

    /// Toggle request and status poll
    ///
    /// Both run concurrently unless sequencing is configured, so the poll
    /// may observe the state from before the toggle.
    fn spawn_toggle_recording(&self) {
        let camera = self.camera.clone();
        let tx = self.update_tx.clone();

        if self.sequence_toggle_poll {
            tokio::spawn(async move {
                camera.dispatch(protocol::Command::ToggleRecording).await;
                spawn_recording_status(camera, tx);
            });
        } else {
            let toggler = camera.clone();
            tokio::spawn(async move {
                toggler.dispatch(protocol::Command::ToggleRecording).await
            });
            spawn_recording_status(camera, tx);
        }
    }

    /// Spawn async task to refresh the file list
    fn spawn_refresh_files(&self) {
        let camera = self.camera.clone();
        let tx = self.update_tx.clone();

        tokio::spawn(async move {
            let update = match camera.file_list().await {
                Ok(files) => Update::FileList(files),
                Err(e) => {
                    error!("Failed to load file list: {}", e);
                    Update::FileListFailed(e.to_string())
                }
            };
            let _ = tx.send(update).await;
        });
    }

    /// Spawn async task to download a file
    fn spawn_download(&self, filename: String) {
        let camera = self.camera.clone();
        let tx = self.update_tx.clone();
        let dir = self.download_dir.clone();

        tokio::spawn(async move {
            let update = match camera.save_download(&filename, &dir).await {
                Ok(path) => Update::Downloaded { filename, path },
                Err(e) => {
                    match e.status() {
                        Some(status) => error!("Download failed: {}", status),
                        None => error!("Download failed: {}", e),
                    }
                    Update::DownloadFailed {
                        filename,
                        error: e.to_string(),
                    }
                }
            };
            let _ = tx.send(update).await;
        });
    }

    /// Spawn async task to delete a file
    fn spawn_delete(&self, filename: String) {
        let camera = self.camera.clone();
        let tx = self.update_tx.clone();

        tokio::spawn(async move {
            let update = match camera.delete_file(&filename).await {
                Ok(()) => Update::FileDeleted(filename),
                Err(e) => {
                    error!("Failed to delete {}: {}", filename, e);
                    Update::DeleteFailed {
                        filename,
                        error: e.to_string(),
                    }
                }
            };
            let _ = tx.send(update).await;
        });
    }

    /// Spawn async task to calibrate a reading
    fn spawn_calibrate(&self, calibration: protocol::Calibration) {
        let camera = self.camera.clone();
        let tx = self.update_tx.clone();

        tokio::spawn(async move {
            let update = match camera.calibrate(calibration).await {
                Ok(response) => Update::Calibrated(response.message),
                Err(e) => {
                    error!("Calibration failed: {}", e);
                    Update::CalibrationFailed(e.to_string())
                }
            };
            let _ = tx.send(update).await;
        });
    }
}

/// Copy a changed live state into `app`
///
/// Returns false once the live task has ended. Its last state is applied
/// before that, so a dead channel shows as disconnected.
fn sync_live_state(app: &mut App, live: &mut LiveHandle) -> bool {
    match live.state.has_changed() {
        Ok(true) => {
            let state = *live.state.borrow_and_update();
            app.apply(Update::LiveState(state));
            true
        }
        Ok(false) => true,
        Err(_) => {
            let state = *live.state.borrow();
            app.apply(Update::LiveState(state));
            false
        }
    }
}

/// Spawn async task polling the recording status
fn spawn_recording_status(camera: CameraClient, tx: mpsc::Sender<Update>) {
    tokio::spawn(async move {
        let update = match camera.recording_status().await {
            Ok(status) => Update::RecordingStatus(status),
            Err(e) => {
                error!("Failed to fetch recording status: {}", e);
                Update::RecordingStatusFailed(e.to_string())
            }
        };
        let _ = tx.send(update).await;
    });
}

impl Drop for TuiRunner {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

/// Run the TUI application
///
/// This is the main entry point for TUI mode. It starts the live channel
/// when enabled, creates a TuiRunner and runs the main event loop.
///
/// # Example
/// ```no_run
/// use client::config::ClientConfig;
/// use client::network::CameraClient;
/// use client::tui::run;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ClientConfig::default();
///     let camera = CameraClient::new(&config.device.base_url, config.request_timeout())?;
///     run(camera, &config).await
/// }
/// ```
pub async fn run(camera: CameraClient, config: &ClientConfig) -> Result<()> {
    let live = if config.live.enabled {
        Some(LiveChannel::spawn(camera.base_url(), config.live.clone())?)
    } else {
        info!("Live channel disabled");
        None
    };

    let mut runner = TuiRunner::new(camera, live, config)?;
    let result = runner.run().await;

    if let Some(live) = runner.live.take() {
        live.shutdown();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use crate::network::LiveState;
    use tokio::sync::watch;

    #[tokio::test]
    async fn test_sync_live_state_applies_final_state() {
        let (_frames_tx, frames_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(LiveState::Connecting);
        let mut live = LiveHandle::new(frames_rx, state_rx, tokio::spawn(async {}));
        let mut app = App::new(Language::En);

        state_tx.send_replace(LiveState::Connected);
        assert!(sync_live_state(&mut app, &mut live));
        assert_eq!(app.live_state, LiveState::Connected);

        // Nothing new
        assert!(sync_live_state(&mut app, &mut live));
        assert_eq!(app.live_state, LiveState::Connected);

        // Task ends after reporting the disconnect
        state_tx.send_replace(LiveState::Disconnected);
        drop(state_tx);
        assert!(!sync_live_state(&mut app, &mut live));
        assert_eq!(app.live_state, LiveState::Disconnected);
    }
}
