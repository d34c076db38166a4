//! TUI event handling
//!
//! Handles keyboard and mouse input using crossterm and dispatches actions
//! to the application.

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use protocol::Command;
use std::time::Duration;

use super::app::{App, AppAction, InputMode, Tab};

/// Event handler for TUI input
pub struct EventHandler {
    /// Tick rate for polling events
    tick_rate: Duration,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    /// Create a new event handler
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(100),
        }
    }

    /// Create event handler with custom tick rate
    pub fn with_tick_rate(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Poll for next event
    ///
    /// Returns Some(Event) if an event occurred, None if tick timeout elapsed.
    pub fn poll(&self) -> Result<Option<Event>> {
        if event::poll(self.tick_rate)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Handle a key event and return the resulting action
    pub fn handle_key(&self, app: &mut App, key: KeyEvent) -> AppAction {
        // Handle based on current input mode
        match &app.input_mode {
            InputMode::Normal => self.handle_normal_mode(app, key),
            InputMode::ConfirmDelete { .. } => self.handle_confirm_delete_mode(app, key),
            InputMode::Calibrate { .. } => self.handle_calibrate_mode(app, key),
            InputMode::Help => self.handle_help_mode(app, key),
            InputMode::ConfirmQuit => self.handle_confirm_quit_mode(app, key),
            InputMode::ConfirmDeviceQuit => self.handle_confirm_device_quit_mode(app, key),
        }
    }

    /// Handle a mouse event; only left clicks do anything
    pub fn handle_mouse(&self, app: &mut App, mouse: MouseEvent) -> AppAction {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => app.click(mouse.column, mouse.row),
            _ => AppAction::None,
        }
    }

    /// Handle key events in normal navigation mode
    fn handle_normal_mode(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match key.code {
            // Quit
            KeyCode::Char('q') => {
                app.show_quit_confirm();
                AppAction::None
            }
            // Ctrl+C for immediate quit
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => AppAction::Quit,

            // Tabs
            KeyCode::Tab | KeyCode::BackTab => app.next_tab(),
            KeyCode::Char('1') | KeyCode::Char('v') => app.show_tab(Tab::Video),
            KeyCode::Char('2') | KeyCode::Char('f') => app.show_tab(Tab::Files),

            // Toolbar
            KeyCode::Char(' ') => app.toggle_recording(),
            KeyCode::Char('p') => AppAction::Send(Command::TakePhoto),
            KeyCode::Char('m') => AppAction::Send(Command::FlipImage),
            KeyCode::Char('o') => AppAction::Send(Command::RotateImage),
            KeyCode::Char('h') => AppAction::Send(Command::CycleHud),
            KeyCode::Char('x') => {
                app.request_device_quit();
                AppAction::None
            }
            KeyCode::Char('s') => AppAction::RefreshRecordingStatus,
            KeyCode::Char('c') => {
                app.start_calibration();
                AppAction::None
            }

            // Help
            KeyCode::Char('?') => {
                app.show_help();
                AppAction::None
            }

            _ if app.active_tab == Tab::Files => self.handle_file_list_key(app, key),
            _ => AppAction::None,
        }
    }

    /// Keys that only apply to the file list
    fn handle_file_list_key(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                app.navigate_up();
                AppAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.navigate_down();
                AppAction::None
            }
            KeyCode::Enter => app.download_selected(),
            KeyCode::Char('d') | KeyCode::Delete => {
                app.request_delete();
                AppAction::None
            }
            KeyCode::Char('r') => AppAction::RefreshFileList,
            _ => AppAction::None,
        }
    }

    /// Handle key events in delete confirmation mode
    fn handle_confirm_delete_mode(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.cancel_input();
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    /// Handle key events in calibration input mode
    fn handle_calibrate_mode(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Esc => {
                app.cancel_input();
                AppAction::None
            }
            KeyCode::Enter => app.confirm_calibration(),
            KeyCode::Backspace => {
                app.handle_calibration_backspace();
                AppAction::None
            }
            KeyCode::Char(c) => {
                if c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '-') {
                    app.handle_calibration_input(c);
                }
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    /// Handle key events in help overlay mode
    fn handle_help_mode(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q') => {
                app.cancel_input();
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    /// Handle key events in quit confirmation mode
    fn handle_confirm_quit_mode(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.confirm_quit();
                AppAction::Quit
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.cancel_input();
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    /// Handle key events while asking to stop the camera service
    fn handle_confirm_device_quit_mode(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_device_quit(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.cancel_input();
                AppAction::None
            }
            _ => AppAction::None,
        }
    }
}
