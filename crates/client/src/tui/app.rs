//! TUI application state
//!
//! Holds everything the screen shows: active tab, record button, file
//! list, popup dialogs, and live channel state. Network results only reach
//! it through [`App::apply`].

use protocol::{Calibration, Command, FileEntry, RecordingStatus, Target};
use ratatui::layout::Rect;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::config::Language;
use crate::labels::Labels;
use crate::network::LiveState;

/// Top-level view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Video,
    Files,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Video, Tab::Files];

    /// Stable identifier
    pub fn id(&self) -> &'static str {
        match self {
            Tab::Video => "videoTab",
            Tab::Files => "fileTab",
        }
    }

    pub fn from_id(id: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.id() == id)
    }

    pub fn label(&self, labels: &Labels) -> &'static str {
        match self {
            Tab::Video => labels.video_tab,
            Tab::Files => labels.files_tab,
        }
    }

    pub fn next(&self) -> Tab {
        match self {
            Tab::Video => Tab::Files,
            Tab::Files => Tab::Video,
        }
    }
}

/// Record button view model
///
/// Derived only from the last successful status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordButton {
    pub recording: Option<bool>,
}

impl RecordButton {
    pub fn is_recording(&self) -> bool {
        self.recording == Some(true)
    }

    pub fn label(&self, labels: &Labels) -> &'static str {
        labels.record_label(self.is_recording())
    }
}

/// Input mode for the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Waiting for delete confirmation
    ConfirmDelete { filename: String },
    /// Entering a calibration (`min 36.5`)
    Calibrate { input: String },
    /// Showing help overlay
    Help,
    /// Confirm leaving the UI
    ConfirmQuit,
    /// Confirm stopping the camera service
    ConfirmDeviceQuit,
}

/// User action to be processed by the main loop
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// No action
    None,
    /// Quit the application
    Quit,
    /// Fire-and-forget device command
    Send(Command),
    /// Toggle request plus status poll
    ToggleRecording,
    /// Poll `/is_recording`
    RefreshRecordingStatus,
    /// Fetch the saved file list
    RefreshFileList,
    /// Download a file by server filename
    Download(String),
    /// Delete a file by server filename
    Delete(String),
    /// Report a click on the video
    SendCoordinates(Target),
    /// Pin a temperature reading
    Calibrate(Calibration),
}

/// Result of background work, delivered to the UI loop
#[derive(Debug, Clone)]
pub enum Update {
    RecordingStatus(RecordingStatus),
    RecordingStatusFailed(String),
    FileList(Vec<FileEntry>),
    FileListFailed(String),
    FileDeleted(String),
    DeleteFailed { filename: String, error: String },
    Downloaded { filename: String, path: PathBuf },
    DownloadFailed { filename: String, error: String },
    Calibrated(String),
    CalibrationFailed(String),
    LiveState(LiveState),
}

/// Main application state
pub struct App {
    pub language: Language,
    pub labels: &'static Labels,
    /// Currently shown tab
    pub active_tab: Tab,
    pub record_button: RecordButton,
    /// Local guess flipped on every toggle, never read back from the device
    pub recording_hint: bool,
    /// Saved files in server order
    pub files: Vec<FileEntry>,
    pub selected_file: usize,
    pub input_mode: InputMode,
    /// Status message to display
    pub status_message: Option<String>,
    pub live_state: LiveState,
    /// Screen area the last frame was drawn into
    pub video_area: Option<Rect>,
    /// Should quit flag
    pub should_quit: bool,
}

impl App {
    /// Create a new application state
    pub fn new(language: Language) -> Self {
        Self {
            language,
            labels: Labels::for_language(language),
            active_tab: Tab::Video,
            record_button: RecordButton::default(),
            recording_hint: false,
            files: Vec::new(),
            selected_file: 0,
            input_mode: InputMode::Normal,
            status_message: None,
            live_state: LiveState::Connecting,
            video_area: None,
            should_quit: false,
        }
    }

    /// Make `tab` the only active tab
    ///
    /// Every call asks for a file list refresh, whichever tab is shown.
    pub fn show_tab(&mut self, tab: Tab) -> AppAction {
        self.active_tab = tab;
        AppAction::RefreshFileList
    }

    /// [`App::show_tab`] by identifier; unknown identifiers are ignored
    pub fn show_tab_id(&mut self, id: &str) -> AppAction {
        match Tab::from_id(id) {
            Some(tab) => self.show_tab(tab),
            None => {
                warn!("Unknown tab id '{}'", id);
                AppAction::None
            }
        }
    }

    pub fn next_tab(&mut self) -> AppAction {
        self.show_tab(self.active_tab.next())
    }

    /// Flip the local hint and request a toggle
    pub fn toggle_recording(&mut self) -> AppAction {
        self.recording_hint = !self.recording_hint;
        AppAction::ToggleRecording
    }

    /// Apply a background result
    ///
    /// This is the only place network results change state. The returned
    /// action is a follow-up request, if one is needed.
    pub fn apply(&mut self, update: Update) -> AppAction {
        match update {
            Update::RecordingStatus(status) => {
                self.record_button.recording = Some(status.recording);
                debug!("Recording status: {}", status.recording);
            }
            // Failures are logged by the runner; the UI keeps its state
            Update::RecordingStatusFailed(_)
            | Update::FileListFailed(_)
            | Update::DeleteFailed { .. }
            | Update::DownloadFailed { .. } => {}
            Update::FileList(files) => {
                self.files = files;
                if self.selected_file >= self.files.len() {
                    self.selected_file = self.files.len().saturating_sub(1);
                }
            }
            Update::FileDeleted(filename) => {
                info!("Deleted {}", filename);
                self.set_status(format!("Deleted {}", filename));
                return AppAction::RefreshFileList;
            }
            Update::Downloaded { filename, path } => {
                self.set_status(format!("Saved {} to {}", filename, path.display()));
            }
            Update::Calibrated(message) => {
                self.set_status(message);
            }
            Update::CalibrationFailed(e) => {
                self.set_status(format!("Calibration failed: {}", e));
            }
            Update::LiveState(state) => {
                self.live_state = state;
            }
        }
        AppAction::None
    }

    /// Left click at a terminal cell
    ///
    /// Inside the video area this reports the normalized position;
    /// anywhere else it does nothing.
    pub fn click(&mut self, column: u16, row: u16) -> AppAction {
        if self.active_tab != Tab::Video || self.input_mode != InputMode::Normal {
            return AppAction::None;
        }
        let Some(area) = self.video_area else {
            return AppAction::None;
        };
        if column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return AppAction::None;
        }

        match Target::from_offset(
            f64::from(column - area.x),
            f64::from(row - area.y),
            f64::from(area.width),
            f64::from(area.height),
        ) {
            Some(target) => AppAction::SendCoordinates(target),
            None => AppAction::None,
        }
    }

    /// Currently selected file on the Files tab
    pub fn selected_file(&self) -> Option<&FileEntry> {
        self.files.get(self.selected_file)
    }

    /// Navigate up in the file list
    pub fn navigate_up(&mut self) {
        if self.selected_file > 0 {
            self.selected_file -= 1;
        }
    }

    /// Navigate down in the file list
    pub fn navigate_down(&mut self) {
        if !self.files.is_empty() && self.selected_file < self.files.len() - 1 {
            self.selected_file += 1;
        }
    }

    pub fn download_selected(&self) -> AppAction {
        match self.selected_file() {
            Some(file) => AppAction::Download(file.filename.clone()),
            None => AppAction::None,
        }
    }

    /// Ask for confirmation before deleting the selected file
    pub fn request_delete(&mut self) {
        if let Some(file) = self.selected_file() {
            self.input_mode = InputMode::ConfirmDelete {
                filename: file.filename.clone(),
            };
        }
    }

    pub fn confirm_delete(&mut self) -> AppAction {
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);
        match mode {
            InputMode::ConfirmDelete { filename } => AppAction::Delete(filename),
            other => {
                self.input_mode = other;
                AppAction::None
            }
        }
    }

    /// Handle 'c' key (calibrate)
    pub fn start_calibration(&mut self) {
        self.input_mode = InputMode::Calibrate {
            input: String::new(),
        };
    }

    /// Handle input in Calibrate mode
    pub fn handle_calibration_input(&mut self, c: char) {
        if let InputMode::Calibrate { input } = &mut self.input_mode {
            input.push(c);
        }
    }

    /// Handle backspace in Calibrate mode
    pub fn handle_calibration_backspace(&mut self) {
        if let InputMode::Calibrate { input } = &mut self.input_mode {
            input.pop();
        }
    }

    /// Parse the dialog input; invalid input keeps the dialog open
    pub fn confirm_calibration(&mut self) -> AppAction {
        let InputMode::Calibrate { input } = &self.input_mode else {
            return AppAction::None;
        };
        match input.parse::<Calibration>() {
            Ok(calibration) => {
                self.input_mode = InputMode::Normal;
                AppAction::Calibrate(calibration)
            }
            Err(e) => {
                error!("Invalid calibration '{}': {}", input, e);
                self.set_status(format!("Invalid calibration: {}", e));
                AppAction::None
            }
        }
    }

    /// Cancel current input mode
    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Show help overlay
    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    /// Show quit confirmation
    pub fn show_quit_confirm(&mut self) {
        self.input_mode = InputMode::ConfirmQuit;
    }

    /// Confirm quit
    pub fn confirm_quit(&mut self) {
        self.should_quit = true;
    }

    /// Ask before stopping the camera service
    pub fn request_device_quit(&mut self) {
        self.input_mode = InputMode::ConfirmDeviceQuit;
    }

    pub fn confirm_device_quit(&mut self) -> AppAction {
        self.input_mode = InputMode::Normal;
        AppAction::Send(Command::Quit)
    }

    /// Set status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }
}
