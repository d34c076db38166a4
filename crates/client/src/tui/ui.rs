//! TUI rendering with ratatui
//!
//! Renders the terminal user interface using ratatui widgets and layouts.

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Widget, Wrap},
};

use super::app::{App, InputMode, Tab};
use crate::network::{LiveState, VideoFrame};
use protocol::Command;

/// Colors used in the UI
mod colors {
    use ratatui::style::Color;

    pub const CONNECTED: Color = Color::Green;
    pub const CONNECTING: Color = Color::Yellow;
    pub const DISCONNECTED: Color = Color::Red;

    pub const RECORDING: Color = Color::Red;
    pub const IDLE: Color = Color::Black;
    pub const BUTTON_BG: Color = Color::Gray;

    pub const ACTIVE_BORDER: Color = Color::Cyan;
    pub const INACTIVE_BORDER: Color = Color::Gray;

    pub const HIGHLIGHT_BG: Color = Color::DarkGray;
    pub const STATUS_BAR_BG: Color = Color::Blue;
    pub const HELP_BAR_BG: Color = Color::DarkGray;
}

/// Render the complete UI
///
/// Returns the area the video frame occupies, if the Video tab is shown.
pub fn render(frame: &mut Frame, app: &App, video: Option<&VideoFrame>) -> Option<Rect> {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Length(1), // Tabs
            Constraint::Min(4),    // Tab content
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_status_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    let video_area = match app.active_tab {
        Tab::Video => Some(render_video_tab(frame, app, video, chunks[2])),
        Tab::Files => {
            render_file_list(frame, app, chunks[2]);
            None
        }
    };
    render_help_bar(frame, app, chunks[3]);

    // Render overlays based on input mode
    match &app.input_mode {
        InputMode::ConfirmDelete { filename } => {
            render_delete_dialog(frame, app, filename);
        }
        InputMode::Calibrate { input } => {
            render_calibrate_dialog(frame, input);
        }
        InputMode::Help => {
            render_help_overlay(frame);
        }
        InputMode::ConfirmQuit => {
            render_quit_dialog(frame);
        }
        InputMode::ConfirmDeviceQuit => {
            render_device_quit_dialog(frame);
        }
        InputMode::Normal => {}
    }

    video_area
}

/// Render the top status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (live_text, live_color) = match app.live_state {
        LiveState::Connected => ("live", colors::CONNECTED),
        LiveState::Connecting => ("connecting", colors::CONNECTING),
        LiveState::Disconnected => ("offline", colors::DISCONNECTED),
    };

    let status_message = app
        .status_message
        .as_ref()
        .map(|m| format!(" | {}", m))
        .unwrap_or_default();

    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(" Video: ", Style::default().fg(Color::White)),
        Span::styled(live_text, Style::default().fg(live_color)),
        Span::styled(status_message, Style::default().fg(Color::Yellow)),
    ]))
    .style(Style::default().bg(colors::STATUS_BAR_BG))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" topdon-remote ")
            .title_style(Style::default().add_modifier(Modifier::BOLD)),
    );

    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| Line::from(tab.label(app.labels)))
        .collect();
    let selected = Tab::ALL
        .iter()
        .position(|tab| *tab == app.active_tab)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(colors::INACTIVE_BORDER))
        .highlight_style(
            Style::default()
                .fg(colors::ACTIVE_BORDER)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        );

    frame.render_widget(tabs, area);
}

/// Toolbar over the video, returns the area the frame was drawn into
fn render_video_tab(
    frame: &mut Frame,
    app: &App,
    video: Option<&VideoFrame>,
    area: Rect,
) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    render_toolbar(frame, app, chunks[0]);

    let video_area = chunks[1];
    match video {
        Some(video) => frame.render_widget(VideoView { frame: video }, video_area),
        None => {
            let paragraph = Paragraph::new(app.labels.no_frame)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, video_area);
        }
    }
    video_area
}

fn render_toolbar(frame: &mut Frame, app: &App, area: Rect) {
    let record_color = if app.record_button.is_recording() {
        colors::RECORDING
    } else {
        colors::IDLE
    };

    let mut spans = vec![Span::styled(
        format!(" ● {} ", app.record_button.label(app.labels)),
        Style::default()
            .fg(record_color)
            .bg(colors::BUTTON_BG)
            .add_modifier(Modifier::BOLD),
    )];

    for (key, command) in [
        ("p", Command::TakePhoto),
        ("m", Command::FlipImage),
        ("o", Command::RotateImage),
        ("h", Command::CycleHud),
        ("x", Command::Quit),
    ] {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("[{}] {}", key, app.labels.command_label(command)),
            Style::default().fg(Color::White),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the saved file list
fn render_file_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::ACTIVE_BORDER))
        .title(format!(" {} ({}) ", app.labels.files_tab, app.files.len()));

    if app.files.is_empty() {
        let paragraph = Paragraph::new(app.labels.no_files)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .files
        .iter()
        .map(|file| {
            ListItem::new(Line::from(vec![
                Span::raw(file.display_name()),
                Span::raw("  "),
                Span::styled(
                    format!("[{}]", app.labels.download),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("[{}]", app.labels.delete),
                    Style::default().fg(Color::Red),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(colors::HIGHLIGHT_BG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected_file));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Draws a frame with half blocks, two image rows per terminal row
///
/// The image is stretched to fill the area so a cell offset maps
/// linearly to an image position.
struct VideoView<'a> {
    frame: &'a VideoFrame,
}

impl Widget for VideoView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.frame.width == 0 || self.frame.height == 0
        {
            return;
        }

        let rows = u32::from(area.height) * 2;
        for cy in 0..area.height {
            let top_y = (u32::from(cy) * 2) * self.frame.height / rows;
            let bottom_y = (u32::from(cy) * 2 + 1) * self.frame.height / rows;
            for cx in 0..area.width {
                let x = u32::from(cx) * self.frame.width / u32::from(area.width);
                let [tr, tg, tb] = self.frame.pixel(x, top_y);
                let [br, bg, bb] = self.frame.pixel(x, bottom_y);
                if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                    cell.set_char('▀')
                        .set_fg(Color::Rgb(tr, tg, tb))
                        .set_bg(Color::Rgb(br, bg, bb));
                }
            }
        }
    }
}

/// Render the bottom help bar
fn render_help_bar(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match &app.input_mode {
        InputMode::Normal => match app.active_tab {
            Tab::Video => {
                "Tab: Files | Space: Record | p/m/o/h: Toolbar | Click: Target | c: Calibrate | q: Quit | ?: Help"
            }
            Tab::Files => {
                "Tab: Video | j/k: Navigate | Enter: Download | d: Delete | r: Refresh | q: Quit | ?: Help"
            }
        },
        InputMode::Calibrate { .. } => "Enter: Confirm | Esc: Cancel",
        InputMode::Help => "Press any key to close",
        InputMode::ConfirmDelete { .. } | InputMode::ConfirmDeviceQuit => "y: Confirm | n: Cancel",
        InputMode::ConfirmQuit => "y: Quit | n: Cancel",
    };

    let paragraph = Paragraph::new(help_text)
        .style(Style::default().fg(Color::White).bg(colors::HELP_BAR_BG))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Render the delete confirmation dialog
fn render_delete_dialog(frame: &mut Frame, app: &App, filename: &str) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let text = Text::from(vec![
        Line::from(""),
        Line::from(Span::styled(
            app.labels.delete_prompt(filename),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(app.labels.yes_no),
    ]);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title(format!(" {} ", app.labels.delete))
                .title_style(Style::default().add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Render the calibration input dialog
fn render_calibrate_dialog(frame: &mut Frame, input: &str) {
    let area = centered_rect(60, 20, frame.area());

    // Clear the area first
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Calibrate ")
        .title_style(Style::default().add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::ACTIVE_BORDER));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Label
            Constraint::Length(3), // Input
            Constraint::Min(0),    // Spacing
        ])
        .split(inner);

    let label = Paragraph::new("Reading and temperature (e.g. max 36.5):")
        .style(Style::default().fg(Color::White));
    frame.render_widget(label, chunks[0]);

    let input_text = format!("{}_", input); // Show cursor
    let input_widget = Paragraph::new(input_text)
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(input_widget, chunks[1]);
}

/// Render the help overlay
fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(70, 70, frame.area());

    // Clear the area first
    frame.render_widget(Clear, area);

    let heading = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ))
    };

    let help_text = Text::from(vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(""),
        heading("Tabs"),
        Line::from("  Tab          Switch tab"),
        Line::from("  1 / v        Video"),
        Line::from("  2 / f        Saved files"),
        Line::from(""),
        heading("Camera"),
        Line::from("  Space        Start/stop recording"),
        Line::from("  p            Take photo"),
        Line::from("  m            Flip image"),
        Line::from("  o            Rotate image"),
        Line::from("  h            Cycle HUD"),
        Line::from("  s            Refresh recording status"),
        Line::from("  c            Calibrate temperature"),
        Line::from("  Click        Set target on the video"),
        Line::from("  x            Stop the camera service"),
        Line::from(""),
        heading("Saved Files"),
        Line::from("  Up / k       Move selection up"),
        Line::from("  Down / j     Move selection down"),
        Line::from("  Enter        Download selected file"),
        Line::from("  d / Del      Delete selected file"),
        Line::from("  r            Refresh file list"),
        Line::from(""),
        heading("General"),
        Line::from("  ?            Show this help"),
        Line::from("  q            Quit (with confirmation)"),
        Line::from("  Ctrl+C       Quit immediately"),
    ]);

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .title_style(Style::default().add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors::ACTIVE_BORDER)),
        )
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

fn render_confirm_dialog(frame: &mut Frame, title: &str, question: &str, detail: &str) {
    let area = centered_rect(40, 15, frame.area());

    // Clear the area first
    frame.render_widget(Clear, area);

    let text = Text::from(vec![
        Line::from(""),
        Line::from(Span::styled(
            question.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(detail.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [Y]es  ", Style::default().fg(Color::Green)),
            Span::styled("  [N]o  ", Style::default().fg(Color::Red)),
        ]),
    ]);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title(format!(" {} ", title))
                .title_style(Style::default().add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Render the quit confirmation dialog
fn render_quit_dialog(frame: &mut Frame) {
    render_confirm_dialog(
        frame,
        "Quit",
        "Are you sure you want to quit?",
        "The camera keeps running.",
    );
}

fn render_device_quit_dialog(frame: &mut Frame) {
    render_confirm_dialog(
        frame,
        "Stop Camera",
        "Stop the camera service?",
        "Video and controls stay unavailable until it is restarted.",
    );
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use crate::tui::app::Update;
    use common::test_utils::create_mock_file_entry;
    use protocol::RecordingStatus;
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(app: &App, video: Option<&VideoFrame>) -> (String, Option<Rect>) {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut video_area = None;
        terminal
            .draw(|f| video_area = render(f, app, video))
            .unwrap();
        let text = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        (text, video_area)
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(50, 50, area);

        // Should be centered
        assert!(centered.x > 0);
        assert!(centered.y > 0);
        assert!(centered.x + centered.width < area.width);
        assert!(centered.y + centered.height < area.height);
    }

    #[test]
    fn test_video_tab_shows_record_label() {
        let mut app = App::new(Language::En);
        let (text, video_area) = draw(&app, None);
        assert!(text.contains("Start Recording"));
        assert!(text.contains("Waiting for video"));
        assert!(video_area.is_some());

        app.apply(Update::RecordingStatus(RecordingStatus { recording: true }));
        let (text, _) = draw(&app, None);
        assert!(text.contains("Stop Recording"));
    }

    #[test]
    fn test_files_tab_rows() {
        let mut app = App::new(Language::De);
        app.show_tab(Tab::Files);
        app.apply(Update::FileList(vec![create_mock_file_entry("img1", "jpg")]));

        let (text, video_area) = draw(&app, None);
        assert!(video_area.is_none());
        assert!(text.contains("gespeicherte Dateien"));
        assert!(text.contains("img1.jpg"));
        assert!(text.contains("[Download]"));
        assert!(text.contains("[Löschen]"));
    }

    #[test]
    fn test_delete_dialog_names_file() {
        let mut app = App::new(Language::En);
        app.show_tab(Tab::Files);
        app.apply(Update::FileList(vec![create_mock_file_entry("a", "png")]));
        app.request_delete();

        let (text, _) = draw(&app, None);
        assert!(text.contains("\"a.png\""));
    }

    #[test]
    fn test_video_view_fills_area() {
        let frame = VideoFrame {
            width: 2,
            height: 2,
            rgb: vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
        };
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        VideoView { frame: &frame }.render(area, &mut buf);

        assert_eq!(buf[(0, 0)].symbol(), "▀");
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(255, 0, 0));
        assert_eq!(buf[(3, 0)].fg, Color::Rgb(0, 255, 0));
        assert_eq!(buf[(0, 1)].bg, Color::Rgb(0, 0, 255));
        assert_eq!(buf[(3, 1)].bg, Color::Rgb(255, 255, 255));
    }
}
