use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::app::{AppState, IssueBoard};
use crate::error::TuiError;
use crate::issues::Issue;
use crate::map::{CategoryPalette, IssueMap, MapSurface};
use crate::tasks::FetcherCommand;

use super::surface::TerminalMap;
use super::widgets::{issue_list, legend, map_canvas, popup};

/// Cells moved per pan key press
const PAN_STEP: f64 = 10.0;

/// State of the issue feed, shown in the header
enum FeedStatus {
    Loading,
    Ready,
    Refreshing,
    Error,
}

/// Screen regions
struct Panels {
    header: Rect,
    list: Rect,
    legend: Rect,
    map: Rect,
    footer: Rect,
}

impl Panels {
    fn split(area: Rect) -> Self {
        // Main layout: header, body, footer
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(10),   // Body
                Constraint::Length(3), // Footer
            ])
            .split(area);

        // Body layout: left panel (35%) + map (65%)
        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(main_chunks[1]);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(6),     // Issues
                Constraint::Length(10), // Legend
            ])
            .split(body_chunks[0]);

        Self {
            header: main_chunks[0],
            list: left_chunks[0],
            legend: left_chunks[1],
            map: body_chunks[1],
            footer: main_chunks[2],
        }
    }

    /// Map area inside its border
    fn map_inner(&self) -> Rect {
        Block::default().borders(Borders::ALL).inner(self.map)
    }
}

/// TUI application state
pub struct TuiApp {
    state: Arc<AppState>,
    cmd_tx: mpsc::Sender<FetcherCommand>,
    terminal: Terminal<CrosstermBackend<Stdout>>,

    // Map core and the surface it drives
    surface: TerminalMap,
    issue_map: IssueMap,

    // Issues, selection and focus
    board: IssueBoard,

    // Display state
    status: FeedStatus,
    fetched_at: Option<SystemTime>,
    last_error: Option<String>,
}

impl TuiApp {
    /// Create a new TUI application
    pub fn new(
        state: Arc<AppState>,
        cmd_tx: mpsc::Sender<FetcherCommand>,
    ) -> Result<Self, TuiError> {
        // Set up terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        // Size the map before the first fit so it resolves against the real area
        let (cols, rows) = crossterm::terminal::size()?;
        let inner = Panels::split(Rect::new(0, 0, cols, rows)).map_inner();
        let mut surface = TerminalMap::new();
        surface.resize(inner.width, inner.height);

        let issue_map = IssueMap::new(
            CategoryPalette::default(),
            state.settings.viewport.clone(),
            &mut surface,
        );
        let board = IssueBoard::new(state.settings.initial_focus);

        Ok(Self {
            state,
            cmd_tx,
            terminal,
            surface,
            issue_map,
            board,
            status: FeedStatus::Loading,
            fetched_at: None,
            last_error: None,
        })
    }

    /// Restore terminal state
    fn restore_terminal(&mut self) -> Result<(), TuiError> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// A fetch started
    pub fn set_fetching(&mut self) {
        self.status = if self.fetched_at.is_none() {
            FeedStatus::Loading
        } else {
            FeedStatus::Refreshing
        };
    }

    /// New issue list from the fetcher
    pub fn set_issues(&mut self, issues: Vec<Issue>, fetched_at: SystemTime) {
        self.board.set_issues(issues);
        self.mark_fetched(fetched_at);
    }

    /// Fetch succeeded with the same list
    pub fn mark_fetched(&mut self, fetched_at: SystemTime) {
        self.fetched_at = Some(fetched_at);
        self.status = FeedStatus::Ready;
        self.last_error = None;
    }

    /// Update display with error
    pub fn set_error(&mut self, message: String) {
        self.status = FeedStatus::Error;
        self.last_error = Some(message);
    }

    /// Re-evaluate the map if issues or focus changed, then advance animations
    pub fn update(&mut self) {
        if self.board.take_dirty() {
            let update = self.issue_map.on_inputs_changed(
                &mut self.surface,
                self.board.issues(),
                self.board.focus_target(),
            );
            debug!(
                mapped = update.mapped,
                added = update.markers.added.len(),
                removed = update.markers.removed.len(),
                moved = update.viewport.is_some(),
                flew = update.viewport.as_ref().is_some_and(|d| d.is_fly_to()),
                zoom = self.issue_map.viewport().view().zoom,
                "Map re-evaluated"
            );
        }

        self.surface.tick(Instant::now());
    }

    /// Draw the TUI
    pub fn draw(&mut self) -> Result<(), TuiError> {
        let now = Instant::now();
        let surface = &mut self.surface;
        let board = &self.board;
        let palette = self.issue_map.palette();
        let source = self.state.settings.source.as_str();
        let fetched_at = self.fetched_at;
        let status = &self.status;
        let last_error = self.last_error.as_deref();

        self.terminal.draw(|frame| {
            let panels = Panels::split(frame.area());

            // Keep the surface in step with the terminal size
            let inner = panels.map_inner();
            surface.resize(inner.width, inner.height);

            render_header(frame, panels.header, status, board.mapped_count(), surface.is_animating(now));
            issue_list::render(frame, panels.list, board, palette);
            legend::render(frame, panels.legend, palette, source, fetched_at);

            let selected = board.selected_issue();
            let focus = board.focus_target().and_then(|f| f.position());
            map_canvas::render(
                frame,
                panels.map,
                surface,
                selected.map(|issue| &issue.id),
                focus,
                now,
            );

            if board.popup_open() {
                if let Some(marker) = selected.and_then(|issue| surface.marker(&issue.id)) {
                    popup::render(frame, panels.map, marker);
                }
            }

            render_footer(frame, panels.footer, last_error);
        })?;

        Ok(())
    }

    /// Handle keyboard input (non-blocking)
    pub async fn handle_input(&mut self) -> Result<bool, TuiError> {
        // Poll for events with a short timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let now = Instant::now();
                    match key.code {
                        KeyCode::Char('q') => {
                            info!("Quit requested");
                            self.state.quit();
                            let _ = self.cmd_tx.send(FetcherCommand::Quit).await;
                            return Ok(true); // Signal quit
                        }
                        KeyCode::Down | KeyCode::Char('j') => self.board.select_next(),
                        KeyCode::Up | KeyCode::Char('k') => self.board.select_previous(),
                        KeyCode::Enter => {
                            debug!("Toggle focus");
                            self.board.toggle_focus();
                        }
                        KeyCode::Esc => {
                            debug!("Release focus");
                            self.board.clear_focus();
                        }
                        KeyCode::Char('p') => {
                            let on_map = self
                                .board
                                .selected_issue()
                                .is_some_and(|issue| self.surface.marker(&issue.id).is_some());
                            self.board.toggle_popup(on_map);
                        }
                        KeyCode::Char('+') | KeyCode::Char('=') => self.surface.zoom(1.0, now),
                        KeyCode::Char('-') => self.surface.zoom(-1.0, now),
                        KeyCode::Char('H') => self.surface.pan(-PAN_STEP, 0.0, now),
                        KeyCode::Char('L') => self.surface.pan(PAN_STEP, 0.0, now),
                        KeyCode::Char('K') => self.surface.pan(0.0, -PAN_STEP / 2.0, now),
                        KeyCode::Char('J') => self.surface.pan(0.0, PAN_STEP / 2.0, now),
                        KeyCode::Char('r') => {
                            debug!("Refresh requested");
                            let _ = self.cmd_tx.send(FetcherCommand::Refresh).await;
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(false)
    }

    /// Run cleanup on drop
    pub fn cleanup(&mut self) {
        if let Err(e) = self.restore_terminal() {
            error!(error = %e, "Failed to restore terminal");
        }
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Render the header bar
fn render_header(frame: &mut Frame, area: Rect, status: &FeedStatus, mapped: usize, moving: bool) {
    let status_text = match status {
        FeedStatus::Loading => ("LOADING", Color::Yellow),
        FeedStatus::Ready => ("LIVE", Color::Green),
        FeedStatus::Refreshing => ("REFRESHING", Color::Cyan),
        FeedStatus::Error => ("ERROR", Color::Red),
    };

    let mut spans = vec![
        Span::styled(" issuemap ", Style::default().bold().fg(Color::Cyan)),
        Span::raw("| "),
        Span::styled(status_text.0, Style::default().fg(status_text.1)),
        Span::raw(format!(" | {} on the map", mapped)),
    ];
    if moving {
        spans.push(Span::styled(" | moving", Style::default().fg(Color::DarkGray)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans)).block(block).centered();
    frame.render_widget(paragraph, area);
}

/// Render the footer with controls
fn render_footer(frame: &mut Frame, area: Rect, error: Option<&str>) {
    let controls = if let Some(err) = error {
        Line::from(vec![
            Span::styled("Error: ", Style::default().fg(Color::Red)),
            Span::styled(err, Style::default().fg(Color::Red)),
        ])
    } else {
        Line::from(vec![
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(":quit  "),
            Span::styled("j/k", Style::default().fg(Color::Yellow)),
            Span::raw(":select  "),
            Span::styled("enter", Style::default().fg(Color::Yellow)),
            Span::raw(":focus  "),
            Span::styled("esc", Style::default().fg(Color::Yellow)),
            Span::raw(":fit all  "),
            Span::styled("p", Style::default().fg(Color::Yellow)),
            Span::raw(":popup  "),
            Span::styled("+/-", Style::default().fg(Color::Yellow)),
            Span::raw(":zoom  "),
            Span::styled("HJKL", Style::default().fg(Color::Yellow)),
            Span::raw(":pan  "),
            Span::styled("r", Style::default().fg(Color::Yellow)),
            Span::raw(":refresh"),
        ])
    };

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(controls).block(block).centered();
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panels_cover_terminal() {
        let panels = Panels::split(Rect::new(0, 0, 120, 40));
        assert_eq!(panels.header.height, 3);
        assert_eq!(panels.footer.height, 3);
        assert_eq!(panels.legend.height, 10);
        assert_eq!(panels.list.width + panels.map.width, 120);

        let inner = panels.map_inner();
        assert_eq!(inner.width, panels.map.width - 2);
        assert_eq!(inner.height, panels.map.height - 2);
    }
}
