use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::IssueBoard;
use crate::map::CategoryPalette;

use super::color;

/// Lines each issue takes in the list
const ITEM_HEIGHT: u16 = 2;

/// Render the issue list with the selection and focus markers
pub fn render(frame: &mut Frame, area: Rect, board: &IssueBoard, palette: &CategoryPalette) {
    let issues = board.issues();
    let unmapped = issues.len() - board.mapped_count();

    let title = if unmapped > 0 {
        format!(" Issues ({}, {} without location) ", issues.len(), unmapped)
    } else {
        format!(" Issues ({}) ", issues.len())
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let lines: Vec<Line> = if issues.is_empty() {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "No issues yet...",
                Style::default().fg(Color::DarkGray).italic(),
            )),
        ]
    } else {
        // Scroll so the selection stays visible
        let visible = (area.height.saturating_sub(2) / ITEM_HEIGHT).max(1) as usize;
        let offset = (board.selected_index() + 1).saturating_sub(visible);

        issues
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .flat_map(|(i, issue)| {
                let is_selected = i == board.selected_index();
                let is_focused = board.focused_issue() == Some(&issue.id);
                let position = issue.position();

                let bullet = match position {
                    Some(_) => Span::styled(
                        "● ",
                        Style::default().fg(color(palette.color_for(&issue.category))),
                    ),
                    None => Span::styled("○ ", Style::default().fg(Color::DarkGray)),
                };
                let cursor = if is_selected {
                    Span::styled("▶ ", Style::default().fg(Color::Yellow))
                } else {
                    Span::raw("  ")
                };
                let name_style = if is_selected {
                    Style::default().fg(Color::White).bold()
                } else {
                    Style::default().fg(Color::Gray)
                };

                let mut first = vec![cursor, bullet, Span::styled(issue.title.clone(), name_style)];
                if is_focused {
                    first.push(Span::styled(" ◎", Style::default().fg(Color::Yellow)));
                }

                let detail = match position {
                    Some(_) => Span::styled(
                        format!("{} | {}", issue.location, issue.status),
                        Style::default().fg(Color::DarkGray),
                    ),
                    None => Span::styled(
                        "no location",
                        Style::default().fg(Color::DarkGray).italic(),
                    ),
                };

                vec![Line::from(first), Line::from(vec![Span::raw("    "), detail])]
            })
            .collect()
    };

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
