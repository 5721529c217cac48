use std::time::SystemTime;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::map::CategoryPalette;

use super::color;

/// Render the category legend and feed info
pub fn render(
    frame: &mut Frame,
    area: Rect,
    palette: &CategoryPalette,
    source: &str,
    fetched_at: Option<SystemTime>,
) {
    let block = Block::default()
        .title(" Legend ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut lines: Vec<Line> = palette
        .entries()
        .map(|(category, rgb)| {
            Line::from(vec![
                Span::styled("● ", Style::default().fg(color(rgb))),
                Span::styled(category.to_string(), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    lines.push(Line::from(vec![
        Span::styled("● ", Style::default().fg(color(palette.fallback()))),
        Span::styled("other", Style::default().fg(Color::Gray)),
    ]));

    // Truncate long sources
    let len = source.chars().count();
    let source_display = if len > 28 {
        let tail: String = source.chars().skip(len - 25).collect();
        format!("...{}", tail)
    } else {
        source.to_string()
    };

    let updated = match fetched_at.and_then(|t| t.elapsed().ok()) {
        Some(age) => format!("{}s ago", age.as_secs()),
        None => String::from("never"),
    };

    lines.push(Line::from(vec![
        Span::styled("Source: ", Style::default().fg(Color::Gray)),
        Span::styled(source_display, Style::default().fg(Color::Magenta)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Updated: ", Style::default().fg(Color::Gray)),
        Span::styled(updated, Style::default().fg(Color::White)),
    ]));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
