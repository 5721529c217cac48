use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::map::MarkerDescriptor;

use super::color;

/// Render the info popup of a placed marker, centered over `area`
pub fn render(frame: &mut Frame, area: Rect, marker: &MarkerDescriptor) {
    let width = area.width.saturating_sub(4).min(48);
    let height = area.height.saturating_sub(2).min(10);
    if width < 10 || height < 4 {
        return;
    }
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let block = Block::default()
        .title(" Issue ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(lines(marker))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

fn lines(marker: &MarkerDescriptor) -> Vec<Line<'static>> {
    let info = &marker.popup;
    let mut lines = Vec::new();

    if let Some(url) = &info.image_url {
        lines.push(Line::from(vec![
            Span::styled("Image: ", Style::default().fg(Color::Gray)),
            Span::styled(url.clone(), Style::default().fg(Color::Blue).underlined()),
        ]));
    }

    lines.push(Line::from(Span::styled(
        info.title.clone(),
        Style::default().bold().fg(Color::White),
    )));
    lines.push(Line::from(Span::styled(
        info.location.clone(),
        Style::default().fg(Color::Gray),
    )));
    lines.push(Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::Gray)),
        Span::styled(capitalize(&info.status), Style::default().fg(Color::Cyan)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Category: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("● {}", marker.category),
            Style::default().fg(color(marker.color)),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Coords: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{:.4}, {:.4}", marker.position.lat, marker.position.lng),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    lines
}

/// Upper-case the first letter of every word
fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
