use std::time::Instant;

use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Map, MapResolution, Points};
use ratatui::widgets::{Block, Borders};

use crate::issues::IssueId;
use crate::map::{LatLng, ICON_SIZE};
use crate::tui::surface::TerminalMap;

use super::color;

/// Render the map surface with its markers
pub fn render(
    frame: &mut Frame,
    area: Rect,
    map: &TerminalMap,
    selected: Option<&IssueId>,
    focus: Option<LatLng>,
    now: Instant,
) {
    let view = map.view_at(now);
    let block = Block::default()
        .title(format!(
            " Map  {:.4}, {:.4}  z{:.1} ",
            view.center.lat, view.center.lng, view.zoom
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let (x_bounds, y_bounds) = map.canvas_bounds(now);
    let visible = map.visible_bounds(now);
    let radius = map.degrees_per_unit(now) * ICON_SIZE / 2.0;
    let focus = focus.map(|position| map.canvas_point(position, now));

    // Clone data for the closure
    let markers: Vec<((f64, f64), Color, bool, String)> = map
        .markers()
        .filter(|m| visible.contains(m.position))
        .map(|m| {
            (
                map.canvas_point(m.position, now),
                color(m.color),
                selected == Some(&m.id),
                m.popup.title.clone(),
            )
        })
        .collect();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();

            for ((x, y), fill, _, _) in &markers {
                // White ring around a filled dot
                ctx.draw(&Circle {
                    x: *x,
                    y: *y,
                    radius,
                    color: Color::White,
                });
                ctx.draw(&Circle {
                    x: *x,
                    y: *y,
                    radius: radius * 0.6,
                    color: *fill,
                });
                ctx.draw(&Points {
                    coords: &[(*x, *y)],
                    color: *fill,
                });
            }

            // Selected marker on top, with its title
            if let Some(((x, y), _, _, title)) = markers.iter().find(|m| m.2) {
                ctx.layer();
                ctx.draw(&Circle {
                    x: *x,
                    y: *y,
                    radius: radius * 1.6,
                    color: Color::Yellow,
                });

                let label_y = *y + radius * 2.0 * y.to_radians().cos();
                ctx.print(
                    *x,
                    label_y.min(y_bounds[1]),
                    Span::styled(title.clone(), Style::default().fg(Color::White).bold()),
                );
            }

            if let Some((x, y)) = focus {
                ctx.print(
                    x,
                    y,
                    Span::styled("+", Style::default().fg(Color::Yellow)),
                );
            }
        });

    frame.render_widget(canvas, area);
}
