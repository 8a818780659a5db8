//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a live-update banner (only while one is showing), a
//!   scrollable list, and a one-line status bar at the bottom.
//! * The detail view is drawn as a popup over the list.
//! * Colours and styles are defined inline.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Detail};
use crate::source::Item;
use crate::text::html_to_plain;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let banner_height = if app.notification.is_some() { 1 } else { 0 };
    let [banner_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(banner_height),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_banner(app, frame, banner_area);
    draw_feed_list(app, frame, main_area);
    draw_status_bar(app, frame, status_area);

    if let Some(detail) = &app.detail {
        draw_detail(detail, frame, main_area);
    }
}

fn format_time(item: &Item) -> String {
    item.published()
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "no date".into())
}

fn draw_banner(app: &App, frame: &mut Frame, area: Rect) {
    let Some(notification) = &app.notification else {
        return;
    };
    let banner = Paragraph::new(Line::from(Span::styled(
        format!(" {} ", notification.text),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(banner, area);
}

/// Render the scrollable item list.
fn draw_feed_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .rows
        .iter()
        .map(|item| {
            let mut spans = vec![
                Span::styled(
                    format!("{:<17}", format_time(item)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(item.display_title(), Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(
                    format!("[{}] by {}", item.kind.as_str(), item.author()),
                    Style::default().fg(Color::Cyan),
                ),
            ];
            if let Some(score) = item.score {
                spans.push(Span::styled(
                    format!("  {score} pts"),
                    Style::default().fg(Color::Green),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(list_items)
        .block(Block::default().title(" Hacker News ").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn detail_text(detail: &Detail) -> Text<'static> {
    let item = &detail.item;
    let mut lines = vec![Line::from(Span::styled(
        item.display_title().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(url) = &item.url {
        lines.push(Line::from(Span::styled(
            url.clone(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!("{} | by {} | {}", item.kind.as_str(), item.author(), format_time(item)),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::default());

    let body = item.text.as_deref().map(html_to_plain);
    for line in body.as_deref().unwrap_or("(no text)").lines() {
        lines.push(Line::from(line.to_string()));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("Comments ({})", detail.comments.len()),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )));

    for comment in &detail.comments {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("{}  {}", comment.author(), format_time(comment)),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        let text = comment.text.as_deref().map(html_to_plain);
        for line in text.as_deref().unwrap_or("(no text)").lines() {
            lines.push(Line::from(line.to_string()));
        }
    }

    Text::from(lines)
}

/// Render the detail popup over `area`.
fn draw_detail(detail: &Detail, frame: &mut Frame, area: Rect) {
    let [_, popup, _] = Layout::horizontal([
        Constraint::Percentage(5),
        Constraint::Percentage(90),
        Constraint::Percentage(5),
    ])
    .areas(area);

    let paragraph = Paragraph::new(detail_text(detail))
        .block(
            Block::default()
                .title(" Detail  Esc/c: close  j/k: scroll ")
                .borders(Borders::ALL),
        )
        .wrap(Wrap { trim: false })
        .scroll((detail.scroll, 0));

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} items", app.rows.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  Enter: open  m: load more"),
    ]));
    frame.render_widget(status, area);
}
