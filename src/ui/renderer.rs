use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::app::App;

pub fn ui(f: &mut Frame, app: &App) {
    let constraints = if app.show_greeting() {
        vec![
            Constraint::Percentage(40),
            Constraint::Min(0),
            Constraint::Length(3),
        ]
    } else {
        vec![Constraint::Min(0), Constraint::Length(3)]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let (messages_area, input_area) = if app.show_greeting() {
        render_greeting(f, app, chunks[0]);
        (chunks[1], chunks[2])
    } else {
        (chunks[0], chunks[1])
    };

    let lines = app.build_display_lines();

    // Account for the title line.
    let available_height = messages_area.height.saturating_sub(1);
    let max_offset = app.calculate_max_scroll_offset(available_height);
    let scroll_offset = if app.auto_scroll {
        max_offset
    } else {
        app.scroll_offset.min(max_offset)
    };

    let title = format!(
        "Causerie v{} ({})",
        env!("CARGO_PKG_VERSION"),
        app.endpoint.model
    );

    let messages_paragraph = Paragraph::new(lines)
        .block(Block::default().title(title))
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));

    f.render_widget(messages_paragraph, messages_area);

    let input_title = if app.session.is_busy() {
        "● Waiting for a reply… (Enter to send, Ctrl+C to quit)"
    } else {
        "Type your message (Enter to send, Ctrl+C to quit)"
    };

    let input_style = if app.session.is_busy() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let input = Paragraph::new(app.input.as_str())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(input_title));

    f.render_widget(input, input_area);

    f.set_cursor_position((
        input_area.x + app.input.as_str().width() as u16 + 1,
        input_area.y + 1,
    ));
}

fn render_greeting(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    // Vertically center the single banner line inside its chunk.
    let pad = area.height.saturating_sub(1) / 2;
    let mut lines: Vec<Line> = (0..pad).map(|_| Line::from("")).collect();
    lines.push(
        Line::from(app.greeting.displayed())
            .style(Style::default().add_modifier(Modifier::BOLD)),
    );

    let banner = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(banner, area);
}
