use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::models::format_clock;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(13),
        Constraint::Fill(1),
    ])
    .split(area);

    let time_limit = match app.time_limit_seconds() {
        Some(seconds) => format!("{} time limit", format_clock(seconds)),
        None => "Untimed".to_string(),
    };
    let details = format!("{} Questions · {}", app.questions().len(), time_limit);

    let profile = app.user.profile();
    let greeting = format!("{} · {}", app.user.display_name, profile.dashboard_title);

    let history = match app.best_score() {
        Some(best) => format!(
            "{} previous attempts · best {}%",
            app.history().len(),
            best
        ),
        None => "No previous attempts".to_string(),
    };

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            app.title().to_uppercase(),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(details, Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(greeting, Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(history, Style::default().fg(Color::DarkGray))),
        Line::from(""),
    ];

    if app.is_preview() {
        content.push(Line::from(
            "Preview mode · results are not saved".fg(Color::Yellow),
        ));
    } else {
        content.push(Line::from(""));
    }

    content.extend([
        Line::from(""),
        Line::from(Span::styled(
            "ENTER",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from("to start · q to quit".fg(Color::DarkGray)),
    ]);

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, chunks[1]);
}
