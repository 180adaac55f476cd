use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::QuizPicker;
use crate::models::format_clock;

pub fn render(frame: &mut Frame, area: Rect, picker: &QuizPicker) {
    let height = (picker.quizzes().len() as u16).saturating_add(9).min(area.height);
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .split(area);

    let profile = picker.user.profile();
    let greeting = format!("{} · {}", picker.user.display_name, profile.dashboard_title);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "CHOOSE A QUIZ",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(greeting, Style::default().fg(Color::DarkGray))),
        Line::from(""),
    ];

    for (i, quiz) in picker.quizzes().iter().enumerate() {
        let time_limit = match quiz.time_limit_seconds {
            Some(seconds) => format_clock(seconds),
            None => "untimed".to_string(),
        };
        let text = format!(
            "{} · {} questions · {}",
            quiz.title, quiz.question_count, time_limit
        );

        let line = if i == picker.selected() {
            Line::from(Span::styled(
                format!("> {} <", text),
                Style::default().fg(Color::Green).bold(),
            ))
        } else {
            Line::from(Span::styled(text, Style::default().fg(Color::White)))
        };
        content.push(line);
    }

    content.extend([
        Line::from(""),
        Line::from("j/k to move · ENTER to open · q to quit".fg(Color::DarkGray)),
    ]);

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, chunks[1]);
}
