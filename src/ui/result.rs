use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::models::{Completion, Outcome, QuizResult, format_clock};

use super::grade_color;

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(view) = app.view() else {
        return;
    };
    let Some(result) = &view.snapshot.result else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], result);
    render_question_breakdown(frame, chunks[2], app, result);
    render_save_status(frame, chunks[3], view.saved, view.notice.as_deref(), app.is_preview());
    render_controls(frame, chunks[4]);
}

fn render_score_summary(frame: &mut Frame, area: Rect, result: &QuizResult) {
    let grade = grade_color(result.score_percent, result.pass);
    let verdict = if result.pass { "PASSED" } else { "NOT PASSED" };
    let how = match result.completion {
        Completion::Submitted => "Submitted",
        Completion::Expired => "Time expired",
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} / {}  ({}%)  {}",
                result.correct_count, result.total_questions, result.score_percent, verdict
            ),
            Style::default().fg(grade).bold(),
        )),
        Line::from(Span::styled(
            format!(
                "{} / {} points · {} in {}",
                result.points_earned,
                result.points_possible,
                how,
                format_clock(result.time_spent_seconds)
            ),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_question_breakdown(frame: &mut Frame, area: Rect, app: &App, result: &QuizResult) {
    let lines: Vec<Line> = result
        .outcomes
        .iter()
        .enumerate()
        .map(|(index, outcome)| {
            let (symbol, color) = match outcome.outcome {
                Outcome::Correct => ("+", Color::Green),
                Outcome::Incorrect => ("-", Color::Red),
                Outcome::NeedsReview => ("?", Color::Yellow),
                Outcome::Unanswered => ("·", Color::DarkGray),
            };

            let prompt = app
                .questions()
                .find(&outcome.question_id)
                .map_or(outcome.question_id.as_str(), |q| q.prompt.as_str());

            Line::from(vec![
                Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
                Span::styled(
                    format!("{:2}. ", index + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(truncate_question(prompt), Style::default().fg(Color::Gray)),
                Span::styled(
                    correction(outcome.outcome, &outcome.correct_answer),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((app.result_scroll() as u16, 0));
    frame.render_widget(widget, area);
}

fn correction(outcome: Outcome, correct_answer: &str) -> String {
    match outcome {
        Outcome::Correct => String::new(),
        Outcome::NeedsReview => "  (awaiting review)".to_string(),
        Outcome::Incorrect | Outcome::Unanswered => format!("  → {}", correct_answer),
    }
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_save_status(
    frame: &mut Frame,
    area: Rect,
    saved: Option<bool>,
    notice: Option<&str>,
    preview: bool,
) {
    let line = match (saved, notice) {
        (Some(false), Some(notice)) => Line::from(notice.fg(Color::Red)),
        (_, Some(notice)) => Line::from(notice.fg(Color::Yellow)),
        (Some(true), None) if preview => {
            Line::from("Preview only · not kept after exit".fg(Color::DarkGray))
        }
        (Some(true), None) => Line::from("Result saved".fg(Color::Green)),
        (Some(false), None) => Line::from("Result not saved".fg(Color::Red)),
        (None, None) => Line::from("Saving…".fg(Color::DarkGray)),
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  r retry  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
