use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::{Question, QuestionKind, format_clock};
use crate::quiz::SessionSnapshot;

const OPTION_LABELS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];
const LOW_TIME_SECONDS: u32 = 60;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(view) = app.view() else {
        return;
    };
    let snapshot = &view.snapshot;
    let Some(question) = &snapshot.question else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    render_status(frame, chunks[0], snapshot);
    render_answered(frame, chunks[1], snapshot);
    render_question_text(frame, chunks[2], &question.prompt);

    if snapshot.paused {
        render_paused(frame, chunks[3]);
    } else if question.kind.has_options() {
        render_options(frame, chunks[3], question, app.cursor(), snapshot.selected.as_deref());
    } else {
        render_text_input(frame, chunks[3], app.input(), snapshot.selected.as_deref());
    }

    render_notice(frame, chunks[4], view.notice.as_deref());
    render_controls(frame, chunks[5], question.kind);
}

fn render_status(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let halves = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(area);

    let progress = format!(
        "Question {} of {}",
        snapshot.position + 1,
        snapshot.total_questions
    );
    frame.render_widget(Paragraph::new(progress).fg(Color::DarkGray), halves[0]);

    if let Some(remaining) = snapshot.remaining_seconds {
        let color = if remaining <= LOW_TIME_SECONDS {
            Color::Red
        } else {
            Color::Cyan
        };
        let clock = Paragraph::new(format_clock(remaining))
            .alignment(Alignment::Right)
            .fg(color)
            .bold();
        frame.render_widget(clock, halves[1]);
    }
}

fn render_answered(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let mut spans: Vec<Span> = snapshot
        .answered
        .iter()
        .enumerate()
        .map(|(index, answered)| {
            let symbol = if *answered { "●" } else { "○" };
            let style = if index == snapshot.position {
                Style::default().fg(Color::Cyan).bold()
            } else if *answered {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!("{} ", symbol), style)
        })
        .collect();

    spans.push(Span::styled(
        format!(
            " {}/{} answered",
            snapshot.answered_count(),
            snapshot.total_questions
        ),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    cursor: usize,
    selected: Option<&str>,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(question.options.len() * 2);

    for (index, option) in question.options.iter().enumerate() {
        let is_cursor = index == cursor;
        let is_chosen = selected == Some(option.as_str());
        let style = match (is_cursor, is_chosen) {
            (true, _) => Style::default().fg(Color::Cyan).bold(),
            (false, true) => Style::default().fg(Color::Green),
            (false, false) => Style::default().fg(Color::Gray),
        };
        let marker = if is_cursor { ">" } else { " " };
        let label = OPTION_LABELS.get(index).copied().unwrap_or('-');
        let chosen = if is_chosen { "  ✓" } else { "" };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", label), style),
            Span::styled(option.as_str(), style),
            Span::styled(chosen, Style::default().fg(Color::Green)),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_text_input(frame: &mut Frame, area: Rect, input: &str, recorded: Option<&str>) {
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).split(area);

    let widget = Paragraph::new(format!("{}_", input))
        .fg(Color::Yellow)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray)
                .title(" Your answer ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, chunks[0]);

    let status = match recorded {
        Some(answer) if answer == input.trim() => Line::from("Answer recorded".fg(Color::Green)),
        Some(_) => Line::from("Press enter to replace your recorded answer".fg(Color::DarkGray)),
        None => Line::from("Press enter to record your answer".fg(Color::DarkGray)),
    };
    frame.render_widget(Paragraph::new(status), chunks[1]);
}

fn render_paused(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "PAUSED",
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from("esc to resume".fg(Color::DarkGray)),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_notice(frame: &mut Frame, area: Rect, notice: Option<&str>) {
    if let Some(notice) = notice {
        let widget = Paragraph::new(notice)
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(widget, area);
    }
}

fn render_controls(frame: &mut Frame, area: Rect, kind: QuestionKind) {
    let help = if kind.has_options() {
        "j/k navigate  ·  enter select  ·  n/p next/prev  ·  s submit  ·  esc pause  ·  q quit"
    } else {
        "type answer  ·  enter record  ·  tab/backtab next/prev  ·  ctrl-s submit  ·  ctrl-c quit"
    };
    let widget = Paragraph::new(help)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
