mod picker;
mod quiz;
mod result;
mod welcome;

use ratatui::{prelude::*, widgets::Block};

use crate::app::{App, QuizPicker, Screen};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.screen() {
        Screen::Welcome => welcome::render(frame, area, app),
        Screen::Quiz => quiz::render(frame, area, app),
        Screen::Result => result::render(frame, area, app),
    }
}

pub fn render_picker(frame: &mut Frame, picker: &QuizPicker) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);
    picker::render(frame, area, picker);
}

fn grade_color(percent: u32, passed: bool) -> Color {
    match (passed, percent) {
        (true, 90..) => Color::Green,
        (true, _) => Color::Cyan,
        (false, 50..) => Color::Yellow,
        (false, _) => Color::Red,
    }
}
