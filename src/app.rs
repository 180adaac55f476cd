use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::models::{Question, QuestionSet, Quiz, QuizResult, QuizSummary};
use crate::quiz::{AttemptStatus, AttemptView, Command};
use crate::roles::UserContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Quiz,
    Result,
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Send(Command),
    Retry,
    Quit,
}

/// UI-local state around the latest attempt view.
pub struct App {
    pub user: UserContext,
    title: String,
    questions: QuestionSet,
    time_limit_seconds: Option<u32>,
    /// Results are kept only in memory for this session.
    preview: bool,
    history: Vec<QuizResult>,
    view: Option<AttemptView>,
    shown_question: Option<String>,
    cursor: usize,
    input: String,
    result_scroll: usize,
}

impl App {
    pub fn new(quiz: &Quiz, user: UserContext, history: Vec<QuizResult>) -> Self {
        let preview = !user.profile().can_take_quizzes();
        Self {
            user,
            title: quiz.title.clone(),
            questions: quiz.questions.clone(),
            time_limit_seconds: quiz.time_limit_seconds,
            preview,
            history,
            view: None,
            shown_question: None,
            cursor: 0,
            input: String::new(),
            result_scroll: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        match self.status() {
            AttemptStatus::NotStarted => Screen::Welcome,
            AttemptStatus::InProgress => Screen::Quiz,
            AttemptStatus::Submitted | AttemptStatus::Expired => Screen::Result,
        }
    }

    fn status(&self) -> AttemptStatus {
        self.view
            .as_ref()
            .map_or(AttemptStatus::NotStarted, |view| view.snapshot.status)
    }

    /// Takes the newest view from the attempt task.
    pub fn update(&mut self, view: AttemptView) {
        let finished_now = view.snapshot.status.is_terminal() && !self.status().is_terminal();
        if finished_now {
            if let Some(result) = &view.snapshot.result {
                self.history.push(result.clone());
            }
            self.result_scroll = 0;
        }

        let question_id = view.snapshot.question.as_ref().map(|q| q.id.clone());
        if question_id != self.shown_question {
            self.cursor = view
                .snapshot
                .question
                .as_ref()
                .zip(view.snapshot.selected.as_ref())
                .and_then(|(question, selected)| {
                    question.options.iter().position(|option| option == selected)
                })
                .unwrap_or(0);
            self.input = view.snapshot.selected.clone().unwrap_or_default();
            self.shown_question = question_id;
        }

        self.view = Some(view);
    }

    /// Forgets the finished attempt before a retry.
    pub fn reset(&mut self) {
        self.view = None;
        self.shown_question = None;
        self.cursor = 0;
        self.input.clear();
        self.result_scroll = 0;
    }

    pub fn view(&self) -> Option<&AttemptView> {
        self.view.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn time_limit_seconds(&self) -> Option<u32> {
        self.time_limit_seconds
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    pub fn history(&self) -> &[QuizResult] {
        &self.history
    }

    pub fn best_score(&self) -> Option<u32> {
        self.history.iter().map(|r| r.score_percent).max()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    /// True while a finished attempt's save has not been reported yet.
    pub fn awaiting_save(&self) -> bool {
        self.view
            .as_ref()
            .is_some_and(|view| view.snapshot.status.is_terminal() && view.saved.is_none())
    }

    fn current_question(&self) -> Option<&Question> {
        self.view.as_ref()?.snapshot.question.as_ref()
    }

    fn is_typing(&self) -> bool {
        self.current_question()
            .is_some_and(|question| !question.kind.has_options())
    }

    fn is_paused(&self) -> bool {
        self.view.as_ref().is_some_and(|view| view.snapshot.paused)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match self.screen() {
            Screen::Welcome => self.handle_welcome_key(key.code),
            Screen::Quiz => self.handle_quiz_key(key),
            Screen::Result => self.handle_result_key(key.code),
        }
    }

    fn handle_welcome_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Enter | KeyCode::Char(' ') => Action::Send(Command::Begin),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
            _ => Action::None,
        }
    }

    fn handle_quiz_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl {
            return match key.code {
                KeyCode::Char('s') => Action::Send(Command::Submit),
                KeyCode::Char('c') => Action::Quit,
                _ => Action::None,
            };
        }

        if self.is_paused() {
            return match key.code {
                KeyCode::Esc => Action::Send(Command::Resume),
                KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Esc => return Action::Send(Command::Pause),
            KeyCode::Right | KeyCode::Tab => return Action::Send(Command::Next),
            KeyCode::Left | KeyCode::BackTab => return Action::Send(Command::Previous),
            _ => {}
        }

        if self.is_typing() {
            self.handle_typing_key(key.code)
        } else {
            self.handle_choice_key(key.code)
        }
    }

    fn handle_typing_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Char(c) => {
                self.input.push(c);
                Action::None
            }
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Enter => self.answer(self.input.trim().to_string()),
            _ => Action::None,
        }
    }

    fn handle_choice_key(&mut self, key: KeyCode) -> Action {
        let option_count = self.current_question().map_or(0, |q| q.options.len());

        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                if option_count > 0 {
                    self.cursor = (self.cursor + option_count - 1) % option_count;
                }
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if option_count > 0 {
                    self.cursor = (self.cursor + 1) % option_count;
                }
                Action::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let choice = self
                    .current_question()
                    .and_then(|q| q.options.get(self.cursor))
                    .cloned();
                match choice {
                    Some(choice) => self.answer(choice),
                    None => Action::None,
                }
            }
            KeyCode::Char('n') => Action::Send(Command::Next),
            KeyCode::Char('p') => Action::Send(Command::Previous),
            KeyCode::Char('s') => Action::Send(Command::Submit),
            KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
            _ => Action::None,
        }
    }

    fn answer(&self, value: String) -> Action {
        match self.current_question() {
            Some(question) => Action::Send(Command::Answer {
                question_id: question.id.clone(),
                value,
            }),
            None => Action::None,
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Down | KeyCode::Char('j') => {
                let max = self.questions.len().saturating_sub(1);
                self.result_scroll = (self.result_scroll + 1).min(max);
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.result_scroll = self.result_scroll.saturating_sub(1);
                Action::None
            }
            KeyCode::Char('r') | KeyCode::Char('R') => Action::Retry,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
            _ => Action::None,
        }
    }
}

/// What the picker loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction {
    None,
    Choose(String),
    Quit,
}

/// Cursor over the quizzes a source offers.
pub struct QuizPicker {
    pub user: UserContext,
    quizzes: Vec<QuizSummary>,
    selected: usize,
}

impl QuizPicker {
    pub fn new(quizzes: Vec<QuizSummary>, user: UserContext) -> Self {
        Self {
            user,
            quizzes,
            selected: 0,
        }
    }

    pub fn quizzes(&self) -> &[QuizSummary] {
        &self.quizzes
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn handle_key(&mut self, key: KeyCode) -> PickerAction {
        let count = self.quizzes.len();

        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                if count > 0 {
                    self.selected = (self.selected + count - 1) % count;
                }
                PickerAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if count > 0 {
                    self.selected = (self.selected + 1) % count;
                }
                PickerAction::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => match self.quizzes.get(self.selected) {
                Some(quiz) => PickerAction::Choose(quiz.id.clone()),
                None => PickerAction::None,
            },
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => PickerAction::Quit,
            _ => PickerAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{Countdown, QuizSession, SessionSnapshot};
    use crate::roles::Role;

    fn quiz() -> Quiz {
        let questions = QuestionSet::new(vec![
            Question::single_select("q1", "2 + 2?", &["3", "4", "5"], "4"),
            Question::short_answer("q2", "Define a prime.", "Divisible only by 1 and itself"),
        ])
        .unwrap();
        Quiz::new("quiz1", "Warm-up", questions).with_time_limit(60)
    }

    fn session() -> QuizSession<Countdown> {
        let mut session = QuizSession::new("quiz1", 70, Countdown::default());
        session.begin(quiz().questions, Some(60)).unwrap();
        session
    }

    fn view(snapshot: SessionSnapshot) -> AttemptView {
        AttemptView {
            snapshot,
            notice: None,
            saved: None,
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new(&quiz(), UserContext::new("u1", Role::Student), Vec::new())
    }

    #[test]
    fn test_welcome_begins() {
        let mut app = app();
        assert_eq!(app.screen(), Screen::Welcome);
        assert_eq!(app.handle_key(press(KeyCode::Enter)), Action::Send(Command::Begin));
        assert_eq!(app.handle_key(press(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn test_cursor_wraps_and_answers_option() {
        let mut app = app();
        app.update(view(session().snapshot()));
        assert_eq!(app.screen(), Screen::Quiz);

        app.handle_key(press(KeyCode::Char('k')));
        assert_eq!(app.cursor(), 2);
        app.handle_key(press(KeyCode::Char('j')));
        app.handle_key(press(KeyCode::Char('j')));
        assert_eq!(
            app.handle_key(press(KeyCode::Enter)),
            Action::Send(Command::Answer {
                question_id: "q1".into(),
                value: "4".into()
            })
        );
    }

    #[test]
    fn test_cursor_follows_recorded_answer() {
        let mut session = session();
        session.answer("q1", "5").unwrap();
        let mut app = app();
        app.update(view(session.snapshot()));
        assert_eq!(app.cursor(), 2);
    }

    #[test]
    fn test_short_answer_typing() {
        let mut session = session();
        session.next().unwrap();
        let mut app = app();
        app.update(view(session.snapshot()));

        for c in "n is prime ".chars() {
            assert_eq!(app.handle_key(press(KeyCode::Char(c))), Action::None);
        }
        app.handle_key(press(KeyCode::Backspace));
        assert_eq!(app.input(), "n is prime");
        assert_eq!(
            app.handle_key(press(KeyCode::Enter)),
            Action::Send(Command::Answer {
                question_id: "q2".into(),
                value: "n is prime".into()
            })
        );
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Action::Send(Command::Submit)
        );
        assert_eq!(app.handle_key(press(KeyCode::BackTab)), Action::Send(Command::Previous));
    }

    #[test]
    fn test_paused_only_resumes() {
        let mut session = session();
        session.pause().unwrap();
        let mut app = app();
        app.update(view(session.snapshot()));

        assert_eq!(app.handle_key(press(KeyCode::Char('n'))), Action::None);
        assert_eq!(app.handle_key(press(KeyCode::Esc)), Action::Send(Command::Resume));
    }

    #[test]
    fn test_finished_attempt_joins_history() {
        let mut session = session();
        session.answer("q1", "4").unwrap();
        let mut app = app();
        app.update(view(session.snapshot()));
        session.submit().unwrap();
        app.update(view(session.snapshot()));

        assert_eq!(app.screen(), Screen::Result);
        assert_eq!(app.history().len(), 1);
        assert_eq!(app.best_score(), Some(50));
        assert!(app.awaiting_save());

        // A repeated view of the same attempt is not counted twice.
        app.update(view(session.snapshot()));
        assert_eq!(app.history().len(), 1);

        assert_eq!(app.handle_key(press(KeyCode::Char('r'))), Action::Retry);
        app.reset();
        assert_eq!(app.screen(), Screen::Welcome);
    }

    #[test]
    fn test_non_student_is_preview() {
        let app = App::new(&quiz(), UserContext::new("p1", Role::Parent), Vec::new());
        assert!(app.is_preview());
        assert!(!self::app().is_preview());
    }

    fn summary(id: &str) -> QuizSummary {
        QuizSummary {
            id: id.to_string(),
            title: id.to_uppercase(),
            question_count: 3,
            time_limit_seconds: None,
        }
    }

    #[test]
    fn test_picker_moves_and_chooses() {
        let quizzes = vec![summary("algebra"), summary("biology"), summary("chemistry")];
        let mut picker = QuizPicker::new(quizzes, UserContext::new("u1", Role::Student));

        assert_eq!(picker.handle_key(KeyCode::Up), PickerAction::None);
        assert_eq!(picker.selected(), 2);
        picker.handle_key(KeyCode::Char('j'));
        picker.handle_key(KeyCode::Down);
        assert_eq!(picker.selected(), 1);

        assert_eq!(
            picker.handle_key(KeyCode::Enter),
            PickerAction::Choose("biology".to_string())
        );
        assert_eq!(picker.handle_key(KeyCode::Esc), PickerAction::Quit);
    }

    #[test]
    fn test_empty_picker_only_quits() {
        let mut picker = QuizPicker::new(Vec::new(), UserContext::new("u1", Role::Student));
        assert_eq!(picker.handle_key(KeyCode::Down), PickerAction::None);
        assert_eq!(picker.handle_key(KeyCode::Enter), PickerAction::None);
        assert_eq!(picker.handle_key(KeyCode::Char('q')), PickerAction::Quit);
    }
}
