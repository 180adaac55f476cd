//! # evolve-quiz
//!
//! The quiz-taking core of the EvolveLearn study app, with a terminal
//! front end.
//!
//! A [`Quiz`] is loaded from a [`QuestionSource`], an attempt is spawned
//! with [`spawn_attempt`], and the finished [`QuizResult`] is handed to a
//! [`PersistenceAdapter`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use evolve_quiz::{
//!     CatalogQuestionSource, DEMO_QUIZ_ID, LocalPersistence, QuestionSource, Role, TerminalQuiz,
//!     UserContext,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let quiz = CatalogQuestionSource::demo()?.load(DEMO_QUIZ_ID).await?;
//!     let user = UserContext::new("student-1", Role::Student);
//!
//!     TerminalQuiz::new(quiz, user, 70, Arc::new(LocalPersistence::in_memory()))
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

mod app;
pub mod config;
pub mod error;
pub mod integrations;
pub mod loader;
pub mod models;
pub mod quiz;
pub mod roles;
pub mod store;
pub mod study;
pub mod terminal;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};

pub use app::{Action, App, PickerAction, QuizPicker, Screen};
pub use config::Settings;
pub use error::{ConfigError, IntegrationError, LoadError, QuizError, StoreError, StudyError};
pub use loader::{
    CatalogQuestionSource, DEMO_QUIZ_ID, FileQuestionSource, HttpQuestionSource, QuestionSource,
};
pub use models::{Question, QuestionKind, QuestionSet, Quiz, QuizResult, QuizSummary};
pub use quiz::{AttemptContext, AttemptHandle, AttemptView, Command, QuizSession, spawn_attempt};
pub use roles::{Role, UserContext};
pub use store::{JsonFileStore, LocalPersistence, MemoryStore, PersistenceAdapter};
pub use study::StudyRoom;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const SAVE_GRACE: Duration = Duration::from_secs(2);

/// A quiz run interactively in the terminal, one attempt at a time.
pub struct TerminalQuiz {
    quiz: Quiz,
    context: AttemptContext,
    store: Arc<dyn PersistenceAdapter>,
    app: App,
}

impl TerminalQuiz {
    pub fn new(
        quiz: Quiz,
        user: UserContext,
        passing_threshold: u32,
        store: Arc<dyn PersistenceAdapter>,
    ) -> Self {
        let context = AttemptContext {
            user_id: user.user_id.clone(),
            passing_threshold,
        };
        let app = App::new(&quiz, user, Vec::new());
        Self {
            quiz,
            context,
            store,
            app,
        }
    }

    /// Attempts loaded earlier, shown on the welcome screen.
    pub fn with_history(mut self, history: Vec<QuizResult>) -> Self {
        self.app = App::new(&self.quiz, self.app.user.clone(), history);
        self
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Takes over the terminal until the user quits.
    pub async fn run(mut self) -> io::Result<()> {
        let mut term = terminal::TerminalSession::enter()?;
        self.event_loop(&mut term).await
    }

    fn spawn(&self) -> AttemptHandle {
        spawn_attempt(self.quiz.clone(), self.context.clone(), Arc::clone(&self.store))
    }

    async fn event_loop(&mut self, term: &mut terminal::TerminalSession) -> io::Result<()> {
        let mut attempt = self.spawn();

        loop {
            self.app.update(attempt.view());
            term.draw(|frame| ui::render(frame, &self.app))?;

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match self.app.handle_key(key) {
                Action::None => {}
                Action::Send(command) => {
                    if !attempt.send(command) {
                        tracing::warn!("attempt task ended unexpectedly");
                        break;
                    }
                }
                Action::Retry => {
                    attempt.close().await;
                    self.app.reset();
                    attempt = self.spawn();
                    if !attempt.begin().await {
                        tracing::warn!("retried attempt did not start");
                        break;
                    }
                }
                Action::Quit => break,
            }
        }

        if self.app.awaiting_save() {
            wait_for_save(&attempt).await;
        }
        attempt.close().await;
        Ok(())
    }
}

/// Lets the user choose one of `quizzes` in the terminal.
///
/// Returns `None` when the user quits instead.
pub fn pick_quiz(quizzes: Vec<QuizSummary>, user: UserContext) -> io::Result<Option<String>> {
    let mut picker = QuizPicker::new(quizzes, user);
    let mut term = terminal::TerminalSession::enter()?;

    loop {
        term.draw(|frame| ui::render_picker(frame, &picker))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match picker.handle_key(key.code) {
            PickerAction::None => {}
            PickerAction::Choose(quiz_id) => return Ok(Some(quiz_id)),
            PickerAction::Quit => return Ok(None),
        }
    }
}

async fn wait_for_save(attempt: &AttemptHandle) {
    let mut views = attempt.subscribe();
    let saved = views.wait_for(|view| view.saved.is_some());
    if tokio::time::timeout(SAVE_GRACE, saved).await.is_err() {
        tracing::warn!("exiting before the result was saved");
    }
}
