//! Drives one attempt from a tokio task.
//!
//! Commands, timer signals and persistence outcomes arrive on channels
//! and are applied one at a time, so no two transitions interleave. The
//! latest state is published on a watch channel.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::StoreError;
use crate::models::{Quiz, QuizResult};
use crate::store::PersistenceAdapter;

use super::session::{AttemptStatus, QuizSession, SessionSnapshot};
use super::timer::{TimerSignal, TokioTimer};

/// Input accepted by a running attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Begin,
    Answer { question_id: String, value: String },
    Next,
    Previous,
    GoTo(usize),
    Pause,
    Resume,
    Submit,
    /// Leaves the attempt. An unfinished attempt is discarded.
    Exit,
}

/// What the presentation layer renders.
#[derive(Debug, Clone)]
pub struct AttemptView {
    pub snapshot: SessionSnapshot,
    /// Latest user-facing message, such as a failed save.
    pub notice: Option<String>,
    /// `Some(true)` once the result is stored, `Some(false)` if that failed.
    pub saved: Option<bool>,
}

/// Who the attempt belongs to and how it is graded.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    pub user_id: String,
    pub passing_threshold: u32,
}

/// Handle to a spawned attempt.
pub struct AttemptHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<AttemptView>,
    task: JoinHandle<()>,
}

impl AttemptHandle {
    /// Queues a command. Returns false once the attempt task has ended.
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Starts the attempt and waits until the task has applied it.
    ///
    /// Returns false if the task ended before the attempt left `NotStarted`.
    pub async fn begin(&self) -> bool {
        let mut views = self.view.clone();
        if !self.send(Command::Begin) {
            return false;
        }
        views
            .wait_for(|view| view.snapshot.status != AttemptStatus::NotStarted)
            .await
            .is_ok()
    }

    pub fn view(&self) -> AttemptView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AttemptView> {
        self.view.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Exits the attempt and waits for the task to end.
    pub async fn close(self) {
        let _ = self.commands.send(Command::Exit);
        let _ = self.task.await;
    }
}

/// Spawns the task that owns a new attempt at `quiz`.
///
/// The attempt waits in `NotStarted` until it receives [`Command::Begin`].
pub fn spawn_attempt(
    quiz: Quiz,
    context: AttemptContext,
    store: Arc<dyn PersistenceAdapter>,
) -> AttemptHandle {
    let threshold = quiz.passing_threshold(context.passing_threshold);
    let (timer, signals) = TokioTimer::channel();
    let session = QuizSession::new(quiz.id.clone(), threshold, timer);

    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(AttemptView {
        snapshot: session.snapshot(),
        notice: None,
        saved: None,
    });

    let runner = Runner {
        quiz,
        user_id: context.user_id,
        session,
        store,
        view: view_tx,
        notice: None,
        saved: None,
    };
    let task = tokio::spawn(runner.run(commands_rx, signals));

    AttemptHandle {
        commands: commands_tx,
        view: view_rx,
        task,
    }
}

struct Runner {
    quiz: Quiz,
    user_id: String,
    session: QuizSession<TokioTimer>,
    store: Arc<dyn PersistenceAdapter>,
    view: watch::Sender<AttemptView>,
    notice: Option<String>,
    saved: Option<bool>,
}

impl Runner {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut signals: mpsc::UnboundedReceiver<TimerSignal>,
    ) {
        let (saves_tx, mut saves) = mpsc::unbounded_channel::<Result<(), StoreError>>();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Exit) | None => break,
                    Some(command) => {
                        if let Some(result) = self.apply(command) {
                            self.persist(result, saves_tx.clone());
                        }
                    }
                },
                Some(signal) = signals.recv() => {
                    if let Some(result) = self.session.handle_timer(signal).cloned() {
                        self.notice = Some("Time is up. Your answers were submitted.".to_string());
                        self.persist(result, saves_tx.clone());
                    }
                },
                Some(outcome) = saves.recv() => match outcome {
                    Ok(()) => self.saved = Some(true),
                    Err(err) => {
                        tracing::warn!(
                            attempt = %self.session.id(),
                            "could not save result: {}",
                            err
                        );
                        self.saved = Some(false);
                        self.notice = Some(format!("Could not save your result: {}", err));
                    }
                },
            }

            self.publish();
        }

        self.session.abandon();
    }

    /// Applies one command, returning a result when it finished the attempt.
    fn apply(&mut self, command: Command) -> Option<QuizResult> {
        tracing::debug!(attempt = %self.session.id(), ?command, "command");
        self.notice = None;

        let outcome = match command {
            Command::Begin => self
                .session
                .begin(self.quiz.questions.clone(), self.quiz.time_limit_seconds),
            Command::Answer { question_id, value } => self.session.answer(&question_id, value),
            Command::Next => self.session.next().map(|_| ()),
            Command::Previous => self.session.previous().map(|_| ()),
            Command::GoTo(position) => self.session.go_to(position).map(|_| ()),
            Command::Pause => self.session.pause(),
            Command::Resume => self.session.resume(),
            Command::Submit => {
                return match self.session.submit() {
                    Ok(result) => Some(result.clone()),
                    Err(err) => {
                        self.reject(err.to_string());
                        None
                    }
                };
            }
            Command::Exit => Ok(()),
        };

        if let Err(err) = outcome {
            self.reject(err.to_string());
        }
        None
    }

    fn reject(&mut self, message: String) {
        tracing::warn!(attempt = %self.session.id(), "command rejected: {}", message);
        self.notice = Some(message);
    }

    /// Hands the result to the store without waiting for it.
    fn persist(&self, result: QuizResult, outcomes: mpsc::UnboundedSender<Result<(), StoreError>>) {
        let store = Arc::clone(&self.store);
        let user_id = self.user_id.clone();
        let quiz_id = self.quiz.id.clone();

        tokio::spawn(async move {
            let outcome = store.save_attempt_result(&user_id, &quiz_id, &result).await;
            let _ = outcomes.send(outcome);
        });
    }

    fn publish(&self) {
        let view = AttemptView {
            snapshot: self.session.snapshot(),
            notice: self.notice.clone(),
            saved: self.saved,
        };
        // No receivers left only means nobody is watching.
        let _ = self.view.send(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Question, QuestionSet};
    use crate::store::{KeyValueStore, LocalPersistence};
    use std::time::Duration;

    fn quiz(limit: u32) -> Quiz {
        let questions = QuestionSet::new(vec![
            Question::single_select("q1", "2 + 2?", &["3", "4"], "4"),
            Question::true_false("q2", "Ice is cold.", true),
        ])
        .unwrap();
        Quiz::new("quiz1", "Warm-up", questions).with_time_limit(limit)
    }

    fn context() -> AttemptContext {
        AttemptContext {
            user_id: "u1".to_string(),
            passing_threshold: 70,
        }
    }

    async fn wait_for<F>(handle: &AttemptHandle, mut done: F) -> AttemptView
    where
        F: FnMut(&AttemptView) -> bool,
    {
        let mut rx = handle.subscribe();
        loop {
            {
                let view = rx.borrow_and_update();
                if done(&view) {
                    return view.clone();
                }
            }
            rx.changed().await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_saves_result() {
        let store = Arc::new(LocalPersistence::in_memory());
        let handle = spawn_attempt(quiz(60), context(), store.clone());

        handle.send(Command::Begin);
        handle.send(Command::Answer {
            question_id: "q1".into(),
            value: "4".into(),
        });
        handle.send(Command::Next);
        handle.send(Command::Submit);

        let view = wait_for(&handle, |v| v.saved.is_some()).await;
        assert_eq!(view.saved, Some(true));
        assert_eq!(view.snapshot.status, AttemptStatus::Submitted);
        assert_eq!(view.snapshot.position, 1);

        let history = store.load_attempt_history("u1", "quiz1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].correct_count, 1);
        assert_eq!(Some(&history[0]), view.snapshot.result.as_ref());

        handle.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_expiry_auto_submits() {
        let store = Arc::new(LocalPersistence::in_memory());
        let handle = spawn_attempt(quiz(3), context(), store.clone());

        handle.send(Command::Begin);
        handle.send(Command::Answer {
            question_id: "q2".into(),
            value: "True".into(),
        });

        let view = wait_for(&handle, |v| v.saved.is_some()).await;
        assert_eq!(view.snapshot.status, AttemptStatus::Expired);
        assert_eq!(view.snapshot.remaining_seconds, Some(0));
        let result = view.snapshot.result.unwrap();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.time_spent_seconds, 3);

        handle.close().await;
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk is read-only".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_keeps_result() {
        let store = Arc::new(LocalPersistence::new(ReadOnlyStore));
        let handle = spawn_attempt(quiz(60), context(), store);

        handle.send(Command::Begin);
        handle.send(Command::Answer {
            question_id: "q1".into(),
            value: "4".into(),
        });
        handle.send(Command::Submit);

        let view = wait_for(&handle, |v| v.saved.is_some()).await;
        assert_eq!(view.saved, Some(false));
        assert_eq!(view.snapshot.status, AttemptStatus::Submitted);
        let notice = view.notice.unwrap();
        assert!(notice.contains("Could not save your result"));
        assert!(notice.contains("disk is read-only"));
        assert_eq!(view.snapshot.result.map(|r| r.correct_count), Some(1));

        handle.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_waits_for_start() {
        let store = Arc::new(LocalPersistence::in_memory());
        let handle = spawn_attempt(quiz(60), context(), store);

        assert!(handle.begin().await);
        let view = handle.view();
        assert_eq!(view.snapshot.status, AttemptStatus::InProgress);
        assert_eq!(view.snapshot.remaining_seconds, Some(60));
        assert!(view.notice.is_none());

        handle.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_command_is_reported() {
        let store = Arc::new(LocalPersistence::in_memory());
        let handle = spawn_attempt(quiz(60), context(), store);

        handle.send(Command::Next);
        let view = wait_for(&handle, |v| v.notice.is_some()).await;
        assert!(view.notice.unwrap().contains("not started"));
        assert_eq!(view.snapshot.status, AttemptStatus::NotStarted);

        handle.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_discards_attempt() {
        let store = Arc::new(LocalPersistence::in_memory());
        let handle = spawn_attempt(quiz(60), context(), store.clone());

        handle.send(Command::Begin);
        handle.send(Command::Answer {
            question_id: "q1".into(),
            value: "4".into(),
        });
        handle.close().await;

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(store.load_attempt_history("u1", "quiz1").await.unwrap().is_empty());
    }
}
