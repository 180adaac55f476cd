//! The quiz attempt state machine.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuizError;
use crate::models::{Completion, Question, QuestionSet, QuizResult};

use super::ledger::AnswerLedger;
use super::scorer;
use super::timer::{Countdown, TimerControl, TimerEvent, TimerSignal};

/// Lifecycle of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    NotStarted,
    InProgress,
    Submitted,
    Expired,
}

impl AttemptStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Submitted | Self::Expired)
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not started",
            Self::InProgress => "in progress",
            Self::Submitted => "submitted",
            Self::Expired => "expired",
        };
        f.write_str(label)
    }
}

/// Point-in-time copy of a session, for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub attempt_id: Uuid,
    pub quiz_id: String,
    pub status: AttemptStatus,
    pub position: usize,
    pub total_questions: usize,
    pub question: Option<Question>,
    pub selected: Option<String>,
    /// One flag per question, in question order.
    pub answered: Vec<bool>,
    pub remaining_seconds: Option<u32>,
    pub paused: bool,
    pub result: Option<QuizResult>,
}

impl SessionSnapshot {
    pub fn answered_count(&self) -> usize {
        self.answered.iter().filter(|a| **a).count()
    }
}

/// One respondent's pass through a question set.
///
/// Transitions run to completion one at a time; the caller owns the
/// session and feeds it user input and timer signals in order.
pub struct QuizSession<T: TimerControl> {
    id: Uuid,
    quiz_id: String,
    passing_threshold: u32,
    timer: T,
    timer_run: Option<u64>,
    status: AttemptStatus,
    questions: Option<QuestionSet>,
    ledger: AnswerLedger,
    position: usize,
    time_limit: Option<u32>,
    remaining: Option<u32>,
    paused: bool,
    started_at: Option<Instant>,
    result: Option<QuizResult>,
}

impl<T: TimerControl> QuizSession<T> {
    pub fn new(quiz_id: impl Into<String>, passing_threshold: u32, timer: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            quiz_id: quiz_id.into(),
            passing_threshold,
            timer,
            timer_run: None,
            status: AttemptStatus::NotStarted,
            questions: None,
            ledger: AnswerLedger::new(),
            position: 0,
            time_limit: None,
            remaining: None,
            paused: false,
            started_at: None,
            result: None,
        }
    }

    /// Starts the attempt. A `None` or zero limit runs untimed.
    pub fn begin(
        &mut self,
        questions: QuestionSet,
        time_limit_seconds: Option<u32>,
    ) -> Result<(), QuizError> {
        self.require(AttemptStatus::NotStarted, "begin")?;

        let time_limit = time_limit_seconds.filter(|s| *s > 0);
        self.ledger.clear();
        self.position = 0;
        self.time_limit = time_limit;
        self.remaining = time_limit;
        self.started_at = Some(Instant::now());
        self.timer_run = time_limit.map(|limit| self.timer.start(limit));
        self.questions = Some(questions);
        self.status = AttemptStatus::InProgress;

        tracing::info!(
            attempt = %self.id,
            quiz = %self.quiz_id,
            time_limit = ?time_limit,
            "attempt started"
        );
        Ok(())
    }

    /// Records an answer for a question in the current set.
    pub fn answer(&mut self, question_id: &str, value: impl Into<String>) -> Result<(), QuizError> {
        self.require(AttemptStatus::InProgress, "answer")?;
        let questions = self.questions.as_ref().ok_or(QuizError::InvalidState {
            operation: "answer",
            status: self.status,
        })?;

        self.ledger.record(questions, question_id, value)?;
        tracing::debug!(attempt = %self.id, question = question_id, "answer recorded");
        Ok(())
    }

    /// Moves forward one question, staying put on the last one.
    pub fn next(&mut self) -> Result<usize, QuizError> {
        self.require(AttemptStatus::InProgress, "move to the next question")?;
        if self.position + 1 < self.question_count() {
            self.position += 1;
        }
        Ok(self.position)
    }

    /// Moves back one question, staying put on the first one.
    pub fn previous(&mut self) -> Result<usize, QuizError> {
        self.require(AttemptStatus::InProgress, "move to the previous question")?;
        self.position = self.position.saturating_sub(1);
        Ok(self.position)
    }

    /// Jumps to a position, clamped to the last question.
    pub fn go_to(&mut self, position: usize) -> Result<usize, QuizError> {
        self.require(AttemptStatus::InProgress, "jump to a question")?;
        self.position = position.min(self.question_count().saturating_sub(1));
        Ok(self.position)
    }

    pub fn pause(&mut self) -> Result<(), QuizError> {
        self.require(AttemptStatus::InProgress, "pause")?;
        if self.time_limit.is_some() && !self.paused {
            self.timer.pause();
            self.paused = true;
        }
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), QuizError> {
        self.require(AttemptStatus::InProgress, "resume")?;
        if self.paused {
            self.timer.resume();
            self.paused = false;
        }
        Ok(())
    }

    /// Finishes the attempt on the respondent's request.
    pub fn submit(&mut self) -> Result<&QuizResult, QuizError> {
        self.require(AttemptStatus::InProgress, "submit")?;
        self.timer.stop();
        self.finish(Completion::Submitted);
        self.result.as_ref().ok_or(QuizError::InvalidState {
            operation: "submit",
            status: self.status,
        })
    }

    /// Applies a timer signal.
    ///
    /// Returns the result when the signal expired the attempt. Signals
    /// from an earlier timer run, or after the attempt ended, are ignored.
    pub fn handle_timer(&mut self, signal: TimerSignal) -> Option<&QuizResult> {
        if self.status != AttemptStatus::InProgress || self.timer_run != Some(signal.run) {
            return None;
        }

        match signal.event {
            TimerEvent::Tick(remaining) => {
                self.remaining = Some(remaining);
                None
            }
            TimerEvent::Expired => {
                self.remaining = Some(0);
                self.finish(Completion::Expired);
                self.result.as_ref()
            }
        }
    }

    /// Leaves the attempt without recording anything.
    pub fn abandon(mut self) {
        self.timer.stop();
        if self.status.is_terminal() {
            tracing::debug!(attempt = %self.id, status = %self.status, "session closed");
        } else {
            tracing::info!(
                attempt = %self.id,
                status = %self.status,
                answered = self.ledger.answered_count(),
                "attempt abandoned"
            );
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn questions(&self) -> Option<&QuestionSet> {
        self.questions.as_ref()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.as_ref()?.get(self.position)
    }

    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let question = self.current_question().cloned();
        let selected = question
            .as_ref()
            .and_then(|q| self.ledger.answer_for(&q.id))
            .map(str::to_string);
        let answered = self
            .questions
            .iter()
            .flat_map(|set| set.iter())
            .map(|q| self.ledger.is_answered(&q.id))
            .collect();

        SessionSnapshot {
            attempt_id: self.id,
            quiz_id: self.quiz_id.clone(),
            status: self.status,
            position: self.position,
            total_questions: self.question_count(),
            question,
            selected,
            answered,
            remaining_seconds: self.remaining,
            paused: self.paused,
            result: self.result.clone(),
        }
    }

    fn question_count(&self) -> usize {
        self.questions.as_ref().map_or(0, QuestionSet::len)
    }

    fn require(&self, expected: AttemptStatus, operation: &'static str) -> Result<(), QuizError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(QuizError::InvalidState {
                operation,
                status: self.status,
            })
        }
    }

    fn time_spent(&self) -> u32 {
        match (self.time_limit, self.remaining) {
            (Some(limit), Some(remaining)) => limit.saturating_sub(remaining),
            _ => self
                .started_at
                .map_or(0, |start| start.elapsed().as_secs() as u32),
        }
    }

    fn finish(&mut self, completion: Completion) {
        let Some(questions) = self.questions.as_ref() else {
            return;
        };

        let card = scorer::score(questions, &self.ledger, self.passing_threshold);
        let result = card.into_result(self.id, &self.quiz_id, completion, self.time_spent());

        self.status = match completion {
            Completion::Submitted => AttemptStatus::Submitted,
            Completion::Expired => AttemptStatus::Expired,
        };
        self.paused = false;

        tracing::info!(
            attempt = %self.id,
            status = %self.status,
            correct = result.correct_count,
            total = result.total_questions,
            percent = result.score_percent,
            pass = result.pass,
            "attempt finished"
        );
        self.result = Some(result);
    }
}

impl QuizSession<Countdown> {
    /// Advances the built-in countdown by one second.
    ///
    /// Returns the result when this second expired the attempt.
    pub fn tick(&mut self) -> Option<&QuizResult> {
        let run = self.timer.run();
        let mut expired = false;
        for event in self.timer.tick() {
            expired |= self.handle_timer(TimerSignal::new(run, event)).is_some();
        }
        if expired { self.result.as_ref() } else { None }
    }
}
