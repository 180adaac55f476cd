use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an attempt reached its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// The respondent chose to finish.
    Submitted,
    /// The timer ran out and the attempt was scored as it stood.
    Expired,
}

/// Grading outcome of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
    Unanswered,
    /// Free-text answer, left for a teacher to grade.
    NeedsReview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub outcome: Outcome,
    pub given: Option<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub points: u32,
}

impl QuestionOutcome {
    pub fn is_correct(&self) -> bool {
        self.outcome == Outcome::Correct
    }
}

impl fmt::Display for QuestionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Outcome::Correct => {
                write!(f, "Question {}: Correct!", self.question_id)?;
                if let Some(explanation) = &self.explanation {
                    write!(f, " {}", explanation)?;
                }
                Ok(())
            }
            Outcome::Incorrect | Outcome::Unanswered => write!(
                f,
                "Question {}: Incorrect. Correct answer: {}",
                self.question_id, self.correct_answer
            ),
            Outcome::NeedsReview => write!(
                f,
                "Question {}: Awaiting review. Reference answer: {}",
                self.question_id, self.correct_answer
            ),
        }
    }
}

/// Final, immutable outcome of a submitted or expired attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub attempt_id: Uuid,
    pub quiz_id: String,
    pub total_questions: usize,
    pub correct_count: usize,
    /// Rounded half up, always within 0..=100.
    pub score_percent: u32,
    pub points_earned: u32,
    pub points_possible: u32,
    pub pass: bool,
    pub time_spent_seconds: u32,
    pub completion: Completion,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub outcomes: Vec<QuestionOutcome>,
}

impl QuizResult {
    /// One feedback line per question, in question order.
    pub fn feedback(&self) -> Vec<String> {
        self.outcomes.iter().map(|o| o.to_string()).collect()
    }
}

/// Formats seconds as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
