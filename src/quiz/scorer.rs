use chrono::Utc;
use uuid::Uuid;

use crate::models::{Completion, Outcome, QuestionKind, QuestionOutcome, QuestionSet, QuizResult};

use super::ledger::AnswerLedger;

/// Scoring totals for a ledger against a question set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scorecard {
    pub total_questions: usize,
    pub correct_count: usize,
    pub score_percent: u32,
    pub points_earned: u32,
    pub points_possible: u32,
    pub pass: bool,
    pub outcomes: Vec<QuestionOutcome>,
}

impl Scorecard {
    pub fn into_result(
        self,
        attempt_id: Uuid,
        quiz_id: impl Into<String>,
        completion: Completion,
        time_spent_seconds: u32,
    ) -> QuizResult {
        QuizResult {
            attempt_id,
            quiz_id: quiz_id.into(),
            total_questions: self.total_questions,
            correct_count: self.correct_count,
            score_percent: self.score_percent,
            points_earned: self.points_earned,
            points_possible: self.points_possible,
            pass: self.pass,
            time_spent_seconds,
            completion,
            completed_at: Utc::now(),
            outcomes: self.outcomes,
        }
    }
}

/// Grades a ledger.
///
/// A question is correct when the recorded answer equals its correct
/// answer exactly, case included. Short-answer questions are never
/// auto-graded; they still count toward the totals.
pub fn score(questions: &QuestionSet, ledger: &AnswerLedger, passing_threshold: u32) -> Scorecard {
    let outcomes: Vec<QuestionOutcome> = questions
        .iter()
        .map(|question| {
            let given = ledger.answer_for(&question.id);
            let outcome = match (question.kind, given) {
                (_, None) => Outcome::Unanswered,
                (QuestionKind::ShortAnswer, Some(_)) => Outcome::NeedsReview,
                (_, Some(answer)) if answer == question.correct_answer => Outcome::Correct,
                (_, Some(_)) => Outcome::Incorrect,
            };

            QuestionOutcome {
                question_id: question.id.clone(),
                outcome,
                given: given.map(str::to_string),
                correct_answer: question.correct_answer.clone(),
                explanation: question.explanation.clone(),
                points: question.points,
            }
        })
        .collect();

    let total_questions = questions.len();
    let correct_count = outcomes.iter().filter(|o| o.is_correct()).count();
    // Bounded by the set's total, which is checked when the set is built.
    let points_earned = outcomes
        .iter()
        .filter(|o| o.is_correct())
        .fold(0u32, |earned, o| earned.saturating_add(o.points));
    let score_percent = percent_half_up(correct_count, total_questions);

    Scorecard {
        total_questions,
        correct_count,
        score_percent,
        points_earned,
        points_possible: questions.total_points(),
        pass: score_percent >= passing_threshold,
        outcomes,
    }
}

/// `round(100 * part / whole)` with halves rounded up.
fn percent_half_up(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;

    fn arithmetic() -> QuestionSet {
        QuestionSet::new(vec![
            Question::single_select("q1", "2x + 5 = 13", &["x = 4", "x = 5"], "x = 4")
                .with_points(2),
            Question::true_false("q2", "The sum of two even numbers is even.", true),
            Question::single_select("q3", "Capital of France?", &["Paris", "Lyon"], "Paris"),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_ledger_scores_zero() {
        let card = score(&arithmetic(), &AnswerLedger::new(), 70);
        assert_eq!(card.correct_count, 0);
        assert_eq!(card.score_percent, 0);
        assert_eq!(card.points_earned, 0);
        assert!(!card.pass);
        assert!(card.outcomes.iter().all(|o| o.outcome == Outcome::Unanswered));
    }

    #[test]
    fn test_points_and_percent() {
        let set = arithmetic();
        let mut ledger = AnswerLedger::new();
        ledger.record(&set, "q1", "x = 4").unwrap();
        ledger.record(&set, "q2", "False").unwrap();
        ledger.record(&set, "q3", "Paris").unwrap();

        let card = score(&set, &ledger, 70);
        assert_eq!(card.correct_count, 2);
        assert_eq!(card.score_percent, 67);
        assert_eq!(card.points_earned, 3);
        assert_eq!(card.points_possible, 4);
        assert!(!card.pass);
        assert!(score(&set, &ledger, 67).pass);
    }

    #[test]
    fn test_points_up_to_the_largest_total() {
        let set = QuestionSet::new(vec![
            Question::true_false("q1", "Ice floats.", true).with_points(u32::MAX - 1),
            Question::true_false("q2", "Lead floats.", false),
        ])
        .unwrap();
        let mut ledger = AnswerLedger::new();
        ledger.record(&set, "q1", "True").unwrap();
        ledger.record(&set, "q2", "False").unwrap();

        let card = score(&set, &ledger, 70);
        assert_eq!(card.points_earned, u32::MAX);
        assert_eq!(card.points_possible, u32::MAX);
        assert_eq!(card.score_percent, 100);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let set = arithmetic();
        let mut ledger = AnswerLedger::new();
        ledger.record(&set, "q3", "paris").unwrap();

        let card = score(&set, &ledger, 0);
        assert_eq!(card.correct_count, 0);
        assert_eq!(card.outcomes[2].outcome, Outcome::Incorrect);
    }

    #[test]
    fn test_short_answer_needs_review() {
        let set = QuestionSet::new(vec![
            Question::short_answer("s1", "Define photosynthesis.", "Light to chemical energy"),
            Question::true_false("t1", "Plants need light.", true),
        ])
        .unwrap();
        let mut ledger = AnswerLedger::new();
        ledger.record(&set, "s1", "Light to chemical energy").unwrap();
        ledger.record(&set, "t1", "True").unwrap();

        let card = score(&set, &ledger, 50);
        assert_eq!(card.outcomes[0].outcome, Outcome::NeedsReview);
        assert_eq!(card.correct_count, 1);
        assert_eq!(card.score_percent, 50);
        assert!(card.pass);
    }

    #[test]
    fn test_rounding_is_half_up() {
        assert_eq!(percent_half_up(1, 8), 13);
        assert_eq!(percent_half_up(1, 3), 33);
        assert_eq!(percent_half_up(5, 8), 63);
        assert_eq!(percent_half_up(8, 8), 100);
        assert_eq!(percent_half_up(0, 0), 0);
    }

    #[test]
    fn test_percent_stays_in_range() {
        for total in 1..40 {
            for correct in 0..=total {
                let p = percent_half_up(correct, total);
                assert!(p <= 100);
            }
        }
    }
}
