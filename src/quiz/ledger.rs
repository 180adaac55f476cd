use std::collections::HashMap;

use crate::error::QuizError;
use crate::models::QuestionSet;

/// The respondent's answers, keyed by question id.
///
/// A missing key means the question is unanswered. Recording a second
/// answer for the same question replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerLedger {
    answers: HashMap<String, String>,
}

impl AnswerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer, returning the one it replaced.
    pub fn record(
        &mut self,
        questions: &QuestionSet,
        question_id: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>, QuizError> {
        if !questions.contains(question_id) {
            return Err(QuizError::UnknownQuestion(question_id.to_string()));
        }
        Ok(self.answers.insert(question_id.to_string(), value.into()))
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.answers.contains_key(question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn is_complete(&self, questions: &QuestionSet) -> bool {
        questions.iter().all(|q| self.is_answered(&q.id))
    }

    /// Ids of unanswered questions, in question order.
    pub fn unanswered<'a>(&self, questions: &'a QuestionSet) -> Vec<&'a str> {
        questions
            .iter()
            .filter(|q| !self.is_answered(&q.id))
            .map(|q| q.id.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;

    fn questions() -> QuestionSet {
        QuestionSet::new(vec![
            Question::single_select("q1", "2 + 2?", &["3", "4"], "4"),
            Question::true_false("q2", "Even + even is even.", true),
            Question::short_answer("q3", "Name a prime.", "7"),
        ])
        .unwrap()
    }

    #[test]
    fn test_last_write_wins() {
        let set = questions();
        let mut ledger = AnswerLedger::new();

        assert_eq!(ledger.record(&set, "q1", "3").unwrap(), None);
        assert_eq!(ledger.record(&set, "q1", "4").unwrap(), Some("3".to_string()));
        assert_eq!(ledger.answer_for("q1"), Some("4"));
        assert_eq!(ledger.answered_count(), 1);
    }

    #[test]
    fn test_rejects_unknown_question() {
        let set = questions();
        let mut ledger = AnswerLedger::new();

        let err = ledger.record(&set, "q9", "x").unwrap_err();
        assert_eq!(err, QuizError::UnknownQuestion("q9".to_string()));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_completeness() {
        let set = questions();
        let mut ledger = AnswerLedger::new();
        ledger.record(&set, "q2", "True").unwrap();

        assert!(!ledger.is_complete(&set));
        assert_eq!(ledger.unanswered(&set), vec!["q1", "q3"]);

        ledger.record(&set, "q1", "4").unwrap();
        ledger.record(&set, "q3", "11").unwrap();
        assert!(ledger.is_complete(&set));

        ledger.clear();
        assert!(!ledger.is_answered("q1"));
    }
}
