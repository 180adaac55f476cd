use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::LoadError;
use crate::models::{Question, QuestionSet, Quiz, QuizSummary};

use super::QuestionSource;

/// Quizzes held in memory.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuestionSource {
    quizzes: HashMap<String, Quiz>,
}

impl CatalogQuestionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quiz(mut self, quiz: Quiz) -> Self {
        self.insert(quiz);
        self
    }

    pub fn insert(&mut self, quiz: Quiz) {
        self.quizzes.insert(quiz.id.clone(), quiz);
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    /// The built-in offline catalog.
    pub fn demo() -> Result<Self, LoadError> {
        Ok(Self::new().with_quiz(algebra_fundamentals()?))
    }
}

#[async_trait]
impl QuestionSource for CatalogQuestionSource {
    async fn load(&self, quiz_id: &str) -> Result<Quiz, LoadError> {
        self.quizzes
            .get(quiz_id)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(quiz_id.to_string()))
    }

    async fn list(&self) -> Result<Vec<QuizSummary>, LoadError> {
        let mut summaries: Vec<QuizSummary> =
            self.quizzes.values().map(QuizSummary::from).collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }
}

pub const DEMO_QUIZ_ID: &str = "algebra-fundamentals";

fn algebra_fundamentals() -> Result<Quiz, LoadError> {
    let questions = QuestionSet::new(vec![
        Question::single_select(
            "1",
            "What is the solution to the equation 2x + 5 = 13?",
            &["x = 4", "x = 5", "x = 6", "x = 7"],
            "x = 4",
        )
        .with_explanation("Subtract 5 from both sides: 2x = 8, then divide by 2: x = 4"),
        Question::single_select(
            "2",
            "Which of the following is a quadratic equation?",
            &["x + 2 = 5", "x² + 3x + 1 = 0", "2x + 3 = 7", "x³ + 2 = 10"],
            "x² + 3x + 1 = 0",
        )
        .with_explanation("A quadratic equation has the form ax² + bx + c = 0 where a ≠ 0"),
        Question::true_false(
            "3",
            "True or False: The sum of two even numbers is always even.",
            true,
        )
        .with_explanation("Even numbers can be written as 2n, so 2n + 2m = 2(n + m), which is even"),
        Question::short_answer(
            "4",
            "In your own words, what does it mean to solve an equation?",
            "Find the values of the variable that make both sides equal",
        )
        .with_points(2),
    ])?;

    Ok(Quiz::new(DEMO_QUIZ_ID, "Algebra Fundamentals Quiz", questions)
        .with_time_limit(30 * 60)
        .with_passing_score(70))
}
