use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

const TRUE_FALSE_OPTIONS: [&str; 2] = ["True", "False"];

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    /// Pick exactly one of the listed options.
    #[serde(rename = "multiple_choice", alias = "single_select")]
    SingleSelect,
    #[serde(rename = "true_false")]
    TrueFalse,
    /// Free text. The correct answer is a reference shown after grading.
    #[serde(rename = "short_answer")]
    ShortAnswer,
}

impl QuestionKind {
    pub fn has_options(self) -> bool {
        !matches!(self, QuestionKind::ShortAnswer)
    }
}

fn default_points() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default = "default_points")]
    pub points: u32,
}

impl Question {
    /// A single-select question worth one point.
    pub fn single_select(
        id: impl Into<String>,
        prompt: impl Into<String>,
        options: &[&str],
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind: QuestionKind::SingleSelect,
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: correct_answer.into(),
            explanation: None,
            points: 1,
        }
    }

    pub fn true_false(id: impl Into<String>, prompt: impl Into<String>, correct: bool) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind: QuestionKind::TrueFalse,
            options: TRUE_FALSE_OPTIONS.iter().map(|o| o.to_string()).collect(),
            correct_answer: if correct { "True" } else { "False" }.to_string(),
            explanation: None,
            points: 1,
        }
    }

    pub fn short_answer(
        id: impl Into<String>,
        prompt: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind: QuestionKind::ShortAnswer,
            options: Vec::new(),
            correct_answer: reference.into(),
            explanation: None,
            points: 1,
        }
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    fn validate(&mut self) -> Result<(), LoadError> {
        if self.points == 0 {
            return Err(LoadError::Invalid(format!(
                "question `{}` must be worth at least one point",
                self.id
            )));
        }

        match self.kind {
            QuestionKind::ShortAnswer => {
                self.options.clear();
            }
            QuestionKind::TrueFalse if self.options.is_empty() => {
                self.options = TRUE_FALSE_OPTIONS.iter().map(|o| o.to_string()).collect();
            }
            QuestionKind::SingleSelect if self.options.is_empty() => {
                return Err(LoadError::Invalid(format!(
                    "question `{}` has no options",
                    self.id
                )));
            }
            _ => {}
        }

        if self.kind.has_options() && !self.options.contains(&self.correct_answer) {
            return Err(LoadError::Invalid(format!(
                "question `{}` has a correct answer that is not one of its options",
                self.id
            )));
        }

        Ok(())
    }
}

/// An ordered, non-empty sequence of questions with unique ids.
///
/// The order defines the navigation sequence of an attempt and never
/// changes once the set is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
    index: HashMap<String, usize>,
    total_points: u32,
}

impl QuestionSet {
    pub fn new(mut questions: Vec<Question>) -> Result<Self, LoadError> {
        if questions.is_empty() {
            return Err(LoadError::Invalid(
                "a quiz must contain at least one question".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &mut questions {
            if !seen.insert(question.id.clone()) {
                return Err(LoadError::Invalid(format!(
                    "duplicate question id `{}`",
                    question.id
                )));
            }
            question.validate()?;
        }

        let total_points = questions
            .iter()
            .try_fold(0u32, |total, q| total.checked_add(q.points))
            .ok_or_else(|| {
                LoadError::Invalid(format!("question points add up to more than {}", u32::MAX))
            })?;

        let index = questions
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id.clone(), i))
            .collect();

        Ok(Self {
            questions,
            index,
            total_points,
        })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed set; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Question> {
        self.questions.get(position)
    }

    pub fn find(&self, id: &str) -> Option<&Question> {
        self.index.get(id).map(|&i| &self.questions[i])
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn as_slice(&self) -> &[Question] {
        &self.questions
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

/// A quiz as served by the question source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    /// `None` for untimed quizzes.
    pub time_limit_seconds: Option<u32>,
    /// Passing threshold in percent, when the quiz sets its own.
    pub passing_score: Option<u32>,
    pub questions: QuestionSet,
}

impl Quiz {
    pub fn new(id: impl Into<String>, title: impl Into<String>, questions: QuestionSet) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            time_limit_seconds: None,
            passing_score: None,
            questions,
        }
    }

    pub fn with_time_limit(mut self, seconds: u32) -> Self {
        self.time_limit_seconds = (seconds > 0).then_some(seconds);
        self
    }

    pub fn with_passing_score(mut self, percent: u32) -> Self {
        self.passing_score = Some(percent);
        self
    }

    /// The quiz's own threshold, or `default` when it has none.
    pub fn passing_threshold(&self, default: u32) -> u32 {
        self.passing_score.unwrap_or(default)
    }
}

/// A quiz as listed for picking, without its questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub question_count: usize,
    pub time_limit_seconds: Option<u32>,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            question_count: quiz.questions.len(),
            time_limit_seconds: quiz.time_limit_seconds,
        }
    }
}

/// Wire form of a quiz document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDocument {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
    #[serde(default)]
    pub passing_score: Option<u32>,
    pub questions: Vec<Question>,
}

impl TryFrom<QuizDocument> for Quiz {
    type Error = LoadError;

    fn try_from(doc: QuizDocument) -> Result<Self, Self::Error> {
        if let Some(score) = doc.passing_score {
            if score > 100 {
                return Err(LoadError::Invalid(format!(
                    "passing score {} is above 100",
                    score
                )));
            }
        }

        Ok(Self {
            id: doc.id,
            title: doc.title,
            time_limit_seconds: doc.time_limit_seconds.filter(|s| *s > 0),
            passing_score: doc.passing_score,
            questions: QuestionSet::new(doc.questions)?,
        })
    }
}
