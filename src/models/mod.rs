mod question;
mod result;
mod study;

pub use question::{Question, QuestionKind, QuestionSet, Quiz, QuizDocument, QuizSummary};
pub use result::{Completion, Outcome, QuestionOutcome, QuizResult, format_clock};
pub use study::{Bookmark, StudyNote};
