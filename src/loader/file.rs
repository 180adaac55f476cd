use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::LoadError;
use crate::models::{Quiz, QuizDocument, QuizSummary};

use super::QuestionSource;

/// Reads and validates one quiz document from disk.
pub fn load_quiz_from_json<P: AsRef<Path>>(path: P) -> Result<Quiz, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let document: QuizDocument =
        serde_json::from_str(&json_content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Quiz::try_from(document)
}

/// Quizzes stored as JSON files.
///
/// Either a directory holding `<quiz_id>.json` documents, or one file
/// serving the single quiz it contains.
#[derive(Debug, Clone)]
pub enum FileQuestionSource {
    Directory(PathBuf),
    File(PathBuf),
}

impl FileQuestionSource {
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::Directory(path.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }
}

/// Every loadable `<quiz_id>.json` in `dir`. Unreadable documents are skipped.
fn scan_directory(dir: &Path) -> Result<Vec<QuizSummary>, LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut summaries = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(err) => {
                tracing::warn!(dir = %dir.display(), "skipping directory entry: {}", err);
                continue;
            }
        };
        if path.extension().is_none_or(|ext| ext != "json") || !path.is_file() {
            continue;
        }

        match load_quiz_from_json(&path) {
            Ok(quiz) if path.file_stem().is_some_and(|stem| stem == quiz.id.as_str()) => {
                summaries.push(QuizSummary::from(&quiz));
            }
            Ok(quiz) => {
                tracing::warn!(
                    path = %path.display(),
                    quiz = %quiz.id,
                    "file name does not match quiz id"
                );
            }
            Err(err) => tracing::warn!(path = %path.display(), "skipping quiz: {}", err),
        }
    }

    summaries.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(summaries)
}

#[async_trait]
impl QuestionSource for FileQuestionSource {
    async fn load(&self, quiz_id: &str) -> Result<Quiz, LoadError> {
        match self {
            Self::Directory(dir) => {
                let path = dir.join(format!("{}.json", quiz_id));
                if !path.is_file() {
                    return Err(LoadError::NotFound(quiz_id.to_string()));
                }
                let quiz = load_quiz_from_json(&path)?;
                if quiz.id != quiz_id {
                    return Err(LoadError::Invalid(format!(
                        "{} holds quiz `{}`, expected `{}`",
                        path.display(),
                        quiz.id,
                        quiz_id
                    )));
                }
                Ok(quiz)
            }
            Self::File(path) => {
                let quiz = load_quiz_from_json(path)?;
                if quiz.id == quiz_id {
                    Ok(quiz)
                } else {
                    Err(LoadError::NotFound(quiz_id.to_string()))
                }
            }
        }
    }

    async fn list(&self) -> Result<Vec<QuizSummary>, LoadError> {
        match self {
            Self::Directory(dir) => scan_directory(dir),
            Self::File(path) => Ok(vec![QuizSummary::from(&load_quiz_from_json(path)?)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const QUIZ: &str = r#"{
        "id": "physics-1",
        "title": "Physics Laws Quiz",
        "timeLimitSeconds": 1500,
        "questions": [
            {
                "id": "q1",
                "question": "Force equals mass times...?",
                "type": "multiple_choice",
                "options": ["velocity", "acceleration"],
                "correctAnswer": "acceleration"
            }
        ]
    }"#;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("evolve-quiz-src-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_directory_source() {
        let dir = temp_dir();
        fs::write(dir.join("physics-1.json"), QUIZ).unwrap();
        let source = FileQuestionSource::directory(&dir);

        let quiz = source.load("physics-1").await.unwrap();
        assert_eq!(quiz.title, "Physics Laws Quiz");
        assert_eq!(quiz.questions.len(), 1);

        assert!(matches!(
            source.load("chemistry-1").await,
            Err(LoadError::NotFound(id)) if id == "chemistry-1"
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let dir = temp_dir();
        fs::write(dir.join("physics-1.json"), QUIZ).unwrap();
        fs::write(
            dir.join("chemistry-1.json"),
            QUIZ.replace("physics-1", "chemistry-1")
                .replace("Physics Laws Quiz", "Atoms"),
        )
        .unwrap();
        fs::write(dir.join("broken.json"), "{").unwrap();
        fs::write(dir.join("renamed.json"), QUIZ).unwrap();
        fs::write(dir.join("notes.txt"), "not a quiz").unwrap();

        let source = FileQuestionSource::directory(&dir);
        let summaries = source.list().await.unwrap();
        let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["chemistry-1", "physics-1"]);
        assert_eq!(summaries[0].title, "Atoms");
        assert_eq!(summaries[1].question_count, 1);
        assert_eq!(summaries[1].time_limit_seconds, Some(1500));

        for summary in &summaries {
            assert!(source.load(&summary.id).await.is_ok());
        }

        fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(source.list().await, Err(LoadError::Io { .. })));
    }

    #[tokio::test]
    async fn test_file_source_lists_its_quiz() {
        let dir = temp_dir();
        let path = dir.join("quiz.json");
        fs::write(&path, QUIZ).unwrap();

        let summaries = FileQuestionSource::file(&path).list().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "physics-1");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_file_source_checks_id() {
        let dir = temp_dir();
        let path = dir.join("quiz.json");
        fs::write(&path, QUIZ).unwrap();
        let source = FileQuestionSource::file(&path);

        assert!(source.load("physics-1").await.is_ok());
        assert!(matches!(source.load("other").await, Err(LoadError::NotFound(_))));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = temp_dir();
        let path = dir.join("broken.json");
        fs::write(&path, "[1, 2").unwrap();

        let err = load_quiz_from_json(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
