use std::fs;
use std::path::PathBuf;

use evolve_quiz::quiz::Countdown;
use evolve_quiz::{
    FileQuestionSource, JsonFileStore, LoadError, LocalPersistence, PersistenceAdapter,
    QuestionKind, QuestionSource, QuizSession, QuizSummary,
};
use uuid::Uuid;

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("evolve-quiz-it-{}", Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const DOCUMENT: &str = r#"{
    "id": "physics-101",
    "title": "Forces",
    "timeLimitSeconds": 120,
    "passingScore": 50,
    "questions": [
        {
            "id": "f1",
            "question": "Which law says F = ma?",
            "type": "multiple_choice",
            "options": ["First", "Second", "Third"],
            "correctAnswer": "Second",
            "explanation": "Newton's second law relates force, mass and acceleration."
        },
        {
            "id": "f2",
            "question": "An object at rest stays at rest unless acted on.",
            "type": "true_false",
            "correctAnswer": "True"
        }
    ]
}"#;

#[tokio::test]
async fn quiz_document_loads_from_directory() {
    let dir = scratch_dir();
    fs::write(dir.join("physics-101.json"), DOCUMENT).unwrap();

    let source = FileQuestionSource::directory(&dir);
    let quiz = source.load("physics-101").await.unwrap();
    assert_eq!(quiz.title, "Forces");
    assert_eq!(quiz.time_limit_seconds, Some(120));
    assert_eq!(quiz.passing_threshold(70), 50);
    assert_eq!(quiz.questions.len(), 2);

    let tf = quiz.questions.find("f2").unwrap();
    assert_eq!(tf.kind, QuestionKind::TrueFalse);
    assert_eq!(tf.options, vec!["True", "False"]);

    assert!(matches!(
        source.load("chemistry").await,
        Err(LoadError::NotFound(id)) if id == "chemistry"
    ));

    fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn listed_quizzes_can_be_loaded() {
    let dir = scratch_dir();
    fs::write(dir.join("physics-101.json"), DOCUMENT).unwrap();
    fs::write(
        dir.join("physics-102.json"),
        DOCUMENT.replace("physics-101", "physics-102"),
    )
    .unwrap();

    let source = FileQuestionSource::directory(&dir);
    let listed = source.list().await.unwrap();
    assert_eq!(listed.len(), 2);

    for summary in &listed {
        let quiz = source.load(&summary.id).await.unwrap();
        assert_eq!(QuizSummary::from(&quiz), *summary);
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn saved_result_is_last_in_history_after_reopen() {
    let dir = scratch_dir();
    let quiz_path = dir.join("physics-101.json");
    fs::write(&quiz_path, DOCUMENT).unwrap();
    let quiz = FileQuestionSource::file(&quiz_path)
        .load("physics-101")
        .await
        .unwrap();

    let store_path = dir.join("store.json");
    let mut saved = Vec::new();

    for answer in ["First", "Second"] {
        let store = LocalPersistence::new(JsonFileStore::open(&store_path).unwrap());
        let mut session = QuizSession::new(&quiz.id, quiz.passing_threshold(70), Countdown::new());
        session
            .begin(quiz.questions.clone(), quiz.time_limit_seconds)
            .unwrap();
        session.answer("f1", answer).unwrap();
        let result = session.submit().unwrap().clone();

        store
            .save_attempt_result("student-1", &quiz.id, &result)
            .await
            .unwrap();
        saved.push(result);
    }

    let store = LocalPersistence::new(JsonFileStore::open(&store_path).unwrap());
    let history = store
        .load_attempt_history("student-1", &quiz.id)
        .await
        .unwrap();
    assert_eq!(history, saved);
    assert_eq!(history.last().map(|r| r.score_percent), Some(50));
    assert!(history.last().is_some_and(|r| r.pass));

    assert!(store
        .load_attempt_history("student-2", &quiz.id)
        .await
        .unwrap()
        .is_empty());

    fs::remove_dir_all(&dir).unwrap();
}
