use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use evolve_quiz::{
    CatalogQuestionSource, FileQuestionSource, HttpQuestionSource, JsonFileStore,
    LocalPersistence, PersistenceAdapter, QuestionSource, Role, Settings, TerminalQuiz,
    UserContext, pick_quiz,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON quiz document to take
    #[arg(short = 'f', long, conflicts_with = "quiz_dir")]
    quiz_file: Option<PathBuf>,

    /// Directory of `<quiz-id>.json` documents
    #[arg(short = 'd', long)]
    quiz_dir: Option<PathBuf>,

    /// Quiz to load from the directory, the backend or the built-in catalog.
    /// Without it the available quizzes are listed to choose from.
    #[arg(short = 'i', long)]
    quiz_id: Option<String>,

    /// Fetch the quiz from the backend API
    #[arg(long)]
    remote: bool,

    #[arg(short, long, default_value = "student")]
    user: String,

    /// student, teacher, parent or admin
    #[arg(short, long, default_value = "student")]
    role: String,

    /// Where attempt history is kept (overrides `store_path`)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Default passing percentage (overrides `passing_threshold`)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    threshold: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::load().context("failed to load configuration")?;
    init_logging(&settings.log_file)?;

    let role = Role::parse_or_default(&args.role);
    let user = UserContext::new(args.user.clone(), role);
    let threshold = args.threshold.unwrap_or(settings.passing_threshold);

    let source = question_source(&args, &settings)?;
    let quiz_id = match args.quiz_id.clone() {
        Some(quiz_id) => quiz_id,
        None => match choose_quiz(source.as_ref(), &user).await? {
            Some(quiz_id) => quiz_id,
            None => return Ok(()),
        },
    };
    let quiz = source
        .load(&quiz_id)
        .await
        .with_context(|| format!("failed to load quiz '{}'", quiz_id))?;

    let store: Arc<dyn PersistenceAdapter> = if user.profile().can_take_quizzes() {
        let path = args.store.clone().unwrap_or_else(|| settings.store_path.clone());
        let file = JsonFileStore::open(&path)
            .with_context(|| format!("failed to open store at {}", path.display()))?;
        Arc::new(LocalPersistence::new(file))
    } else {
        tracing::info!(role = %role, "preview mode, results kept in memory");
        Arc::new(LocalPersistence::in_memory())
    };

    let history = match store.load_attempt_history(&user.user_id, &quiz.id).await {
        Ok(history) => history,
        Err(err) => {
            tracing::warn!("could not load attempt history: {}", err);
            Vec::new()
        }
    };

    tracing::info!(
        quiz = %quiz.id,
        user = %user.user_id,
        role = %role,
        previous_attempts = history.len(),
        "starting quiz"
    );

    TerminalQuiz::new(quiz, user, threshold, store)
        .with_history(history)
        .run()
        .await
        .context("terminal error")?;

    Ok(())
}

fn question_source(args: &Args, settings: &Settings) -> anyhow::Result<Box<dyn QuestionSource>> {
    let source: Box<dyn QuestionSource> = if let Some(path) = &args.quiz_file {
        Box::new(FileQuestionSource::file(path))
    } else if let Some(dir) = &args.quiz_dir {
        Box::new(FileQuestionSource::directory(dir))
    } else if args.remote {
        Box::new(HttpQuestionSource::new(
            settings.api_base_url.clone(),
            settings.request_timeout(),
        )?)
    } else {
        Box::new(CatalogQuestionSource::demo()?)
    };
    Ok(source)
}

/// Opens the only quiz on offer directly, otherwise asks.
async fn choose_quiz(
    source: &dyn QuestionSource,
    user: &UserContext,
) -> anyhow::Result<Option<String>> {
    let mut quizzes = source.list().await.context("failed to list quizzes")?;
    tracing::info!(available = quizzes.len(), "listed quizzes");

    match quizzes.len() {
        0 => anyhow::bail!("no quizzes available"),
        1 => Ok(quizzes.pop().map(|quiz| quiz.id)),
        _ => pick_quiz(quizzes, user.clone()).context("terminal error"),
    }
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evolve_quiz=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}
