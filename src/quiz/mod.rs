//! The quiz core: timer, answer ledger, scorer and the attempt state machine.

mod ledger;
mod runner;
mod scorer;
mod session;
mod timer;

pub use ledger::AnswerLedger;
pub use runner::{AttemptContext, AttemptHandle, AttemptView, Command, spawn_attempt};
pub use scorer::{Scorecard, score};
pub use session::{AttemptStatus, QuizSession, SessionSnapshot};
pub use timer::{Countdown, TimerControl, TimerEvent, TimerSignal, TokioTimer};
