//! Countdown timers.
//!
//! [`Countdown`] is the pure state: it is advanced by calling
//! [`Countdown::tick`] once per elapsed second. [`TokioTimer`] drives a
//! countdown from a spawned task on a one second cadence and delivers the
//! events over a channel. Both implement [`TimerControl`], the seam the
//! session state machine talks to.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Something a running countdown reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; carries the seconds still remaining.
    Tick(u32),
    /// Remaining time reached zero. Emitted once per run.
    Expired,
}

/// A timer event stamped with the run that produced it.
///
/// Restarting a timer bumps the run id, which lets receivers drop events
/// still queued from an earlier run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSignal {
    pub run: u64,
    pub event: TimerEvent,
}

impl TimerSignal {
    pub fn new(run: u64, event: TimerEvent) -> Self {
        Self { run, event }
    }
}

/// Control surface shared by the manual and the tokio-driven timers.
pub trait TimerControl {
    /// Starts a new run, stopping any previous one. Returns the run id.
    fn start(&mut self, duration_seconds: u32) -> u64;
    /// Halts counting. Calling it again has no effect.
    fn stop(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Paused,
    Stopped,
    Expired,
}

/// Pure countdown, advanced by explicit calls to [`Countdown::tick`].
#[derive(Debug, Clone)]
pub struct Countdown {
    run: u64,
    duration: u32,
    remaining: u32,
    phase: Phase,
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            run: 0,
            duration: 0,
            remaining: 0,
            phase: Phase::Idle,
        }
    }

    /// Advances by one second.
    ///
    /// A five second run yields `Tick(4)` through `Tick(0)`; the tick that
    /// reaches zero is followed by `Expired`, after which nothing more is
    /// emitted.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        if self.phase != Phase::Running {
            return Vec::new();
        }

        let mut events = Vec::with_capacity(2);
        if self.remaining > 0 {
            self.remaining -= 1;
            events.push(TimerEvent::Tick(self.remaining));
        }
        if self.remaining == 0 {
            self.phase = Phase::Expired;
            events.push(TimerEvent::Expired);
        }
        events
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed(&self) -> u32 {
        self.duration - self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    /// True once the run has expired or been stopped.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Stopped | Phase::Expired)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerControl for Countdown {
    fn start(&mut self, duration_seconds: u32) -> u64 {
        self.run += 1;
        self.duration = duration_seconds;
        self.remaining = duration_seconds;
        self.phase = Phase::Running;
        self.run
    }

    fn stop(&mut self) {
        if matches!(self.phase, Phase::Running | Phase::Paused) {
            self.phase = Phase::Stopped;
        }
    }

    fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
        }
    }

    fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
        }
    }
}

enum Control {
    Pause,
    Resume,
}

/// Timer that ticks on its own from a tokio task.
///
/// Must be started from within a tokio runtime.
pub struct TokioTimer {
    signals: mpsc::UnboundedSender<TimerSignal>,
    control: Option<mpsc::UnboundedSender<Control>>,
    task: Option<JoinHandle<()>>,
    run: u64,
}

impl TokioTimer {
    pub fn new(signals: mpsc::UnboundedSender<TimerSignal>) -> Self {
        Self {
            signals,
            control: None,
            task: None,
            run: 0,
        }
    }

    /// Creates a timer together with the receiving end of its signals.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn send(&self, msg: Control) {
        if let Some(control) = &self.control {
            let _ = control.send(msg);
        }
    }
}

impl TimerControl for TokioTimer {
    fn start(&mut self, duration_seconds: u32) -> u64 {
        self.stop();
        self.run += 1;

        let (control_tx, control_rx) = mpsc::unbounded_channel();
        self.control = Some(control_tx);
        self.task = Some(tokio::spawn(drive(
            self.run,
            duration_seconds,
            self.signals.clone(),
            control_rx,
        )));

        tracing::debug!(run = self.run, duration_seconds, "timer started");
        self.run
    }

    fn stop(&mut self) {
        self.control = None;
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(run = self.run, "timer stopped");
        }
    }

    fn pause(&mut self) {
        self.send(Control::Pause);
    }

    fn resume(&mut self) {
        self.send(Control::Resume);
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn drive(
    run: u64,
    duration_seconds: u32,
    signals: mpsc::UnboundedSender<TimerSignal>,
    mut control: mpsc::UnboundedReceiver<Control>,
) {
    let mut countdown = Countdown::new();
    countdown.start(duration_seconds);

    let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            msg = control.recv() => match msg {
                Some(Control::Pause) => countdown.pause(),
                Some(Control::Resume) => {
                    // The partial second before the pause is not counted.
                    countdown.resume();
                    interval.reset();
                }
                None => break,
            },
            _ = interval.tick() => {
                for event in countdown.tick() {
                    if signals.send(TimerSignal::new(run, event)).is_err() {
                        return;
                    }
                }
                if countdown.is_finished() {
                    break;
                }
            }
        }
    }
}
