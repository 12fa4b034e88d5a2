//! Cooperative runtime loop.
//!
//! A single-threaded scheduler that multiplexes inbound commands with a
//! fixed 1 Hz tick. Scheduled tasks run once per tick in insertion order and
//! must be non-blocking; `run` blocks its thread until the loop is
//! terminated, either through [`LoopHandle::terminate`] from another thread
//! or by the command handler breaking out.

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::select;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

/// A scheduled task fired once per tick.
pub type Task = Box<dyn FnMut()>;

/// Cross-thread handle used to stop a running [`Loop`].
#[derive(Debug, Clone)]
pub struct LoopHandle {
    running: Arc<AtomicBool>,
    waker: Sender<()>,
}

impl LoopHandle {
    /// Stops the loop. The runtime thread finishes the operation in flight
    /// and returns from `run`; terminating an already stopped loop is a
    /// no-op.
    pub fn terminate(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.waker.try_send(());
    }

    /// True while the loop has not been terminated.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Single-threaded cooperative scheduler with a fixed tick rate.
pub struct Loop {
    tasks: Vec<Task>,
    tick_period: Duration,
    running: Arc<AtomicBool>,
    waker_rx: Receiver<()>,
    waker_tx: Sender<()>,
}

impl Loop {
    /// Creates a loop firing scheduled tasks once per second.
    #[must_use]
    pub fn one_second_rate() -> Self {
        Self::with_tick_period(Duration::from_secs(1))
    }

    /// Creates a loop with an explicit tick period (tests use short ones).
    #[must_use]
    pub fn with_tick_period(tick_period: Duration) -> Self {
        let (waker_tx, waker_rx) = channel::bounded(1);
        Self {
            tasks: Vec::new(),
            tick_period,
            running: Arc::new(AtomicBool::new(true)),
            waker_rx,
            waker_tx,
        }
    }

    /// Schedules a task; tasks fire in insertion order on every tick.
    pub fn add(&mut self, task: impl FnMut() + 'static) {
        self.tasks.push(Box::new(task));
    }

    /// A handle for terminating the loop from another thread.
    #[must_use]
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            running: Arc::clone(&self.running),
            waker: self.waker_tx.clone(),
        }
    }

    /// Runs the loop on the current thread.
    ///
    /// Commands are handed to `on_command` as they arrive; between commands
    /// the thread sleeps until the next tick. Returning
    /// `ControlFlow::Break(())` from the handler stops the loop, as does
    /// [`LoopHandle::terminate`] or every command sender disconnecting.
    pub fn run<C>(
        mut self,
        commands: &Receiver<C>,
        mut on_command: impl FnMut(C) -> ControlFlow<()>,
    ) {
        let ticker = channel::tick(self.tick_period);
        debug!(tick_period_ms = self.tick_period.as_millis() as u64, "runtime loop started");

        loop {
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            select! {
                recv(commands) -> message => match message {
                    Ok(command) => {
                        if on_command(command).is_break() {
                            break;
                        }
                    }
                    // All producers are gone; nothing can arrive any more.
                    Err(_) => break,
                },
                recv(ticker) -> _ => {
                    for task in &mut self.tasks {
                        task();
                    }
                }
                recv(self.waker_rx) -> _ => {}
            }
        }

        debug!("runtime loop stopped");
    }
}
