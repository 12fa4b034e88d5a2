//! Runtime-thread marshalling.
//!
//! [`SystemHandle`] implements the middleware receiver contracts by
//! enqueueing typed commands into a bounded channel drained by the runtime
//! thread; synchronous operations block the caller on a one-shot reply
//! channel with an optional deadline. The runtime thread owns the
//! [`TradingSystem`] and multiplexes commands with the 1 Hz housekeeping
//! tick.

use super::TradingSystem;
use crate::config::{ConfigError, VenueConfig};
use crate::domain::Instrument;
use crate::middleware::{
    TradingAdminRequestReceiver, TradingReplyReceiver, TradingRequestReceiver,
    TradingSessionEventListener,
};
use crate::protocol::replies::InstrumentStateReply;
use crate::protocol::requests::{InstrumentStateRequest, TradingRequest};
use crate::protocol::{
    AdminResult, HaltPhaseReply, HaltPhaseRequest, RecoverMarketStateReply,
    RecoverMarketStateRequest, ResumePhaseReply, ResumePhaseRequest, SessionTerminatedEvent,
    StoreMarketStateReply, StoreMarketStateRequest,
};
use crate::runtime::Loop;
use crossbeam::channel::{self, Sender};
use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

/// Default deadline applied to synchronous operations.
const DEFAULT_SYNC_DEADLINE: Duration = Duration::from_secs(5);

/// A command marshalled onto the runtime thread.
pub enum Command {
    Request(TradingRequest),
    SessionTerminated(SessionTerminatedEvent),
    InstrumentState {
        request: InstrumentStateRequest,
        reply_tx: Sender<InstrumentStateReply>,
    },
    Halt {
        request: HaltPhaseRequest,
        reply_tx: Sender<HaltPhaseReply>,
    },
    Resume {
        reply_tx: Sender<ResumePhaseReply>,
    },
    StoreState {
        reply_tx: Sender<StoreMarketStateReply>,
    },
    RecoverState {
        reply_tx: Sender<RecoverMarketStateReply>,
    },
    Terminate,
}

/// Cloneable frontend-side handle of the trading system.
#[derive(Clone)]
pub struct SystemHandle {
    commands: Sender<Command>,
    sync_deadline: Option<Duration>,
}

impl SystemHandle {
    /// Overrides the deadline applied to synchronous operations; `None`
    /// waits indefinitely.
    #[must_use]
    pub fn with_sync_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.sync_deadline = deadline;
        self
    }

    fn submit(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!("trading system is no longer running, command dropped");
        }
    }

    /// Sends a sync command and waits for its reply within the deadline.
    fn roundtrip<R>(&self, build: impl FnOnce(Sender<R>) -> Command) -> Option<R> {
        let (reply_tx, reply_rx) = channel::bounded(1);
        if self.commands.send(build(reply_tx)).is_err() {
            warn!("trading system is no longer running, sync request dropped");
            return None;
        }
        let received = match self.sync_deadline {
            Some(deadline) => reply_rx.recv_timeout(deadline).ok(),
            None => reply_rx.recv().ok(),
        };
        if received.is_none() {
            warn!("synchronous request timed out; the operation still completes");
        }
        received
    }
}

impl TradingRequestReceiver for SystemHandle {
    fn process(&self, request: TradingRequest) {
        self.submit(Command::Request(request));
    }

    fn process_instrument_state(
        &self,
        request: &InstrumentStateRequest,
        reply: &mut InstrumentStateReply,
    ) {
        if let Some(filled) = self.roundtrip(|reply_tx| Command::InstrumentState {
            request: request.clone(),
            reply_tx,
        }) {
            *reply = filled;
        }
    }
}

impl TradingAdminRequestReceiver for SystemHandle {
    fn process_halt(&self, request: &HaltPhaseRequest, reply: &mut HaltPhaseReply) {
        match self.roundtrip(|reply_tx| Command::Halt {
            request: *request,
            reply_tx,
        }) {
            Some(filled) => *reply = filled,
            None => reply.result = timeout_result(),
        }
    }

    fn process_resume(&self, _request: &ResumePhaseRequest, reply: &mut ResumePhaseReply) {
        match self.roundtrip(|reply_tx| Command::Resume { reply_tx }) {
            Some(filled) => *reply = filled,
            None => reply.result = timeout_result(),
        }
    }

    fn process_store(
        &self,
        _request: &StoreMarketStateRequest,
        reply: &mut StoreMarketStateReply,
    ) {
        match self.roundtrip(|reply_tx| Command::StoreState { reply_tx }) {
            Some(filled) => *reply = filled,
            None => reply.result = timeout_result(),
        }
    }

    fn process_recover(
        &self,
        _request: &RecoverMarketStateRequest,
        reply: &mut RecoverMarketStateReply,
    ) {
        match self.roundtrip(|reply_tx| Command::RecoverState { reply_tx }) {
            Some(filled) => *reply = filled,
            None => reply.result = timeout_result(),
        }
    }
}

impl TradingSessionEventListener for SystemHandle {
    fn on_event(&self, event: SessionTerminatedEvent) {
        self.submit(Command::SessionTerminated(event));
    }
}

fn timeout_result() -> AdminResult {
    AdminResult::error("timeout", "operation did not complete within the deadline")
}

/// A launched venue: the runtime thread plus the frontend handle.
pub struct VenueRuntime {
    handle: SystemHandle,
    thread: Option<JoinHandle<()>>,
}

impl VenueRuntime {
    /// The frontend-side handle; clone it into every channel binding.
    #[must_use]
    pub fn handle(&self) -> SystemHandle {
        self.handle.clone()
    }

    /// Stops the runtime thread and waits for it to finish.
    pub fn terminate(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.handle.commands.send(Command::Terminate);
            if thread.join().is_err() {
                warn!("venue runtime thread terminated abnormally");
            }
        }
    }
}

impl Drop for VenueRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Builds the trading system and starts its runtime thread.
///
/// The system is constructed on the caller's thread so configuration
/// errors surface synchronously; the runtime thread then takes ownership
/// and serves commands at up to `command_queue_capacity` in flight,
/// multiplexed with the 1 Hz housekeeping tick.
pub fn launch_trading_system(
    config: &VenueConfig,
    listings: Vec<Instrument>,
    replies: std::sync::Arc<dyn TradingReplyReceiver>,
) -> Result<VenueRuntime, ConfigError> {
    let system = TradingSystem::new(config, listings, replies)?;
    let (command_tx, command_rx) = channel::bounded(config.command_queue_capacity.max(1));

    let thread = std::thread::spawn(move || {
        let system = Rc::new(RefCell::new(system));
        let mut runtime = Loop::one_second_rate();

        let housekeeping = Rc::clone(&system);
        runtime.add(move || housekeeping.borrow_mut().on_tick());

        runtime.run(&command_rx, move |command| {
            handle_command(&mut system.borrow_mut(), command)
        });
        debug!("venue runtime thread finished");
    });

    Ok(VenueRuntime {
        handle: SystemHandle {
            commands: command_tx,
            sync_deadline: Some(DEFAULT_SYNC_DEADLINE),
        },
        thread: Some(thread),
    })
}

fn handle_command(system: &mut TradingSystem, command: Command) -> ControlFlow<()> {
    match command {
        Command::Request(request) => system.dispatch(request),
        Command::SessionTerminated(event) => system.react_on(&event),
        Command::InstrumentState { request, reply_tx } => {
            let _ = reply_tx.send(system.instrument_state(&request));
        }
        Command::Halt { request, reply_tx } => {
            let _ = reply_tx.send(system.process_halt(&request));
        }
        Command::Resume { reply_tx } => {
            let _ = reply_tx.send(system.process_resume());
        }
        Command::StoreState { reply_tx } => {
            let _ = reply_tx.send(system.process_store_state());
        }
        Command::RecoverState { reply_tx } => {
            let _ = reply_tx.send(system.process_recover_state());
        }
        Command::Terminate => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}
