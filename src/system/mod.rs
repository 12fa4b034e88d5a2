//! The trading system: one matching engine per instrument, a dispatch table
//! keyed by resolved instrument, venue-wide administrative sequencing and
//! the scheduled phase transitions.

mod service;

pub use service::{Command, SystemHandle, VenueRuntime, launch_trading_system};

use crate::config::{PhaseSchedule, VenueConfig, ConfigError};
use crate::domain::{
    BusinessRejectReason, Instrument, InstrumentId, RejectText, RejectedMessageType, Snapshot,
    TradingStatus,
};
use crate::engine::{AggregationFlags, AggregatorConfig, MatchingEngine};
use crate::middleware::TradingReplyReceiver;
use crate::persistence::SnapshotStore;
use crate::protocol::replies::{BusinessMessageReject, InstrumentStateReply};
use crate::protocol::requests::{InstrumentStateRequest, TradingRequest};
use crate::protocol::{
    AdminResult, HaltPhaseReply, HaltPhaseRequest, RecoverMarketStateReply, ResumePhaseReply,
    SessionTerminatedEvent, StoreMarketStateReply,
};
use crate::registry::{InstrumentRegistry, LookupError};
use crate::utils::{TzClock, current_system_time};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Owns every per-instrument engine and routes typed requests to them.
pub struct TradingSystem {
    venue_id: String,
    clock: TzClock,
    registry: InstrumentRegistry,
    engines: Vec<MatchingEngine>,
    schedule: PhaseSchedule,
    store: SnapshotStore,
    replies: Arc<dyn TradingReplyReceiver>,
}

impl TradingSystem {
    /// Builds the system from configuration and the configured listings.
    pub fn new(
        config: &VenueConfig,
        listings: Vec<Instrument>,
        replies: Arc<dyn TradingReplyReceiver>,
    ) -> Result<Self, ConfigError> {
        let clock = config.clock()?;
        let schedule = config.schedule()?;
        let registry = InstrumentRegistry::from_listings(listings);

        let mut flags = AggregationFlags::empty();
        if config.publish_last_trade {
            flags |= AggregationFlags::INCLUDE_LAST_TRADE;
        }
        if config.publish_party_ids {
            flags |= AggregationFlags::CONCAT_PARTY_IDS;
        }
        let aggregation = AggregatorConfig {
            flags,
            default_depth: 0,
        };

        let engines = registry
            .instruments()
            .iter()
            .map(|instrument| {
                MatchingEngine::new(instrument.clone(), clock, aggregation, Arc::clone(&replies))
            })
            .collect();

        info!(
            venue = %config.venue_id,
            instruments = registry.len(),
            timezone = %config.timezone,
            "trading system created"
        );
        Ok(Self {
            venue_id: config.venue_id.clone(),
            clock,
            registry,
            engines,
            schedule,
            store: SnapshotStore::new(&config.snapshot_path),
            replies,
        })
    }

    /// The instrument registry.
    #[must_use]
    pub fn registry(&self) -> &InstrumentRegistry {
        &self.registry
    }

    /// Read access to one engine (used by tests and diagnostics).
    #[must_use]
    pub fn engine(&self, id: InstrumentId) -> Option<&MatchingEngine> {
        self.engines.get(id.value() as usize)
    }

    /// Mutable access to one engine (used by tests and diagnostics).
    pub fn engine_mut(&mut self, id: InstrumentId) -> Option<&mut MatchingEngine> {
        self.engines.get_mut(id.value() as usize)
    }

    /// Routes an asynchronous trading request to the owning engine, or
    /// rejects it when the instrument cannot be resolved.
    pub fn dispatch(&mut self, request: TradingRequest) {
        let instrument_id = match self.registry.resolve(request.instrument()) {
            Ok(id) => id,
            Err(lookup_error) => {
                self.reject_unroutable(&request, lookup_error);
                return;
            }
        };
        let Some(engine) = self.engines.get_mut(instrument_id.value() as usize) else {
            self.reject_unroutable(&request, LookupError::UnknownSymbol);
            return;
        };

        match request {
            TradingRequest::OrderPlacement(request) => engine.process_placement(request),
            TradingRequest::OrderModification(request) => engine.process_modification(request),
            TradingRequest::OrderCancellation(request) => engine.process_cancellation(request),
            TradingRequest::MarketData(request) => engine.process_market_data(request),
            TradingRequest::SecurityStatus(request) => engine.process_security_status(request),
        }
    }

    fn reject_unroutable(&self, request: &TradingRequest, lookup_error: LookupError) {
        let rejected_message_type = match request {
            TradingRequest::OrderPlacement(_) => RejectedMessageType::OrderPlacement,
            TradingRequest::OrderModification(_) => RejectedMessageType::OrderModification,
            TradingRequest::OrderCancellation(_) => RejectedMessageType::OrderCancellation,
            TradingRequest::MarketData(_) => RejectedMessageType::MarketDataRequest,
            TradingRequest::SecurityStatus(_) => RejectedMessageType::SecurityStatusRequest,
        };
        let business_reject_reason = match lookup_error {
            LookupError::UnknownSymbol => BusinessRejectReason::UnknownSecurity,
            LookupError::AmbiguousInstrument | LookupError::InsufficientInstrumentInfo => {
                BusinessRejectReason::Other
            }
        };
        warn!(
            venue = %self.venue_id,
            descriptor = %request.instrument(),
            %lookup_error,
            "request could not be routed"
        );
        self.replies.process(
            BusinessMessageReject {
                session: request.session().clone(),
                rejected_message_type,
                business_reject_reason,
                reject_text: RejectText::new(lookup_error.to_string()),
            }
            .into(),
        );
    }

    /// Answers the synchronous instrument-state query. An unresolvable
    /// descriptor yields an empty reply.
    #[must_use]
    pub fn instrument_state(&self, request: &InstrumentStateRequest) -> InstrumentStateReply {
        match self.registry.resolve(&request.instrument) {
            Ok(id) => self
                .engines
                .get(id.value() as usize)
                .map(MatchingEngine::instrument_state)
                .unwrap_or_default(),
            Err(lookup_error) => {
                warn!(venue = %self.venue_id, %lookup_error, "instrument state query unresolvable");
                InstrumentStateReply::default()
            }
        }
    }

    /// Halts trading on every instrument, in ascending instrument order.
    pub fn process_halt(&mut self, request: &HaltPhaseRequest) -> HaltPhaseReply {
        for engine in &mut self.engines {
            engine.halt(request.allow_cancels);
        }
        info!(venue = %self.venue_id, "venue halted");
        HaltPhaseReply {
            result: AdminResult::Success,
        }
    }

    /// Resumes trading on every instrument, in ascending instrument order.
    pub fn process_resume(&mut self) -> ResumePhaseReply {
        for engine in &mut self.engines {
            engine.resume();
        }
        info!(venue = %self.venue_id, "venue resumed");
        ResumePhaseReply {
            result: AdminResult::Success,
        }
    }

    /// Persists a venue-wide market-state snapshot.
    pub fn process_store_state(&mut self) -> StoreMarketStateReply {
        let snapshot = Snapshot {
            venue_id: self.venue_id.clone(),
            instruments: self.engines.iter().map(MatchingEngine::capture_state).collect(),
        };
        match self.store.store(&snapshot) {
            Ok(()) => StoreMarketStateReply {
                result: AdminResult::Success,
            },
            Err(store_error) => {
                error!(venue = %self.venue_id, %store_error, "market state store failed");
                StoreMarketStateReply {
                    result: AdminResult::error("store-failed", store_error.to_string()),
                }
            }
        }
    }

    /// Recovers the whole venue from the persisted snapshot.
    ///
    /// The snapshot is validated against every engine before anything is
    /// applied; a single violation aborts the recovery with the engines
    /// untouched.
    pub fn process_recover_state(&mut self) -> RecoverMarketStateReply {
        if let Some(engine) = self
            .engines
            .iter()
            .find(|engine| engine.phase().trading_phase() != crate::domain::TradingPhase::Halted)
        {
            return RecoverMarketStateReply {
                result: AdminResult::error(
                    "phase-disallows",
                    format!(
                        "instrument {} is not halted",
                        engine.instrument().identifier
                    ),
                ),
            };
        }

        let snapshot = match self.store.load() {
            Ok(snapshot) => snapshot,
            Err(store_error) => {
                error!(venue = %self.venue_id, %store_error, "market state load failed");
                return RecoverMarketStateReply {
                    result: AdminResult::error("load-failed", store_error.to_string()),
                };
            }
        };

        if snapshot.venue_id != self.venue_id {
            return RecoverMarketStateReply {
                result: AdminResult::error(
                    "venue-mismatch",
                    format!("snapshot belongs to venue {}", snapshot.venue_id),
                ),
            };
        }
        if snapshot.instruments.len() != self.engines.len() {
            return RecoverMarketStateReply {
                result: AdminResult::error(
                    "instrument-mismatch",
                    format!(
                        "snapshot holds {} instruments, venue lists {}",
                        snapshot.instruments.len(),
                        self.engines.len()
                    ),
                ),
            };
        }

        // Pair every engine with its state, in ascending instrument order.
        let mut states: Vec<Option<crate::domain::InstrumentState>> =
            vec![None; self.engines.len()];
        for state in snapshot.instruments {
            let index = state.instrument.identifier.value() as usize;
            if index >= states.len() || states[index].is_some() {
                return RecoverMarketStateReply {
                    result: AdminResult::error(
                        "instrument-mismatch",
                        format!("unexpected snapshot instrument {}", state.instrument),
                    ),
                };
            }
            states[index] = Some(state);
        }

        let mut violations = Vec::new();
        for (engine, state) in self.engines.iter().zip(&states) {
            let Some(state) = state else {
                violations.push("missing instrument state".to_owned());
                continue;
            };
            if let Err(recover_error) = engine.validate_recovery(state) {
                violations.push(format!(
                    "instrument {}: {}",
                    engine.instrument().identifier,
                    recover_error
                ));
            }
        }
        if !violations.is_empty() {
            error!(venue = %self.venue_id, ?violations, "snapshot rejected");
            return RecoverMarketStateReply {
                result: AdminResult::error("snapshot-invalid", violations.join("; ")),
            };
        }

        for (engine, state) in self.engines.iter_mut().zip(states) {
            if let Some(state) = state {
                engine.apply_recovery(state);
            }
        }
        info!(venue = %self.venue_id, "market state recovered");
        RecoverMarketStateReply {
            result: AdminResult::Success,
        }
    }

    /// Cancels resting orders of a terminated client session on every
    /// engine.
    pub fn react_on(&mut self, event: &SessionTerminatedEvent) {
        info!(venue = %self.venue_id, session = %event.session, "client session terminated");
        for engine in &mut self.engines {
            engine.react_on_session_terminated(&event.session);
        }
    }

    /// Runs one housekeeping tick: scheduled phase transitions first, then
    /// the expiry sweep of every engine.
    pub fn on_tick(&mut self) {
        let now = current_system_time();

        if !self.schedule.is_empty() {
            let local_time = now.with_timezone(&self.clock.zone()).time();
            let record = self.schedule.record_at(local_time);
            let target = record
                .map(|record| record.phase)
                .unwrap_or(crate::domain::TradingPhase::Closed);
            let allow_cancels = record.and_then(|record| record.allow_cancels);

            for engine in &mut self.engines {
                // Scheduled transitions never override an administrative
                // halt.
                if engine.phase().trading_status() == TradingStatus::Halt {
                    continue;
                }
                engine.set_trading_phase(target, allow_cancels);
            }
        }

        for engine in &mut self.engines {
            engine.tick(now);
        }
    }
}
