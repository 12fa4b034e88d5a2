//! # Market-Simulator Trading Venue
//!
//! A trading venue core for market simulation written in Rust. The crate
//! maintains one limit order book per instrument, matches order flow under
//! strict price-time priority, aggregates and publishes market data, and
//! persists complete market-state snapshots.
//!
//! ## Key Components
//!
//! - **Typed domain values**: every domain scalar is a distinct wrapper
//!   type ([`domain::attributes`]); enumerations serialize as the textual
//!   labels of the persisted snapshot format.
//! - **Order book**: two price-time ordered pages per instrument with
//!   strict FIFO at equal prices ([`book`]).
//! - **Matching engine**: a per-instrument state machine covering
//!   placement, modification, cancellation, expiry sweeps, continuous
//!   matching, auction uncrossing, market-data subscriptions and
//!   store/recover of market state ([`engine`]).
//! - **Validators**: pure checker chains over order, trade and aggregate
//!   values that short-circuit on the first violation ([`validation`]).
//! - **Trading system**: owns every engine, resolves client instrument
//!   descriptors through the registry and sequences venue-wide
//!   administrative operations ([`system`]).
//! - **Middleware channels**: process-wide typed channels decoupling the
//!   I/O frontends from the currently bound receiver ([`middleware`]).
//! - **Runtime loop**: a single-threaded cooperative scheduler that
//!   multiplexes inbound commands with a 1 Hz housekeeping tick
//!   ([`runtime`]).
//! - **Snapshot persistence**: one JSON document per venue with a sha-256
//!   sidecar digest ([`persistence`]).
//!
//! ## Concurrency Model
//!
//! All matching, book mutation, aggregation and snapshot work happens on a
//! single runtime thread. Frontend threads hand typed requests to the
//! middleware channels; the [`system::SystemHandle`] receiver marshals
//! them onto the runtime thread through a bounded queue, blocking the
//! caller only for synchronous operations. Within one instrument, arrival
//! order is processing order; a request is always processed to completion
//! (including every emitted report and market-data update) before the next
//! one starts.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use venue_sim::prelude::*;
//!
//! struct Sink;
//! impl TradingReplyReceiver for Sink {
//!     fn process(&self, reply: TradingReply) {
//!         println!("{reply:?}");
//!     }
//! }
//!
//! let mut config = VenueConfig::new("SIM");
//! config.timezone = "Europe/Warsaw".to_owned();
//! let listing = Instrument {
//!     symbol: Some(Symbol::new("AAPL")),
//!     price_tick: Some(PriceTick::new(0.01)),
//!     quantity_tick: Some(QuantityTick::new(1.0)),
//!     ..Instrument::default()
//! };
//!
//! let venue = launch_trading_system(&config, vec![listing], Arc::new(Sink))
//!     .expect("venue configuration is valid");
//! let handle = Arc::new(venue.handle());
//! venue_sim::middleware::bind_trading_request_channel(handle.clone());
//! venue_sim::middleware::bind_trading_admin_channel(handle);
//! ```

pub mod book;
pub mod config;
pub mod domain;
pub mod engine;
pub mod idgen;
pub mod middleware;
pub mod persistence;
pub mod prelude;
pub mod protocol;
pub mod registry;
pub mod runtime;
pub mod system;
pub mod utils;
pub mod validation;

pub use book::{BetterOrderComparator, OrderBook, OrderPage};
pub use config::{ConfigError, PhaseRecord, PhaseSchedule, VenueConfig};
pub use engine::{
    AggregationFlags, AggregatorConfig, MarketDataAggregator, MatchingEngine, RecoverError,
};
pub use idgen::{GenerationError, IdGenerator};
pub use middleware::ChannelError;
pub use persistence::{SnapshotStore, StoreError};
pub use registry::{InstrumentRegistry, LookupError};
pub use runtime::{Loop, LoopHandle};
pub use system::{SystemHandle, TradingSystem, VenueRuntime, launch_trading_system};
pub use utils::{TzClock, current_system_time};
pub use validation::{
    MarketStateValidationError, MarketStateValidator, OrderValidationError, OrderValidator,
};
