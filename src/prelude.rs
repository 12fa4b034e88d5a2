//! Prelude module that re-exports commonly used types and traits.
//!
//! Instead of importing each type individually, frontends and tests can
//! use:
//!
//! ```rust
//! use venue_sim::prelude::*;
//! ```

// Domain values.
pub use crate::domain::{
    AggressorSide, ClientOrderId, CumExecutedQuantity, Currency, ExecutionId, ExecutionType,
    FixSession, Instrument, InstrumentDescriptor, InstrumentId, InstrumentInfo, InstrumentState,
    LimitOrder, MarketDepth, MarketEntryAction, MarketPhase, MaxQuantity, MdEntryType,
    MdRejectReason, MdRequestId, MdSubscriptionRequestType, MinQuantity, OrderBookState, OrderId,
    OrderPrice, OrderQuantity, OrderStatus, OrderType, OrigClientOrderId, Party, PartyId,
    PartyIdSource, PartyIdentifier, PartyRole, Price, PriceTick, Quantity, QuantityTick,
    SecurityId, SecurityIdSource, SecurityType, Session, Side, Snapshot, Symbol, TimeInForce,
    Trade, TradingPhase, TradingStatus, Value,
};

// Core components.
pub use crate::book::{OrderBook, OrderPage};
pub use crate::config::{ConfigError, PhaseRecord, PhaseSchedule, VenueConfig};
pub use crate::engine::{
    AggregationFlags, AggregatorConfig, MarketDataAggregator, MatchingEngine, RecoverError,
};
pub use crate::idgen::{GenerationError, IdGenerator};
pub use crate::persistence::{SnapshotStore, StoreError};
pub use crate::registry::{InstrumentRegistry, LookupError};
pub use crate::runtime::{Loop, LoopHandle};
pub use crate::system::{SystemHandle, TradingSystem, VenueRuntime, launch_trading_system};
pub use crate::utils::{TzClock, current_system_time};
pub use crate::validation::{
    MarketStateValidationError, MarketStateValidator, OrderValidationError, OrderValidator,
    PlacementCandidate,
};

// Protocol values.
pub use crate::protocol::{
    AdminResult, BusinessMessageReject, ExecutionReport, HaltPhaseReply, HaltPhaseRequest,
    InstrumentStateReply, InstrumentStateRequest, MarketDataEntry, MarketDataReject,
    MarketDataRequest, MarketDataSnapshot, MarketDataUpdate, OrderCancellationConfirmation,
    OrderCancellationReject, OrderCancellationRequest, OrderModificationConfirmation,
    OrderModificationReject, OrderModificationRequest, OrderPlacementConfirmation,
    OrderPlacementReject, OrderPlacementRequest, RecoverMarketStateReply,
    RecoverMarketStateRequest, ResumePhaseReply, ResumePhaseRequest, SecurityStatus,
    SecurityStatusRequest, SessionTerminatedEvent, StoreMarketStateReply,
    StoreMarketStateRequest, TradingReply, TradingRequest,
};

// Middleware contracts.
pub use crate::middleware::{
    ChannelError, GeneratorAdminReceiver, TradingAdminRequestReceiver, TradingReplyReceiver,
    TradingRequestReceiver, TradingSessionEventListener,
};
