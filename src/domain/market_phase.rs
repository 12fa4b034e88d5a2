//! Market phase: the pair of trading phase and trading status that governs
//! which operations an engine accepts.

use super::enums::{TradingPhase, TradingStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current session state of an instrument.
///
/// `trading_status` is a finer halt/resume switch layered over the coarse
/// `trading_phase`; a `Halt` status rejects order flow regardless of phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPhase {
    trading_phase: TradingPhase,
    trading_status: TradingStatus,
}

impl MarketPhase {
    /// Creates a phase from its two components.
    #[must_use]
    pub const fn new(trading_phase: TradingPhase, trading_status: TradingStatus) -> Self {
        Self {
            trading_phase,
            trading_status,
        }
    }

    /// Continuous open trading.
    #[must_use]
    pub const fn open() -> Self {
        Self::new(TradingPhase::Open, TradingStatus::Resume)
    }

    /// Closed session.
    #[must_use]
    pub const fn closed() -> Self {
        Self::new(TradingPhase::Closed, TradingStatus::Resume)
    }

    /// Halted session.
    #[must_use]
    pub const fn halted() -> Self {
        Self::new(TradingPhase::Halted, TradingStatus::Halt)
    }

    /// The coarse trading phase.
    #[must_use]
    pub const fn trading_phase(&self) -> TradingPhase {
        self.trading_phase
    }

    /// The fine halt/resume status.
    #[must_use]
    pub const fn trading_status(&self) -> TradingStatus {
        self.trading_status
    }

    /// Whether new orders and modifications are accepted.
    #[must_use]
    pub fn allows_new_orders(&self) -> bool {
        if self.trading_status == TradingStatus::Halt {
            return false;
        }
        matches!(
            self.trading_phase,
            TradingPhase::Open
                | TradingPhase::OpeningAuction
                | TradingPhase::ClosingAuction
                | TradingPhase::IntradayAuction
        )
    }

    /// Whether an arriving order matches immediately. Auction phases accept
    /// orders but defer matching to the uncrossing on phase exit.
    #[must_use]
    pub fn allows_matching(&self) -> bool {
        self.trading_status == TradingStatus::Resume && self.trading_phase == TradingPhase::Open
    }

    /// Whether cancellations are accepted. Cancels stay available in every
    /// phase, including `Closed` and `Halted`.
    #[must_use]
    pub fn allows_cancellation(&self) -> bool {
        true
    }

    /// Whether market-data requests are served.
    #[must_use]
    pub fn accepts_market_data(&self) -> bool {
        self.trading_phase != TradingPhase::Halted
    }
}

impl Default for MarketPhase {
    fn default() -> Self {
        Self::open()
    }
}

impl fmt::Display for MarketPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.trading_phase, self.trading_status)
    }
}
