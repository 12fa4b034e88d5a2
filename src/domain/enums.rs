//! Enumerated attribute values.
//!
//! Every enumeration carries its closed variant set plus, where an inbound
//! value can arrive unrecognised from a frontend, a reserved `Unknown`
//! variant that validators reject. Serialization uses the textual labels of
//! the persisted market-state document.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! venue_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize,
        )]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let label = match self {
                    $(Self::$variant => stringify!($variant)),+
                };
                f.write_str(label)
            }
        }
    };
}

venue_enum!(
    /// Side of an order. Sell-side variants distinguish regular sales from
    /// short sales; all of them rest on the sell page.
    Side {
        Buy,
        Sell,
        SellShort,
        SellShortExempt,
        /// Unrecognised inbound value; rejected by validation.
        Unknown,
    }
);

impl Side {
    /// True for `Sell`, `SellShort` and `SellShortExempt`.
    #[must_use]
    pub fn is_selling(&self) -> bool {
        matches!(self, Self::Sell | Self::SellShort | Self::SellShortExempt)
    }

    /// The opposing book side used for matching.
    #[must_use]
    pub fn opposite(&self) -> Side {
        if self.is_selling() { Side::Buy } else { Side::Sell }
    }

    /// Collapses the sell family into the canonical page side.
    #[must_use]
    pub fn page(&self) -> Side {
        if self.is_selling() { Side::Sell } else { Side::Buy }
    }
}

venue_enum!(
    /// Kind of an inbound order.
    OrderType {
        Limit,
        Market,
        /// Unrecognised inbound value; rejected by validation.
        Unknown,
    }
);

venue_enum!(
    /// Lifecycle state of an order. Only `New`, `PartiallyFilled` and
    /// `Modified` may rest on the book; the remaining states are terminal
    /// and appear on execution reports only.
    OrderStatus {
        New,
        PartiallyFilled,
        Filled,
        Modified,
        Cancelled,
        Expired,
        Rejected,
        /// Unrecognised inbound value; rejected by validation.
        Unknown,
    }
);

venue_enum!(
    /// Time-in-force policy of an order.
    TimeInForce {
        Day,
        ImmediateOrCancel,
        FillOrKill,
        GoodTillDate,
        GoodTillCancel,
        /// Unrecognised inbound value; rejected by validation.
        Unknown,
    }
);

venue_enum!(
    /// Source scheme of a party identifier.
    PartyIdSource {
        Bic,
        Mic,
        Proprietary,
        /// Unrecognised inbound value; rejected by validation.
        Unknown,
    }
);

venue_enum!(
    /// Role a party plays on an order.
    PartyRole {
        ExecutingFirm,
        EnteringFirm,
        ContraFirm,
        ClientId,
        Exchange,
        /// Unrecognised inbound value; rejected by validation.
        Unknown,
    }
);

venue_enum!(
    /// Asset class of a listed instrument.
    SecurityType {
        CommonStock,
        Future,
        Option,
        Bond,
        Index,
        FxSpot,
        /// Unrecognised inbound value; rejected by validation.
        Unknown,
    }
);

venue_enum!(
    /// Scheme of a security identifier carried in an instrument descriptor.
    SecurityIdSource {
        Cusip,
        Sedol,
        Isin,
        Ric,
        ExchangeSymbol,
        BloombergSymbol,
        /// Unrecognised inbound value; rejected by validation.
        Unknown,
    }
);

venue_enum!(
    /// Coarse session state of an instrument.
    TradingPhase {
        Open,
        Closed,
        OpeningAuction,
        ClosingAuction,
        IntradayAuction,
        Halted,
    }
);

impl TradingPhase {
    /// True for the three auction phases.
    #[must_use]
    pub fn is_auction(&self) -> bool {
        matches!(
            self,
            Self::OpeningAuction | Self::ClosingAuction | Self::IntradayAuction
        )
    }
}

venue_enum!(
    /// Fine halt/resume switch that can override the trading phase.
    TradingStatus {
        Resume,
        Halt,
    }
);

venue_enum!(
    /// Kind of a market-data entry.
    MdEntryType {
        Bid,
        Offer,
        Trade,
        /// Unrecognised inbound value; rejected by validation.
        Unknown,
    }
);

venue_enum!(
    /// Kind of a market-data request.
    MdSubscriptionRequestType {
        Snapshot,
        Subscribe,
        Unsubscribe,
        /// Unrecognised inbound value; rejected by validation.
        Unknown,
    }
);

venue_enum!(
    /// Incremental action applied to a published market-data entry.
    MarketEntryAction {
        New,
        Change,
        Delete,
    }
);

venue_enum!(
    /// Kind of a market-data reply document.
    MarketDataUpdateType {
        Snapshot,
        Incremental,
    }
);

venue_enum!(
    /// Event reported by an execution report.
    ExecutionType {
        New,
        Trade,
        Modified,
        Cancelled,
        Expired,
        Rejected,
    }
);

venue_enum!(
    /// Message kind referenced by a business-level reject.
    RejectedMessageType {
        OrderPlacement,
        OrderModification,
        OrderCancellation,
        MarketDataRequest,
        SecurityStatusRequest,
    }
);

venue_enum!(
    /// Business-level rejection reason.
    BusinessRejectReason {
        Other,
        UnknownId,
        UnknownSecurity,
        ApplicationNotAvailable,
    }
);

venue_enum!(
    /// Rejection reason of a market-data request.
    MdRejectReason {
        UnknownSymbol,
        DuplicateMdReqId,
        UnknownMdRequestId,
        UnsupportedSubscriptionRequestType,
        UnsupportedMarketDepth,
        UnsupportedMdEntryType,
    }
);

venue_enum!(
    /// Side of the order that initiated a trade.
    AggressorSide {
        Buy,
        Sell,
    }
);

impl From<Side> for AggressorSide {
    fn from(side: Side) -> Self {
        if side.is_selling() {
            AggressorSide::Sell
        } else {
            AggressorSide::Buy
        }
    }
}
