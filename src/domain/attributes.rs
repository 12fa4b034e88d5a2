//! Attribute value types.
//!
//! Every domain scalar is a distinct named wrapper over a primitive so that
//! a price can never be passed where a quantity is expected. Wrappers share
//! the [`Value`] contract and derive comparison and formatting from the
//! wrapped primitive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Common contract of every attribute wrapper: access to the wrapped
/// primitive value.
pub trait Value {
    /// The wrapped primitive type.
    type Inner;

    /// Borrows the wrapped value.
    fn inner(&self) -> &Self::Inner;
}

macro_rules! arithmetic_attribute {
    ($(#[$meta:meta])* $name:ident, $repr:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            /// Wraps a raw value.
            #[must_use]
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            /// Returns the wrapped value.
            #[must_use]
            pub const fn value(&self) -> $repr {
                self.0
            }
        }

        impl Value for $name {
            type Inner = $repr;

            fn inner(&self) -> &$repr {
                &self.0
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! identifier_attribute {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier value.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the wrapped identifier value.
            #[must_use]
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl Value for $name {
            type Inner = u64;

            fn inner(&self) -> &u64 {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! literal_attribute {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw textual value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrows the wrapped text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Value for $name {
            type Inner = String;

            fn inner(&self) -> &String {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

// Arithmetic attributes (fixed-precision doubles and small integers).

arithmetic_attribute!(
    /// A traded or quoted price.
    Price, f64
);
arithmetic_attribute!(
    /// A traded or resting quantity.
    Quantity, f64
);
arithmetic_attribute!(
    /// Limit price of an order; absent on market orders.
    OrderPrice, f64
);
arithmetic_attribute!(
    /// Total quantity of an order.
    OrderQuantity, f64
);
arithmetic_attribute!(
    /// Quantity of an order executed so far.
    CumExecutedQuantity, f64
);
arithmetic_attribute!(
    /// Quantity executed by a single fill.
    ExecutedQuantity, f64
);
arithmetic_attribute!(
    /// Quantity of an order still open (`total - cum_executed`).
    LeavesQuantity, f64
);
arithmetic_attribute!(
    /// Price of a single execution.
    ExecutionPrice, f64
);
arithmetic_attribute!(
    /// Best price on the buy page.
    BestBidPrice, f64
);
arithmetic_attribute!(
    /// Best price on the sell page.
    BestOfferPrice, f64
);
arithmetic_attribute!(
    /// Aggregate quantity resting on the buy page.
    CurrentBidDepth, f64
);
arithmetic_attribute!(
    /// Aggregate quantity resting on the sell page.
    CurrentOfferDepth, f64
);
arithmetic_attribute!(
    /// Minimum permissible price increment of an instrument.
    PriceTick, f64
);
arithmetic_attribute!(
    /// Minimum permissible quantity increment of an instrument.
    QuantityTick, f64
);
arithmetic_attribute!(
    /// Minimum order/trade quantity of an instrument.
    MinQuantity, f64
);
arithmetic_attribute!(
    /// Maximum order/trade quantity of an instrument.
    MaxQuantity, f64
);
arithmetic_attribute!(
    /// Number of price levels requested in a market-data request;
    /// zero means full depth.
    MarketDepth, u64
);
arithmetic_attribute!(
    /// Instrument identifier assigned by the requesting client.
    RequesterInstrumentId, u64
);
arithmetic_attribute!(
    /// FIX short-sale exemption reason code.
    ShortSaleExemptionReason, i32
);

// Identifier attributes (engine-assigned, 64-bit).

identifier_attribute!(
    /// Engine-unique resting order identifier.
    OrderId
);
identifier_attribute!(
    /// Engine-unique execution report identifier.
    ExecutionId
);
identifier_attribute!(
    /// Engine-unique trade identifier.
    TradeId
);
identifier_attribute!(
    /// Identifier of a market-data request/subscription.
    MdRequestId
);

// Literal attributes (free-form bounded strings).

literal_attribute!(
    /// Order identifier assigned by the client.
    ClientOrderId
);
literal_attribute!(
    /// Client order identifier referenced by a modify/cancel request.
    OrigClientOrderId
);
literal_attribute!(
    /// Identifier of a trading party.
    PartyId
);
literal_attribute!(
    /// Instrument ticker symbol.
    Symbol
);
literal_attribute!(
    /// Security identifier (meaning given by its source).
    SecurityId
);
literal_attribute!(
    /// ISO currency code.
    Currency
);
literal_attribute!(
    /// Exchange/market identifier code.
    SecurityExchange
);
literal_attribute!(
    /// CUSIP security identifier.
    CusipId
);
literal_attribute!(
    /// SEDOL security identifier.
    SedolId
);
literal_attribute!(
    /// ISIN security identifier.
    IsinId
);
literal_attribute!(
    /// Reuters instrument code.
    RicId
);
literal_attribute!(
    /// Exchange-specific listing identifier.
    ExchangeId
);
literal_attribute!(
    /// Bloomberg security identifier.
    BloombergId
);
literal_attribute!(
    /// Identifier of the simulated venue.
    VenueId
);
literal_attribute!(
    /// Buying counterparty of a trade.
    BuyerId
);
literal_attribute!(
    /// Selling counterparty of a trade.
    SellerId
);
literal_attribute!(
    /// Identifier of a security-status request.
    SecurityStatusReqId
);

/// Free-form rejection text, bounded to 256 bytes on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RejectText(String);

impl RejectText {
    /// Maximum byte length of a reject text.
    pub const MAX_LENGTH: usize = 256;

    /// Wraps a raw reason, truncating to [`Self::MAX_LENGTH`] bytes on a
    /// character boundary.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let mut text: String = value.into();
        if text.len() > Self::MAX_LENGTH {
            let mut cut = Self::MAX_LENGTH;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        Self(text)
    }

    /// Borrows the wrapped text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Value for RejectText {
    type Inner = String;

    fn inner(&self) -> &String {
        &self.0
    }
}

impl fmt::Display for RejectText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
