//! Listed instruments and the client-side descriptors that reference them.

use super::attributes::{
    BloombergId, Currency, CusipId, ExchangeId, IsinId, MaxQuantity, MinQuantity, PartyId,
    PriceTick, QuantityTick, RequesterInstrumentId, RicId, SecurityExchange, SecurityId, SedolId,
    Symbol,
};
use super::enums::{PartyRole, SecurityIdSource, SecurityType};
use super::party::Party;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense engine-assigned identifier of a listed instrument.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct InstrumentId(u32);

impl InstrumentId {
    /// Wraps a raw identifier value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the wrapped identifier value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A listed instrument as configured at startup.
///
/// The numeric constraints are each either absent or a positive finite
/// number; when present they bind every accepted order and published trade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: Option<Symbol>,
    pub price_currency: Option<Currency>,
    pub base_currency: Option<Currency>,
    pub security_exchange: Option<SecurityExchange>,
    pub party_id: Option<PartyId>,
    pub party_role: Option<PartyRole>,
    pub cusip: Option<CusipId>,
    pub sedol: Option<SedolId>,
    pub isin: Option<IsinId>,
    pub ric: Option<RicId>,
    pub exchange_id: Option<ExchangeId>,
    pub bloomberg_id: Option<BloombergId>,
    pub security_type: Option<SecurityType>,
    pub price_tick: Option<PriceTick>,
    pub quantity_tick: Option<QuantityTick>,
    pub min_quantity: Option<MinQuantity>,
    pub max_quantity: Option<MaxQuantity>,
    /// Engine-assigned dense identifier.
    pub identifier: InstrumentId,
}

impl Instrument {
    /// Checks that every present numeric constraint is a positive finite
    /// number. Violations make the whole listing unusable.
    #[must_use]
    pub fn constraints_well_formed(&self) -> bool {
        fn positive(value: Option<f64>) -> bool {
            value.is_none_or(|v| v.is_finite() && v > 0.0)
        }

        positive(self.price_tick.map(|t| t.value()))
            && positive(self.quantity_tick.map(|t| t.value()))
            && positive(self.min_quantity.map(|q| q.value()))
            && positive(self.max_quantity.map(|q| q.value()))
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{}#{}", symbol, self.identifier),
            None => write!(f, "instrument#{}", self.identifier),
        }
    }
}

/// An instrument reference built by a client, resolved against the registry
/// before a request reaches an engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentDescriptor {
    pub symbol: Option<Symbol>,
    pub security_id: Option<SecurityId>,
    pub security_id_source: Option<SecurityIdSource>,
    pub security_type: Option<SecurityType>,
    pub security_exchange: Option<SecurityExchange>,
    pub currency: Option<Currency>,
    #[serde(default)]
    pub parties: Vec<Party>,
    pub requester_instrument_id: Option<RequesterInstrumentId>,
}

impl InstrumentDescriptor {
    /// A descriptor referencing an instrument by its ticker symbol only.
    #[must_use]
    pub fn for_symbol(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }

    /// A descriptor referencing an instrument by security id and source.
    #[must_use]
    pub fn for_security_id(security_id: SecurityId, source: SecurityIdSource) -> Self {
        Self {
            security_id: Some(security_id),
            security_id_source: Some(source),
            ..Self::default()
        }
    }

    /// True when the descriptor carries nothing the registry can key on.
    #[must_use]
    pub fn is_empty_reference(&self) -> bool {
        self.symbol.is_none() && self.security_id.is_none()
    }
}

impl fmt::Display for InstrumentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = &self.symbol {
            return write!(f, "symbol={symbol}");
        }
        if let Some(security_id) = &self.security_id {
            return write!(f, "security_id={security_id}");
        }
        f.write_str("<empty descriptor>")
    }
}
