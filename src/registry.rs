//! Instrument registry.
//!
//! Holds the set of configured instruments keyed by [`InstrumentId`] and
//! indexed by every externally meaningful identifier. Populated once at
//! startup and immutable for the rest of the session.

use crate::domain::{
    Instrument, InstrumentDescriptor, InstrumentId, SecurityIdSource, Value,
};
use std::collections::HashMap;
use thiserror::Error;

/// Failure to resolve a client descriptor into a listed instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No listing matches the referenced identifier.
    #[error("unknown instrument symbol or identifier")]
    UnknownSymbol,
    /// More than one listing matches the reference.
    #[error("ambiguous instrument reference")]
    AmbiguousInstrument,
    /// The descriptor carries nothing the registry can key on.
    #[error("insufficient instrument information")]
    InsufficientInstrumentInfo,
}

/// Immutable set of listed instruments with identifier indexes.
#[derive(Debug, Default)]
pub struct InstrumentRegistry {
    instruments: Vec<Instrument>,
    by_symbol: HashMap<String, Vec<InstrumentId>>,
    by_security_id: HashMap<(SecurityIdSource, String), Vec<InstrumentId>>,
}

impl InstrumentRegistry {
    /// Builds a registry from configured listings, assigning dense
    /// identifiers in input order.
    ///
    /// Listings with malformed numeric constraints are skipped with a
    /// warning rather than poisoning the venue.
    #[must_use]
    pub fn from_listings(listings: Vec<Instrument>) -> Self {
        let mut registry = Self::default();
        for mut instrument in listings {
            if !instrument.constraints_well_formed() {
                tracing::warn!("skipping listing with malformed constraints: {instrument}");
                continue;
            }
            let identifier = InstrumentId::new(registry.instruments.len() as u32);
            instrument.identifier = identifier;
            registry.index(&instrument);
            registry.instruments.push(instrument);
        }
        registry
    }

    fn index(&mut self, instrument: &Instrument) {
        let id = instrument.identifier;
        if let Some(symbol) = &instrument.symbol {
            self.by_symbol
                .entry(symbol.as_str().to_owned())
                .or_default()
                .push(id);
        }

        let mut add = |source: SecurityIdSource, value: Option<String>| {
            if let Some(value) = value {
                self.by_security_id.entry((source, value)).or_default().push(id);
            }
        };
        add(
            SecurityIdSource::Cusip,
            instrument.cusip.as_ref().map(|v| v.inner().clone()),
        );
        add(
            SecurityIdSource::Sedol,
            instrument.sedol.as_ref().map(|v| v.inner().clone()),
        );
        add(
            SecurityIdSource::Isin,
            instrument.isin.as_ref().map(|v| v.inner().clone()),
        );
        add(
            SecurityIdSource::Ric,
            instrument.ric.as_ref().map(|v| v.inner().clone()),
        );
        add(
            SecurityIdSource::ExchangeSymbol,
            instrument.exchange_id.as_ref().map(|v| v.inner().clone()),
        );
        add(
            SecurityIdSource::BloombergSymbol,
            instrument.bloomberg_id.as_ref().map(|v| v.inner().clone()),
        );
    }

    /// Number of listed instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// True when no instrument is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// All listings in identifier order.
    #[must_use]
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Looks up a listing by its dense identifier.
    #[must_use]
    pub fn find(&self, id: InstrumentId) -> Option<&Instrument> {
        self.instruments.get(id.value() as usize)
    }

    /// Resolves a client descriptor into an instrument identifier.
    ///
    /// A security identifier takes precedence over the symbol; when several
    /// listings share the referenced key, the descriptor's exchange and
    /// currency narrow the candidates before the reference is declared
    /// ambiguous.
    pub fn resolve(&self, descriptor: &InstrumentDescriptor) -> Result<InstrumentId, LookupError> {
        let candidates: &[InstrumentId] = if let Some(security_id) = &descriptor.security_id {
            let Some(source) = descriptor.security_id_source else {
                return Err(LookupError::InsufficientInstrumentInfo);
            };
            self.by_security_id
                .get(&(source, security_id.inner().clone()))
                .map(Vec::as_slice)
                .unwrap_or_default()
        } else if let Some(symbol) = &descriptor.symbol {
            self.by_symbol
                .get(symbol.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default()
        } else {
            return Err(LookupError::InsufficientInstrumentInfo);
        };

        let narrowed: Vec<InstrumentId> = candidates
            .iter()
            .copied()
            .filter(|id| self.matches_narrowing(*id, descriptor))
            .collect();

        match narrowed.as_slice() {
            [] => Err(LookupError::UnknownSymbol),
            [single] => Ok(*single),
            _ => Err(LookupError::AmbiguousInstrument),
        }
    }

    fn matches_narrowing(&self, id: InstrumentId, descriptor: &InstrumentDescriptor) -> bool {
        let Some(instrument) = self.find(id) else {
            return false;
        };
        if let Some(exchange) = &descriptor.security_exchange
            && instrument.security_exchange.as_ref() != Some(exchange)
        {
            return false;
        }
        if let Some(currency) = &descriptor.currency
            && instrument.price_currency.as_ref() != Some(currency)
        {
            return false;
        }
        true
    }
}
