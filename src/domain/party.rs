//! Trading parties attached to orders and instruments.

use super::attributes::PartyId;
use super::enums::{PartyIdSource, PartyRole};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A party identifier together with its source scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyIdentifier {
    party_id: PartyId,
    source: PartyIdSource,
}

impl PartyIdentifier {
    /// Creates an identifier from its components.
    #[must_use]
    pub fn new(party_id: PartyId, source: PartyIdSource) -> Self {
        Self { party_id, source }
    }

    /// The raw party identifier.
    #[must_use]
    pub fn party_id(&self) -> &PartyId {
        &self.party_id
    }

    /// The source scheme of the identifier.
    #[must_use]
    pub fn source(&self) -> PartyIdSource {
        self.source
    }
}

impl fmt::Display for PartyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.party_id, self.source)
    }
}

/// A party playing a role on an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Party {
    identifier: PartyIdentifier,
    role: PartyRole,
}

impl Party {
    /// Creates a party from its identifier and role.
    #[must_use]
    pub fn new(identifier: PartyIdentifier, role: PartyRole) -> Self {
        Self { identifier, role }
    }

    /// Convenience constructor from raw components.
    #[must_use]
    pub fn from_parts(party_id: PartyId, source: PartyIdSource, role: PartyRole) -> Self {
        Self::new(PartyIdentifier::new(party_id, source), role)
    }

    /// The party identifier.
    #[must_use]
    pub fn identifier(&self) -> &PartyIdentifier {
        &self.identifier
    }

    /// The role the party plays.
    #[must_use]
    pub fn role(&self) -> PartyRole {
        self.role
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.identifier, self.role)
    }
}
