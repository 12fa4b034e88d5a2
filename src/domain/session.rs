//! Client sessions: the routing handle an engine uses to address replies
//! back to the frontend that originated a request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a FIX session as seen by the acceptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixSession {
    /// FIX protocol begin string, e.g. `FIX.4.4`.
    pub begin_string: String,
    /// Counterparty component identifier.
    pub sender_comp_id: String,
    /// Venue component identifier.
    pub target_comp_id: String,
    /// Optional sub-identifier of the counterparty.
    #[serde(default)]
    pub client_sub_id: Option<String>,
}

impl FixSession {
    /// Creates a session identity without a client sub-id.
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            client_sub_id: None,
        }
    }
}

impl fmt::Display for FixSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}->{}",
            self.begin_string, self.sender_comp_id, self.target_comp_id
        )
    }
}

/// The client session a request originated from.
///
/// Serialized as a tagged record (`{"type": ..., "fix_session": ...}`) so a
/// persisted resting order keeps enough information to route replies after
/// recovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "fix_session")]
pub enum Session {
    /// A connected FIX counterparty.
    Fix(FixSession),
    /// The internal order-flow generator.
    Generator,
}

impl Session {
    /// The FIX identity, when this is a FIX session.
    #[must_use]
    pub fn fix(&self) -> Option<&FixSession> {
        match self {
            Session::Fix(session) => Some(session),
            Session::Generator => None,
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Fix(session) => write!(f, "Fix({session})"),
            Session::Generator => f.write_str("Generator"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_session_serializes_all_identifiers() {
        let mut session = FixSession::new("FIX.4.2", "sender", "target");
        session.client_sub_id = Some("client".to_owned());
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["begin_string"], "FIX.4.2");
        assert_eq!(json["sender_comp_id"], "sender");
        assert_eq!(json["target_comp_id"], "target");
        assert_eq!(json["client_sub_id"], "client");
    }

    #[test]
    fn session_round_trips_as_tagged_record() {
        let session = Session::Fix(FixSession::new("FIX.4.4", "CLIENT", "VENUE"));
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["type"], "Fix");
        assert_eq!(json["fix_session"]["sender_comp_id"], "CLIENT");
        let decoded: Session = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, session);
    }

    #[test]
    fn generator_session_has_no_fix_identity() {
        let session = Session::Generator;
        assert!(session.fix().is_none());
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["type"], "Generator");
    }
}
