//! Venue configuration.
//!
//! Everything the trading core needs at startup that is not static
//! reference data: venue identity, the IANA timezone, the wall-clock phase
//! schedule, market-data aggregation defaults and channel sizing.

use crate::utils::{TzClock, locate_zone};
use crate::domain::TradingPhase;
use chrono::NaiveTime;
use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configured timezone is not a known IANA identifier.
    #[error("unknown venue timezone `{0}`")]
    UnknownTimezone(String),
    /// A phase schedule record is inconsistent.
    #[error("invalid phase schedule: {0}")]
    InvalidSchedule(String),
}

/// One wall-clock window of the venue phase schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseRecord {
    pub phase: TradingPhase,
    /// Window start, venue-local wall clock (inclusive).
    pub start_time: NaiveTime,
    /// Window end, venue-local wall clock (exclusive).
    pub end_time: NaiveTime,
    /// Whether cancellations stay allowed during this window; `None` keeps
    /// the default (allowed).
    pub allow_cancels: Option<bool>,
}

impl PhaseRecord {
    /// Creates a record with default cancellation policy.
    #[must_use]
    pub fn new(phase: TradingPhase, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            phase,
            start_time,
            end_time,
            allow_cancels: None,
        }
    }

    /// True when the given venue-local time falls inside this window.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start_time <= time && time < self.end_time
    }
}

/// The venue's wall-clock phase schedule. Outside every window the venue is
/// `Closed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseSchedule {
    records: Vec<PhaseRecord>,
}

impl PhaseSchedule {
    /// Builds a schedule, rejecting records with inverted windows.
    pub fn new(records: Vec<PhaseRecord>) -> Result<Self, ConfigError> {
        for record in &records {
            if record.start_time >= record.end_time {
                return Err(ConfigError::InvalidSchedule(format!(
                    "phase {} window {}..{} is empty",
                    record.phase, record.start_time, record.end_time
                )));
            }
        }
        Ok(Self { records })
    }

    /// The record active at the given venue-local time; the first matching
    /// window wins.
    #[must_use]
    pub fn record_at(&self, time: NaiveTime) -> Option<&PhaseRecord> {
        self.records.iter().find(|record| record.contains(time))
    }

    /// The phase active at the given venue-local time.
    #[must_use]
    pub fn phase_at(&self, time: NaiveTime) -> TradingPhase {
        self.record_at(time)
            .map(|record| record.phase)
            .unwrap_or(TradingPhase::Closed)
    }

    /// True when no window is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Complete venue configuration.
#[derive(Debug, Clone)]
pub struct VenueConfig {
    /// Venue identifier stamped into snapshots and logs.
    pub venue_id: String,
    /// IANA timezone the venue trades in, e.g. `Europe/Warsaw`.
    pub timezone: String,
    /// Path of the persisted market-state document.
    pub snapshot_path: PathBuf,
    /// Wall-clock phase schedule; empty disables scheduled transitions.
    pub phase_schedule: Vec<PhaseRecord>,
    /// Whether market-data snapshots include the last trade.
    pub publish_last_trade: bool,
    /// Whether price-level entries concatenate owning party identifiers.
    pub publish_party_ids: bool,
    /// Capacity of the bounded command queue between frontends and the
    /// runtime thread.
    pub command_queue_capacity: usize,
}

impl VenueConfig {
    /// A configuration with conventional defaults for the given venue id.
    #[must_use]
    pub fn new(venue_id: impl Into<String>) -> Self {
        Self {
            venue_id: venue_id.into(),
            timezone: "UTC".to_owned(),
            snapshot_path: PathBuf::from("market_state.json"),
            phase_schedule: Vec::new(),
            publish_last_trade: true,
            publish_party_ids: false,
            command_queue_capacity: 1_024,
        }
    }

    /// Resolves the configured timezone into a venue clock.
    pub fn clock(&self) -> Result<TzClock, ConfigError> {
        locate_zone(&self.timezone)
            .ok_or_else(|| ConfigError::UnknownTimezone(self.timezone.clone()))
    }

    /// Builds the validated phase schedule.
    pub fn schedule(&self) -> Result<PhaseSchedule, ConfigError> {
        PhaseSchedule::new(self.phase_schedule.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn resolves_known_timezone() {
        let mut config = VenueConfig::new("SIM");
        config.timezone = "Europe/Warsaw".to_owned();
        assert!(config.clock().is_ok());
    }

    #[test]
    fn unknown_timezone_is_a_config_error() {
        let mut config = VenueConfig::new("SIM");
        config.timezone = "Nowhere/Void".to_owned();
        assert_eq!(
            config.clock(),
            Err(ConfigError::UnknownTimezone("Nowhere/Void".to_owned()))
        );
    }

    #[test]
    fn schedule_selects_phase_by_wall_clock() {
        let schedule = PhaseSchedule::new(vec![
            PhaseRecord::new(TradingPhase::OpeningAuction, at(8, 30), at(9, 0)),
            PhaseRecord::new(TradingPhase::Open, at(9, 0), at(17, 30)),
        ])
        .unwrap();

        assert_eq!(schedule.phase_at(at(8, 45)), TradingPhase::OpeningAuction);
        assert_eq!(schedule.phase_at(at(12, 0)), TradingPhase::Open);
        assert_eq!(schedule.phase_at(at(18, 0)), TradingPhase::Closed);
        // Window end is exclusive, next window start inclusive.
        assert_eq!(schedule.phase_at(at(9, 0)), TradingPhase::Open);
    }

    #[test]
    fn empty_window_is_rejected() {
        let result = PhaseSchedule::new(vec![PhaseRecord::new(
            TradingPhase::Open,
            at(9, 0),
            at(9, 0),
        )]);
        assert!(matches!(result, Err(ConfigError::InvalidSchedule(_))));
    }
}
