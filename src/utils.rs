//! Time tools: microsecond UTC clock, venue-timezone clock and the textual
//! timestamp/date formats used by the persisted market-state document.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Textual timestamp layout used across persisted state and logs:
/// `YYYY-MM-DD HH:MM:SS.ffffff`, microsecond resolution, UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Textual calendar date layout: `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the current system time truncated to microsecond resolution.
///
/// All timestamps originating inside the venue go through this function so
/// that in-memory values compare equal to their persisted form.
#[must_use]
pub fn current_system_time() -> DateTime<Utc> {
    truncate_to_micros(Utc::now())
}

/// Truncates a UTC timestamp to whole microseconds.
#[must_use]
pub fn truncate_to_micros(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(time.timestamp_micros()).unwrap_or(time)
}

/// A clock pinned to the venue's IANA timezone.
///
/// Venue-local calendar dates decide Day-order expiry and GoodTillDate
/// boundaries, so every date computation goes through this clock rather
/// than the host's local zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TzClock {
    zone: Tz,
}

impl TzClock {
    /// Creates a clock for the given zone.
    #[must_use]
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// The zone this clock reports time in.
    #[must_use]
    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Current calendar date in the venue timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.venue_date(current_system_time())
    }

    /// Converts a system timestamp into the venue-local calendar date.
    #[must_use]
    pub fn venue_date(&self, time: DateTime<Utc>) -> NaiveDate {
        time.with_timezone(&self.zone).date_naive()
    }
}

impl Default for TzClock {
    fn default() -> Self {
        Self { zone: Tz::UTC }
    }
}

/// Serde adapter for mandatory `DateTime<Utc>` fields in the
/// `YYYY-MM-DD HH:MM:SS.ffffff` layout.
pub mod serde_timestamp {
    use super::{TIMESTAMP_FORMAT, Utc};
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let naive = NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
            .map_err(|error| Error::custom(format!("invalid timestamp `{text}`: {error}")))?;
        Ok(naive.and_utc())
    }
}

/// Serde adapter for optional timestamps; absent values serialize as `null`.
pub mod serde_opt_timestamp {
    use super::Utc;
    use chrono::DateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Wrapper(#[serde(with = "super::serde_timestamp")] DateTime<Utc>);

    pub fn serialize<S>(time: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        time.map(Wrapper).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|wrapper| wrapper.0))
    }
}

/// Serde adapter for mandatory `NaiveDate` fields in the `YYYY-MM-DD` layout.
pub mod serde_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .map_err(|error| Error::custom(format!("invalid date `{text}`: {error}")))
    }
}

/// Serde adapter for optional dates; absent values serialize as `null`.
pub mod serde_opt_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Wrapper(#[serde(with = "super::serde_date")] NaiveDate);

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        date.map(Wrapper).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|wrapper| wrapper.0))
    }
}

/// Formats a timestamp with [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a timezone name into a venue clock.
///
/// Returns `None` when the zone is not a known IANA identifier.
#[must_use]
pub fn locate_zone(name: &str) -> Option<TzClock> {
    name.parse::<Tz>().ok().map(TzClock::new)
}

/// Converts a venue-local date/time into a system timestamp, resolving
/// daylight-saving ambiguity towards the earlier instant.
#[must_use]
pub fn venue_time_to_system(
    date: NaiveDate,
    time: chrono::NaiveTime,
    clock: &TzClock,
) -> Option<DateTime<Utc>> {
    clock
        .zone()
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|zoned| truncate_to_micros(zoned.with_timezone(&Utc)))
}
