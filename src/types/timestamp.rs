use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// UTC instant with microsecond resolution.
///
/// Values handed out by [`Timestamp::now`] are strictly increasing within a
/// process, so two trades recorded back to back never share a timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        CLOCK.now()
    }

    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        Timestamp(value)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Fixed-width RFC 3339 text; lexical order equals time order.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn parse_rfc3339(raw: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|value| Timestamp(value.with_timezone(&Utc)))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

pub struct MonotonicClock {
    last_micros: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            last_micros: AtomicI64::new(0),
        }
    }

    pub fn now(&self) -> Timestamp {
        let wall_clock = Utc::now().timestamp_micros();

        loop {
            let last = self.last_micros.load(Ordering::SeqCst);
            // Wall clock same or went backward: step one microsecond past the last value
            let next = wall_clock.max(last + 1);

            if self
                .last_micros
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                let instant = DateTime::<Utc>::from_timestamp_micros(next).unwrap_or_else(Utc::now);
                return Timestamp(instant);
            }
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    static ref CLOCK: MonotonicClock = MonotonicClock::new();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_timestamps_strictly_increase() {
        let clock = MonotonicClock::new();
        let mut previous = clock.now();
        for _ in 0..1_000 {
            let next = clock.now();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn rfc3339_text_round_trips_and_sorts() {
        let earlier = Timestamp::now();
        let later = Timestamp::now();
        assert!(earlier.to_rfc3339() < later.to_rfc3339());
        assert_eq!(Timestamp::parse_rfc3339(&earlier.to_rfc3339()), Some(earlier));
    }
}
