//! Blade freshness classification
//!
//! Maps a blade's last-sharpened timestamp to a freshness category:
//!
//! ```text
//! never sharpened   → NEVER_SHARPENED
//! days <= 30        → RECENT
//! 30 < days <= 60   → REGULAR
//! days > 60         → NEEDS_ATTENTION
//! ```
//!
//! `days` is the millisecond difference floor-divided by one day.

use crate::report::window::MILLIS_PER_DAY;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Upper bound (inclusive) of the RECENT band, in days
pub const RECENT_MAX_DAYS: i64 = 30;

/// Upper bound (inclusive) of the REGULAR band, in days
pub const REGULAR_MAX_DAYS: i64 = 60;

/// Derived sharpening-recency category of a blade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Freshness {
    NeverSharpened,
    Recent,
    Regular,
    NeedsAttention,
}

impl Freshness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Freshness::NeverSharpened => "NEVER_SHARPENED",
            Freshness::Recent => "RECENT",
            Freshness::Regular => "REGULAR",
            Freshness::NeedsAttention => "NEEDS_ATTENTION",
        }
    }
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole days elapsed from `earlier` to `now`, floored
pub fn days_between(earlier: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - earlier).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Classify a blade by its last sharpening date
pub fn classify(last_sharpened_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Freshness {
    let Some(last) = last_sharpened_at else {
        return Freshness::NeverSharpened;
    };

    let days = days_between(last, now);
    if days <= RECENT_MAX_DAYS {
        Freshness::Recent
    } else if days <= REGULAR_MAX_DAYS {
        Freshness::Regular
    } else {
        Freshness::NeedsAttention
    }
}

/// Days since a blade was last sharpened, or the never-sharpened marker
///
/// Serializes as a number, or as the string `"NEVER_SHARPENED"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinceLastSharpen {
    Days(i64),
    Never,
}

impl SinceLastSharpen {
    pub fn from_last(last_sharpened_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match last_sharpened_at {
            Some(last) => SinceLastSharpen::Days(days_between(last, now)),
            None => SinceLastSharpen::Never,
        }
    }
}

impl Serialize for SinceLastSharpen {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SinceLastSharpen::Days(days) => serializer.serialize_i64(*days),
            SinceLastSharpen::Never => Freshness::NeverSharpened.serialize(serializer),
        }
    }
}
