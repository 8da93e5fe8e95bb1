/// Wall-clock time arithmetic.
///
/// Schedules carry times as zero-padded "HH:MM" strings. Every comparison,
/// width and step is done on minutes since midnight, so this module is the
/// only place that knows about the string form.

use crate::error::{Result, ScheduleError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse "HH:MM" into minutes since midnight. "24:00" is accepted as end of day.
pub fn time_to_minutes(value: &str) -> Result<u32> {
    let invalid = || ScheduleError::InvalidTime(value.to_string());

    let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    let total = hours * 60 + minutes;
    if total > MINUTES_PER_DAY {
        return Err(invalid());
    }
    Ok(total)
}

/// Format minutes since midnight as zero-padded "HH:MM".
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// A time of day with minute resolution, `00:00` through `24:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u32);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    pub const END_OF_DAY: ClockTime = ClockTime(MINUTES_PER_DAY);

    pub fn from_minutes(minutes: u32) -> Result<Self> {
        if minutes > MINUTES_PER_DAY {
            return Err(ScheduleError::InvalidTime(minutes_to_time(minutes)));
        }
        Ok(ClockTime(minutes))
    }

    /// Fixed times known to be in range.
    pub(crate) const fn at(hour: u32, minute: u32) -> Self {
        ClockTime(hour * 60 + minute)
    }

    pub fn hm(hour: u32, minute: u32) -> Result<Self> {
        if minute >= 60 || hour > 24 {
            return Err(ScheduleError::InvalidTime(format!("{}:{:02}", hour, minute)));
        }
        Self::from_minutes(hour * 60 + minute)
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// Shift forward, or `None` past the end of the day.
    pub fn add_minutes(&self, minutes: u32) -> Option<ClockTime> {
        let shifted = self.0.checked_add(minutes)?;
        (shifted <= MINUTES_PER_DAY).then_some(ClockTime(shifted))
    }

    pub fn minutes_until(&self, later: ClockTime) -> i64 {
        later.0 as i64 - self.0 as i64
    }
}

impl FromStr for ClockTime {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        time_to_minutes(s).map(ClockTime)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&minutes_to_time(self.0))
    }
}
