//! Weekly availability intervals in `HH:MM-HH:MM` form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A half-open daily interval `[start, end)` in minutes after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: u16,
    pub end: u16,
}

const MINUTES_PER_DAY: u16 = 24 * 60;

fn parse_clock(s: &str) -> Result<u16, String> {
    let (h, m) = s
        .trim()
        .split_once(':')
        .ok_or_else(|| format!("'{s}' is not HH:MM"))?;
    let hours: u16 = h.parse().map_err(|_| format!("bad hour in '{s}'"))?;
    let minutes: u16 = m.parse().map_err(|_| format!("bad minute in '{s}'"))?;
    if hours > 24 {
        return Err(format!("'{s}' is past 24:00"));
    }
    if m.len() != 2 || minutes >= 60 {
        return Err(format!("bad minute in '{s}'"));
    }
    let total = hours * 60 + minutes;
    if total > MINUTES_PER_DAY {
        return Err(format!("'{s}' is past 24:00"));
    }
    Ok(total)
}

impl FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| "expected HH:MM-HH:MM".to_string())?;
        let start = parse_clock(start)?;
        let end = parse_clock(end)?;
        if start >= end {
            return Err("start must be before end".into());
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start / 60,
            self.start % 60,
            self.end / 60,
            self.end % 60
        )
    }
}
