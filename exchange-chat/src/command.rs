//! Classification of inbound chat lines and day-count handling.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Substring that turns a chat line into an exchange command.
pub const EXCHANGE_KEYWORD: &str = "exchange";

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("static pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// Plain text to relay under the sender's name.
    Chat,
    /// Fetch rates for `requested_days`, before any cap is applied.
    Exchange { requested_days: u32 },
}

pub fn classify(line: &str) -> Inbound {
    if line.contains(EXCHANGE_KEYWORD) {
        Inbound::Exchange {
            requested_days: requested_days(line),
        }
    } else {
        Inbound::Chat
    }
}

/// First run of ASCII digits anywhere in `line`, or 1 when there is none or it
/// does not fit in a `u32`.
pub fn requested_days(line: &str) -> u32 {
    FIRST_NUMBER
        .find(line)
        .and_then(|digits| digits.as_str().parse().ok())
        .unwrap_or(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DayCount(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DayCountError {
    #[error("day count must be between 1 and {max}, got {value}")]
    OutOfRange { value: i64, max: u32 },
}

impl DayCount {
    /// Strict check used by the standalone tool.
    pub fn bounded(value: i64, max: u32) -> Result<Self, DayCountError> {
        match u32::try_from(value) {
            Ok(days) if (1..=max).contains(&days) => Ok(Self(days)),
            _ => Err(DayCountError::OutOfRange { value, max }),
        }
    }

    /// Lenient variant for chat: anything outside `1..=max` is pulled to the
    /// nearest bound.
    pub fn clamped(value: u32, max: u32) -> Self {
        Self(value.clamp(1, max.max(1)))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}
