//! Per-timestamp observations, before and after cleaning.

use chrono::NaiveDateTime;
use std::fmt;

/// Discrete trading stance at a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Position {
    Short,
    #[default]
    Flat,
    Long,
}

impl Position {
    /// Map a numeric cell (`-1`, `0`, `1`, or their float spellings) to a position.
    pub fn from_value(value: f64) -> Option<Self> {
        if value == -1.0 {
            Some(Position::Short)
        } else if value == 0.0 {
            Some(Position::Flat)
        } else if value == 1.0 {
            Some(Position::Long)
        } else {
            None
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Position::Short => -1,
            Position::Flat => 0,
            Position::Long => 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

/// One row as read from the source, any value column possibly missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRecord {
    pub timestamp: NaiveDateTime,
    pub price: Option<f64>,
    pub position: Option<Position>,
    pub portfolio_value: Option<f64>,
    pub daily_return: Option<f64>,
}

/// One cleaned observation of a normalized series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePoint {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub position: Position,
    pub portfolio_value: f64,
    pub daily_return: Option<f64>,
}

impl From<&TimePoint> for RawRecord {
    fn from(point: &TimePoint) -> Self {
        RawRecord {
            timestamp: point.timestamp,
            price: Some(point.price),
            position: Some(point.position),
            portfolio_value: Some(point.portfolio_value),
            daily_return: point.daily_return,
        }
    }
}
