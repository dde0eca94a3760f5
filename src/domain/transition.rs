//! Signal transition detection.
//!
//! Walks a normalized series pairwise and yields an event wherever the
//! position moves between flat and long, or flat and short. A direct
//! long <-> short flip is left unclassified and yields nothing.

use std::fmt;
use std::iter::FusedIterator;

use super::series::Series;
use super::time_point::{Position, TimePoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    EntryLong,
    EntryShort,
    ExitLong,
    ExitShort,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 4] = [
        TransitionKind::EntryLong,
        TransitionKind::EntryShort,
        TransitionKind::ExitLong,
        TransitionKind::ExitShort,
    ];

    pub fn classify(prev: Position, curr: Position) -> Option<Self> {
        match (prev, curr) {
            (Position::Flat, Position::Long) => Some(TransitionKind::EntryLong),
            (Position::Flat, Position::Short) => Some(TransitionKind::EntryShort),
            (Position::Long, Position::Flat) => Some(TransitionKind::ExitLong),
            (Position::Short, Position::Flat) => Some(TransitionKind::ExitShort),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransitionKind::EntryLong => "Entry (Long)",
            TransitionKind::EntryShort => "Entry (Short)",
            TransitionKind::ExitLong => "Exit (Long)",
            TransitionKind::ExitShort => "Exit (Short)",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            TransitionKind::EntryLong => "green",
            TransitionKind::EntryShort => "purple",
            TransitionKind::ExitLong => "orange",
            TransitionKind::ExitShort => "red",
        }
    }

    pub fn marker(self) -> MarkerShape {
        match self {
            TransitionKind::EntryLong => MarkerShape::TriangleUp,
            TransitionKind::EntryShort => MarkerShape::TriangleDown,
            TransitionKind::ExitLong | TransitionKind::ExitShort => MarkerShape::Cross,
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    TriangleUp,
    TriangleDown,
    Cross,
}

/// A point of the series tagged with the transition that happened at it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionEvent {
    pub index: usize,
    pub point: TimePoint,
    pub kind: TransitionKind,
}

/// Lazy iterator over the transitions of a series. Calling
/// [`detect_transitions`] again restarts from the beginning.
#[derive(Debug, Clone)]
pub struct Transitions<'a> {
    points: &'a [TimePoint],
    next: usize,
}

pub fn detect_transitions(series: &Series) -> Transitions<'_> {
    Transitions {
        points: series.points(),
        next: 1,
    }
}

impl Iterator for Transitions<'_> {
    type Item = TransitionEvent;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.points.len() {
            let i = self.next;
            self.next += 1;
            let prev = self.points[i - 1].position;
            let curr = self.points[i].position;
            if let Some(kind) = TransitionKind::classify(prev, curr) {
                return Some(TransitionEvent {
                    index: i,
                    point: self.points[i],
                    kind,
                });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.points.len().saturating_sub(self.next)))
    }
}

impl FusedIterator for Transitions<'_> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionCounts {
    pub entry_long: usize,
    pub entry_short: usize,
    pub exit_long: usize,
    pub exit_short: usize,
}

impl TransitionCounts {
    pub fn tally<I>(events: I) -> Self
    where
        I: IntoIterator<Item = TransitionEvent>,
    {
        let mut counts = Self::default();
        for event in events {
            match event.kind {
                TransitionKind::EntryLong => counts.entry_long += 1,
                TransitionKind::EntryShort => counts.entry_short += 1,
                TransitionKind::ExitLong => counts.exit_long += 1,
                TransitionKind::ExitShort => counts.exit_short += 1,
            }
        }
        counts
    }

    pub fn get(&self, kind: TransitionKind) -> usize {
        match kind {
            TransitionKind::EntryLong => self.entry_long,
            TransitionKind::EntryShort => self.entry_short,
            TransitionKind::ExitLong => self.exit_long,
            TransitionKind::ExitShort => self.exit_short,
        }
    }

    pub fn total(&self) -> usize {
        self.entry_long + self.entry_short + self.exit_long + self.exit_short
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::Asset;
    use crate::domain::series::{normalize, RawSeries};
    use crate::domain::time_point::RawRecord;
    use chrono::{Duration, NaiveDate};

    fn series_from_positions(positions: &[i8]) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| RawRecord {
                timestamp: start + Duration::hours(i as i64),
                price: Some(100.0 + i as f64),
                position: Position::from_value(p as f64),
                portfolio_value: Some(100_000.0),
                daily_return: Some(0.0),
            })
            .collect();
        normalize(RawSeries::new(Asset::Btc, records)).unwrap()
    }

    #[test]
    fn classifies_the_four_transitions() {
        let series = series_from_positions(&[0, 0, 1, 1, 0, -1, 0]);
        let events: Vec<_> = detect_transitions(&series)
            .map(|e| (e.index, e.kind))
            .collect();

        assert_eq!(
            events,
            vec![
                (2, TransitionKind::EntryLong),
                (4, TransitionKind::ExitLong),
                (5, TransitionKind::EntryShort),
                (6, TransitionKind::ExitShort),
            ]
        );
    }

    #[test]
    fn event_carries_the_point_it_fired_on() {
        let series = series_from_positions(&[0, 1]);
        let event = detect_transitions(&series).next().unwrap();
        assert_eq!(event.point, series.points()[1]);
        assert_eq!(event.point.price, 101.0);
    }

    #[test]
    fn direct_flip_yields_no_event() {
        let series = series_from_positions(&[1, -1, 1]);
        assert_eq!(detect_transitions(&series).count(), 0);
    }

    #[test]
    fn first_point_never_fires() {
        let series = series_from_positions(&[1, 1]);
        assert_eq!(detect_transitions(&series).count(), 0);
    }

    #[test]
    fn single_point_series_is_empty() {
        let series = series_from_positions(&[0]);
        let mut iter = detect_transitions(&series);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn detection_is_restartable() {
        let series = series_from_positions(&[0, 1, 0, -1]);
        let first: Vec<_> = detect_transitions(&series).collect();
        let second: Vec<_> = detect_transitions(&series).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn tally_counts_by_kind() {
        let series = series_from_positions(&[0, 1, 0, 1, 0, -1]);
        let counts = TransitionCounts::tally(detect_transitions(&series));
        assert_eq!(counts.entry_long, 2);
        assert_eq!(counts.exit_long, 2);
        assert_eq!(counts.entry_short, 1);
        assert_eq!(counts.exit_short, 0);
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.get(TransitionKind::EntryShort), 1);
    }

    #[test]
    fn markers_match_kinds() {
        assert_eq!(TransitionKind::EntryLong.marker(), MarkerShape::TriangleUp);
        assert_eq!(TransitionKind::EntryShort.marker(), MarkerShape::TriangleDown);
        assert_eq!(TransitionKind::ExitShort.marker(), MarkerShape::Cross);
        assert_eq!(TransitionKind::ExitLong.to_string(), "Exit (Long)");
    }
}
