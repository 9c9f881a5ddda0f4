//! Warehouse dock scheduling.
//!
//! A [`Slot`] books a loading dock for a time window on one day. Two slots
//! conflict when they share a day and a dock and their windows overlap;
//! back-to-back slots (one ends when the next starts) do not conflict.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::same_name;

/// Errors from slot validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The slot ends at or before it starts.
    #[error("slot must end after it starts ({start} - {end})")]
    EmptyWindow {
        /// Start time.
        start: NaiveTime,
        /// End time.
        end: NaiveTime,
    },
    /// No dock named.
    #[error("slot has no dock")]
    MissingDock,
}

/// What the dock is booked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Outgoing goods.
    Loading,
    /// Incoming goods.
    Unloading,
    /// Anything else (maintenance, stock count).
    #[default]
    Other,
}

impl FromStr for SlotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "loading" | "load" | "dispatch" => Ok(Self::Loading),
            "unloading" | "unload" | "receiving" => Ok(Self::Unloading),
            "" | "other" => Ok(Self::Other),
            _ => Err(format!("unknown slot kind: {s}")),
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading"),
            Self::Unloading => write!(f, "Unloading"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A dock booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Row identifier.
    pub id: String,
    /// Day of the booking.
    pub date: NaiveDate,
    /// Dock name or number.
    pub dock: String,
    /// Window start.
    pub start: NaiveTime,
    /// Window end.
    pub end: NaiveTime,
    /// Booking purpose.
    pub kind: SlotKind,
    /// Vehicle plate or carrier.
    pub vehicle: Option<String>,
    /// LPO, invoice or other reference.
    pub reference: Option<String>,
}

impl Slot {
    /// Check the slot is well formed.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.dock.trim().is_empty() {
            return Err(ScheduleError::MissingDock);
        }
        if self.end <= self.start {
            return Err(ScheduleError::EmptyWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Check if two slots book the same dock at overlapping times.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.date == other.date
            && same_name(&self.dock, &other.dock)
            && self.start < other.end
            && other.start < self.end
    }
}

/// Two overlapping bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Id of the earlier slot.
    pub first: String,
    /// Id of the later slot.
    pub second: String,
    /// Shared dock.
    pub dock: String,
    /// Shared day.
    pub date: NaiveDate,
}

fn chronological(slots: &[Slot]) -> Vec<&Slot> {
    let mut ordered: Vec<&Slot> = slots.iter().collect();
    ordered.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.start.cmp(&b.start))
            .then_with(|| a.dock.cmp(&b.dock))
    });
    ordered
}

/// All pairs of overlapping slots, earliest first.
#[must_use]
pub fn conflicts(slots: &[Slot]) -> Vec<Conflict> {
    let ordered = chronological(slots);
    let mut found = Vec::new();
    for (i, a) in ordered.iter().enumerate() {
        for b in &ordered[i + 1..] {
            if b.date != a.date {
                break;
            }
            if a.overlaps(b) {
                found.push(Conflict {
                    first: a.id.clone(),
                    second: b.id.clone(),
                    dock: a.dock.clone(),
                    date: a.date,
                });
            }
        }
    }
    found
}

/// Existing slots a candidate booking would overlap.
#[must_use]
pub fn conflicts_with<'a>(candidate: &Slot, slots: &'a [Slot]) -> Vec<&'a Slot> {
    slots
        .iter()
        .filter(|s| s.id != candidate.id && s.overlaps(candidate))
        .collect()
}

/// The bookings of one day, by start time then dock.
#[must_use]
pub fn day_plan(slots: &[Slot], date: NaiveDate) -> Vec<&Slot> {
    chronological(slots)
        .into_iter()
        .filter(|s| s.date == date)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str, day: u32, dock: &str, start: u32, end: u32) -> Slot {
        Slot {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
            dock: dock.to_string(),
            start: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
            kind: SlotKind::Loading,
            vehicle: None,
            reference: None,
        }
    }

    #[test]
    fn test_slot_kind_parse() {
        assert_eq!("Unload".parse::<SlotKind>(), Ok(SlotKind::Unloading));
        assert_eq!("".parse::<SlotKind>(), Ok(SlotKind::Other));
        assert!("party".parse::<SlotKind>().is_err());
    }

    #[test]
    fn test_validate() {
        assert!(slot("1", 1, "D1", 8, 9).validate().is_ok());
        assert!(matches!(
            slot("1", 1, "D1", 9, 9).validate(),
            Err(ScheduleError::EmptyWindow { .. })
        ));
        assert_eq!(
            slot("1", 1, " ", 8, 9).validate(),
            Err(ScheduleError::MissingDock)
        );
    }

    #[test]
    fn test_overlaps() {
        let a = slot("1", 1, "Dock 1", 8, 10);
        assert!(a.overlaps(&slot("2", 1, "dock 1", 9, 11)));
        // back to back
        assert!(!a.overlaps(&slot("3", 1, "Dock 1", 10, 11)));
        // other dock
        assert!(!a.overlaps(&slot("4", 1, "Dock 2", 9, 11)));
        // other day
        assert!(!a.overlaps(&slot("5", 2, "Dock 1", 9, 11)));
    }

    #[test]
    fn test_conflicts() {
        let slots = vec![
            slot("3", 1, "D1", 9, 12),
            slot("1", 1, "D1", 8, 10),
            slot("2", 1, "D2", 8, 10),
            slot("4", 1, "D1", 11, 13),
            slot("5", 2, "D1", 8, 10),
        ];
        let found = conflicts(&slots);
        assert_eq!(found.len(), 2);
        assert_eq!((found[0].first.as_str(), found[0].second.as_str()), ("1", "3"));
        assert_eq!((found[1].first.as_str(), found[1].second.as_str()), ("3", "4"));
    }

    #[test]
    fn test_conflicts_with_ignores_self() {
        let slots = vec![slot("1", 1, "D1", 8, 10), slot("2", 1, "D1", 12, 13)];
        let candidate = slot("1", 1, "D1", 8, 9);
        assert!(conflicts_with(&candidate, &slots).is_empty());
        let candidate = slot("9", 1, "D1", 9, 12);
        let hits = conflicts_with(&candidate, &slots);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
    }

    #[test]
    fn test_day_plan() {
        let slots = vec![
            slot("1", 1, "D2", 10, 11),
            slot("2", 2, "D1", 8, 9),
            slot("3", 1, "D1", 10, 11),
            slot("4", 1, "D1", 7, 8),
        ];
        let plan = day_plan(&slots, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        let ids: Vec<&str> = plan.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "3", "1"]);
    }
}
