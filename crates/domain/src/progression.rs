use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{ReadError, SessionKind, Split, UpdateError, WorkoutID};

#[allow(async_fn_in_trait)]
pub trait ProgressionRepository {
    async fn read_progression(&self) -> Result<Progression, ReadError>;
    async fn write_progression(&self, progression: &Progression) -> Result<(), UpdateError>;
}

/// The `(week, day)` cursor indicating which split day is "today", together
/// with the dates needed to keep it consistent across real elapsed days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progression {
    pub current_week: u32,
    pub current_day_index: u32,
    pub last_completion_date: Option<NaiveDate>,
    pub last_check_date: Option<NaiveDate>,
    pub completed_session_id: Option<WorkoutID>,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            current_week: 1,
            current_day_index: 0,
            last_completion_date: None,
            last_check_date: None,
            completed_session_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub state: Progression,
    pub advanced: bool,
    pub corrected: bool,
    pub changed: bool,
}

/// Advance or rewind the day pointer to stay consistent with real elapsed
/// days. Evaluated on app foreground and on a fixed interval while
/// foregrounded; at most one step per evaluation.
///
/// The pointer advances across a calendar-day boundary only if the day it
/// points at was a rest day or was completed on the day of the last check.
/// A missed workout day holds the pointer, so the user resumes the same day
/// instead of skipping it. A `last_check_date` in the future is a leftover
/// of a UTC-based check and is corrected by rolling the pointer back one day.
#[must_use]
pub fn evaluate(state: &Progression, split: &Split, today: NaiveDate) -> Evaluation {
    let total_days = u32::try_from(split.days.len()).unwrap_or(1).max(1);
    let mut next = state.clone();
    let mut advanced = false;
    let mut corrected = false;

    match state.last_check_date {
        None => {
            next.last_check_date = Some(today);
        }
        Some(last_check) if last_check > today => {
            if next.current_day_index == 0 {
                next.current_day_index = total_days - 1;
                next.current_week = next.current_week.saturating_sub(1);
            } else {
                next.current_day_index -= 1;
            }
            next.last_check_date = Some(today);
            if next.last_completion_date.is_some_and(|date| date > today) {
                next.last_completion_date = Some(today);
            }
            corrected = true;
        }
        Some(last_check) if last_check < today => {
            let day = split.day(state.current_day_index % total_days);
            let advance = day.is_some_and(|day| day.is_rest)
                || state.last_completion_date == Some(last_check);
            if advance {
                next.current_day_index = (state.current_day_index + 1) % total_days;
                if next.current_day_index == 0 {
                    next.current_week += 1;
                }
                advanced = true;
            }
            next.completed_session_id = None;
            next.last_completion_date = None;
            next.last_check_date = Some(today);
        }
        Some(_) => {}
    }

    let changed = next != *state;
    Evaluation {
        state: next,
        advanced,
        corrected,
        changed,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub kind: SessionKind,
}

/// Current streak derived from recorded activity, newest first. A gap of two
/// or more calendar days ends the walk; rest days preserve the streak without
/// incrementing it.
#[must_use]
pub fn streak(days: &[ActivityDay], today: NaiveDate) -> u32 {
    let mut by_date: BTreeMap<NaiveDate, SessionKind> = BTreeMap::new();
    for day in days {
        if day.date > today {
            continue;
        }
        let kind = by_date.entry(day.date).or_insert(day.kind);
        if day.kind == SessionKind::Workout {
            *kind = SessionKind::Workout;
        }
    }

    let mut count = 0;
    let mut cursor = today;
    for (date, kind) in by_date.iter().rev() {
        if (cursor - *date).num_days() >= 2 {
            break;
        }
        if *kind == SessionKind::Workout {
            count += 1;
        }
        cursor = *date;
    }
    count
}
