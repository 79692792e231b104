use derive_more::Deref;
use uuid::Uuid;

use crate::{ExerciseID, Name, ReadError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait SplitRepository {
    async fn read_split(&self) -> Result<Option<Split>, ReadError>;
    async fn write_split(&self, split: &Split) -> Result<(), UpdateError>;
}

pub const DEFAULT_TARGET_SETS: u32 = 3;
pub const DEFAULT_TARGET_REPS: u32 = 10;

/// Multi-day workout template. Exactly one split is active at a time; it is
/// owned by the device's local state and mirrored by a backend row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub id: SplitID,
    pub name: Name,
    pub total_days: u32,
    pub days: Vec<SplitDay>,
}

impl Split {
    #[must_use]
    pub fn day(&self, day_index: u32) -> Option<&SplitDay> {
        self.days.get(day_index as usize)
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitID(Uuid);

impl SplitID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for SplitID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for SplitID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDay {
    pub day_index: u32,
    pub name: String,
    pub is_rest: bool,
    pub exercises: Vec<SplitExercise>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitExercise {
    pub exercise_id: ExerciseID,
    pub target_sets: u32,
    pub target_reps: u32,
    pub rest_seconds: u32,
}

/// Repair a split that drifted from its invariants (`total_days` matching the
/// day list, dense day indices, positive set/rep targets). Every load path
/// runs this; the caller persists the repaired form when the flag is set.
#[must_use]
pub fn validate_and_repair(mut split: Split) -> (Split, bool) {
    let mut repaired = false;

    let days = u32::try_from(split.days.len()).unwrap_or(u32::MAX);
    if split.total_days != days {
        split.total_days = days;
        repaired = true;
    }

    for (index, day) in split.days.iter_mut().enumerate() {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        if day.day_index != index {
            day.day_index = index;
            repaired = true;
        }
        for exercise in &mut day.exercises {
            if exercise.target_sets == 0 {
                exercise.target_sets = DEFAULT_TARGET_SETS;
                repaired = true;
            }
            if exercise.target_reps == 0 {
                exercise.target_reps = DEFAULT_TARGET_REPS;
                repaired = true;
            }
            if exercise.target_reps > 999 {
                exercise.target_reps = 999;
                repaired = true;
            }
        }
    }

    (split, repaired)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn split(days: Vec<SplitDay>, total_days: u32) -> Split {
        Split {
            id: 1.into(),
            name: Name::new("Upper/Lower").unwrap(),
            total_days,
            days,
        }
    }

    fn day(day_index: u32, exercises: Vec<SplitExercise>) -> SplitDay {
        SplitDay {
            day_index,
            name: format!("Day {}", day_index + 1),
            is_rest: exercises.is_empty(),
            exercises,
        }
    }

    fn exercise(target_sets: u32, target_reps: u32) -> SplitExercise {
        SplitExercise {
            exercise_id: 1.into(),
            target_sets,
            target_reps,
            rest_seconds: 90,
        }
    }

    #[test]
    fn test_well_formed_split_is_untouched() {
        let original = split(vec![day(0, vec![exercise(3, 10)]), day(1, vec![])], 2);
        let (repaired_split, repaired) = validate_and_repair(original.clone());
        assert_eq!(repaired_split, original);
        assert!(!repaired);
    }

    #[rstest]
    #[case(0, 10, 3, 10)]
    #[case(4, 0, 4, 10)]
    #[case(0, 0, 3, 10)]
    #[case(3, 1500, 3, 999)]
    fn test_repair_set_and_rep_targets(
        #[case] target_sets: u32,
        #[case] target_reps: u32,
        #[case] expected_sets: u32,
        #[case] expected_reps: u32,
    ) {
        let (repaired_split, repaired) =
            validate_and_repair(split(vec![day(0, vec![exercise(target_sets, target_reps)])], 1));
        let exercise = &repaired_split.days[0].exercises[0];
        assert_eq!(exercise.target_sets, expected_sets);
        assert_eq!(exercise.target_reps, expected_reps);
        assert!(repaired);
    }

    #[test]
    fn test_repair_total_days() {
        let (repaired_split, repaired) = validate_and_repair(split(vec![day(0, vec![])], 4));
        assert_eq!(repaired_split.total_days, 1);
        assert!(repaired);
    }

    #[test]
    fn test_repair_day_indices() {
        let (repaired_split, repaired) = validate_and_repair(split(vec![day(2, vec![]), day(0, vec![])], 2));
        assert_eq!(
            repaired_split
                .days
                .iter()
                .map(|d| d.day_index)
                .collect::<Vec<u32>>(),
            vec![0, 1]
        );
        assert!(repaired);
    }

    #[test]
    fn test_split_id_nil() {
        assert!(SplitID::nil().is_nil());
        assert_eq!(SplitID::nil(), SplitID::default());
    }
}
