use std::collections::BTreeSet;
use std::fmt;

use derive_more::{Deref, Display, Into};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::{BackendID, CreateError, DeleteError, Name, ReadError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn read_exercise(&self, id: ExerciseID) -> Result<Option<Exercise>, ReadError> {
        Ok(self
            .read_exercises()
            .await?
            .into_iter()
            .find(|e| e.id == id))
    }
    async fn read_custom_exercises(&self) -> Result<Vec<CustomExercise>, ReadError>;
    async fn read_custom_exercise(
        &self,
        id: ExerciseID,
    ) -> Result<Option<CustomExercise>, ReadError> {
        Ok(self
            .read_custom_exercises()
            .await?
            .into_iter()
            .find(|e| e.id == id))
    }
    async fn create_custom_exercise(
        &self,
        exercise: CustomExercise,
    ) -> Result<CustomExercise, CreateError>;
    async fn replace_custom_exercise(
        &self,
        exercise: CustomExercise,
    ) -> Result<CustomExercise, UpdateError>;
    async fn delete_custom_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
    async fn replace_custom_exercises(
        &self,
        server: Vec<CustomExercise>,
    ) -> Result<Vec<CustomExercise>, UpdateError>;
}

/// Catalog entry. Bundled entries are immutable; user-created exercises are
/// kept in a parallel collection with the same shape (`CustomExercise`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub primary_muscles: Vec<Muscle>,
    pub secondary_muscles: Vec<Muscle>,
    pub equipment: Equipment,
}

impl Exercise {
    #[must_use]
    pub fn muscles(&self) -> BTreeSet<Muscle> {
        self.primary_muscles
            .iter()
            .chain(self.secondary_muscles.iter())
            .copied()
            .collect()
    }
}

/// Canonical numeric form of an exercise id. Historical data stores ids both
/// as numbers and as strings; normalization to this form happens once at the
/// storage boundary.
#[derive(Deref, Display, Into, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(u64);

impl From<u64> for ExerciseID {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for ExerciseID {
    type Err = ExerciseIDError;

    /// Accepts both the canonical integer form and the float form some
    /// legacy documents carry.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if let Ok(id) = value.parse::<u64>() {
            return Ok(Self(id));
        }
        match value.parse::<f64>() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Ok(id) if id >= 0.0 && id.fract() == 0.0 => Ok(Self(id as u64)),
            _ => Err(ExerciseIDError::Invalid(value.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExerciseIDError {
    #[error("not a valid exercise id: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomExercise {
    pub id: ExerciseID,
    pub name: Name,
    pub primary_muscles: Vec<Muscle>,
    pub secondary_muscles: Vec<Muscle>,
    pub equipment: Equipment,
    pub category: Category,
    pub difficulty: Difficulty,
    pub pending_sync: bool,
    pub backend_id: Option<BackendID>,
}

/// Merge the backend's custom exercise list with local state, keeping
/// local-only entries that still await upload. Entries that reached the
/// backend are deduplicated by backend id, server side winning.
#[must_use]
pub fn merge_custom_exercises(
    server: Vec<CustomExercise>,
    local: Vec<CustomExercise>,
) -> Vec<CustomExercise> {
    let known = server
        .iter()
        .filter_map(|e| e.backend_id)
        .collect::<BTreeSet<_>>();
    let mut merged = server;
    merged.extend(local.into_iter().filter(|e| {
        e.pending_sync && !e.backend_id.is_some_and(|id| known.contains(&id))
    }));
    merged
}

#[derive(
    AsRefStr,
    EnumIter,
    EnumString,
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
)]
pub enum Muscle {
    #[strum(serialize = "chest")]
    Chest,
    #[strum(serialize = "upper_back")]
    UpperBack,
    #[strum(serialize = "lats")]
    Lats,
    #[strum(serialize = "front_delts")]
    FrontDelts,
    #[strum(serialize = "side_delts")]
    SideDelts,
    #[strum(serialize = "rear_delts")]
    RearDelts,
    #[strum(serialize = "biceps")]
    Biceps,
    #[strum(serialize = "triceps")]
    Triceps,
    #[strum(serialize = "forearms")]
    Forearms,
    #[strum(serialize = "abs")]
    Abs,
    #[strum(serialize = "lower_back")]
    LowerBack,
    #[strum(serialize = "glutes")]
    Glutes,
    #[strum(serialize = "quads")]
    Quads,
    #[strum(serialize = "hamstrings")]
    Hamstrings,
    #[strum(serialize = "calves")]
    Calves,
}

impl Muscle {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Muscle::Chest => "Chest",
            Muscle::UpperBack => "Upper Back",
            Muscle::Lats => "Lats",
            Muscle::FrontDelts => "Front Delts",
            Muscle::SideDelts => "Side Delts",
            Muscle::RearDelts => "Rear Delts",
            Muscle::Biceps => "Biceps",
            Muscle::Triceps => "Triceps",
            Muscle::Forearms => "Forearms",
            Muscle::Abs => "Abs",
            Muscle::LowerBack => "Lower Back",
            Muscle::Glutes => "Glutes",
            Muscle::Quads => "Quads",
            Muscle::Hamstrings => "Hamstrings",
            Muscle::Calves => "Calves",
        }
    }
}

impl fmt::Display for Muscle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(AsRefStr, EnumString, Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Equipment {
    #[strum(serialize = "barbell")]
    Barbell,
    #[strum(serialize = "dumbbell")]
    Dumbbell,
    #[strum(serialize = "machine")]
    Machine,
    #[strum(serialize = "cable")]
    Cable,
    #[strum(serialize = "kettlebell")]
    Kettlebell,
    #[strum(serialize = "resistance_band")]
    ResistanceBand,
    #[default]
    #[strum(serialize = "bodyweight")]
    Bodyweight,
}

#[derive(AsRefStr, EnumString, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Category {
    #[default]
    #[strum(serialize = "strength")]
    Strength,
    #[strum(serialize = "cardio")]
    Cardio,
    #[strum(serialize = "mobility")]
    Mobility,
}

#[derive(AsRefStr, EnumString, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Difficulty {
    #[default]
    #[strum(serialize = "beginner")]
    Beginner,
    #[strum(serialize = "intermediate")]
    Intermediate,
    #[strum(serialize = "advanced")]
    Advanced,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn custom(id: u64, pending_sync: bool, backend_id: Option<u64>) -> CustomExercise {
        CustomExercise {
            id: id.into(),
            name: Name::new(&format!("Exercise {id}")).unwrap(),
            primary_muscles: vec![Muscle::Chest],
            secondary_muscles: vec![Muscle::Triceps],
            equipment: Equipment::Dumbbell,
            category: Category::Strength,
            difficulty: Difficulty::Beginner,
            pending_sync,
            backend_id: backend_id.map(BackendID::from),
        }
    }

    #[rstest]
    #[case("12", Ok(ExerciseID(12)))]
    #[case(" 12 ", Ok(ExerciseID(12)))]
    #[case("12.0", Ok(ExerciseID(12)))]
    #[case("12.5", Err(ExerciseIDError::Invalid("12.5".to_string())))]
    #[case("-3", Err(ExerciseIDError::Invalid("-3".to_string())))]
    #[case("bench", Err(ExerciseIDError::Invalid("bench".to_string())))]
    fn test_exercise_id_from_str(
        #[case] value: &str,
        #[case] expected: Result<ExerciseID, ExerciseIDError>,
    ) {
        assert_eq!(ExerciseID::from_str(value), expected);
    }

    #[test]
    fn test_muscle_tokens_round_trip() {
        for muscle in [Muscle::Chest, Muscle::FrontDelts, Muscle::LowerBack] {
            assert_eq!(Muscle::from_str(muscle.as_ref()).unwrap(), muscle);
        }
        assert!(Muscle::from_str("tentacles").is_err());
    }

    #[test]
    fn test_exercise_muscles() {
        let exercise = Exercise {
            id: 1.into(),
            name: Name::new("Bench Press").unwrap(),
            primary_muscles: vec![Muscle::Chest],
            secondary_muscles: vec![Muscle::Triceps, Muscle::FrontDelts],
            equipment: Equipment::Barbell,
        };
        assert_eq!(
            exercise.muscles(),
            BTreeSet::from([Muscle::Chest, Muscle::FrontDelts, Muscle::Triceps])
        );
    }

    #[test]
    fn test_merge_keeps_local_pending_entries() {
        let server = vec![custom(10, false, Some(100))];
        let local = vec![custom(11, true, None), custom(12, false, None)];

        let merged = merge_custom_exercises(server, local);

        assert_eq!(
            merged.iter().map(|e| e.id).collect::<Vec<ExerciseID>>(),
            vec![10.into(), 11.into()]
        );
    }

    #[test]
    fn test_merge_dedups_by_backend_id() {
        let server = vec![custom(10, false, Some(100))];
        let local = vec![custom(99, true, Some(100))];

        let merged = merge_custom_exercises(server, local);

        assert_eq!(
            merged.iter().map(|e| e.id).collect::<Vec<ExerciseID>>(),
            vec![10.into()]
        );
    }

    #[test]
    fn test_merge_with_empty_server_list() {
        let local = vec![custom(11, true, None)];
        assert_eq!(merge_custom_exercises(vec![], local.clone()), local);
    }
}
