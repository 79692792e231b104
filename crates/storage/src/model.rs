//! Serde mirrors of the domain types as they are laid out in the durable
//! store and on the wire.
//!
//! Long-lived installations carry documents written by several generations
//! of the app: exercise ids appear both as JSON numbers and as strings, set
//! counts as floats, and some fields are missing entirely. Normalization to
//! the typed domain model happens here, once, on read and write; nothing
//! past this module sees the drift.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use ferrum_domain as domain;

#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    #[error(transparent)]
    Name(#[from] domain::NameError),
}

fn exercise_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<domain::ExerciseID, D::Error> {
    let value = Value::deserialize(deserializer)?;
    coerce_exercise_id(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid exercise id: {value}")))
}

fn serialize_exercise_id<S: Serializer>(
    id: &domain::ExerciseID,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64((*id).into())
}

fn coerce_exercise_id(value: &Value) -> Option<domain::ExerciseID> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let id = match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64))
        }
        _ => None,
    };
    id.map(domain::ExerciseID::from)
}

fn loose_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        Some(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| *f >= 0.0)
            .map_or(0, |f| f as u32),
        _ => 0,
    })
}

fn loose_f32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    #[allow(clippy::cast_possible_truncation)]
    Ok(match value {
        Some(Value::Number(number)) => number.as_f64().map_or(0.0, |f| f as f32),
        Some(Value::String(text)) => text.trim().parse::<f32>().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn muscles(tokens: &[String]) -> Vec<domain::Muscle> {
    tokens
        .iter()
        .filter_map(|token| {
            let muscle = domain::Muscle::from_str(token);
            if muscle.is_err() {
                debug!("dropping unknown muscle token {token:?}");
            }
            muscle.ok()
        })
        .collect()
}

fn muscle_tokens(muscles: &[domain::Muscle]) -> Vec<String> {
    muscles.iter().map(|m| m.as_ref().to_string()).collect()
}

fn equipment(token: &str) -> domain::Equipment {
    domain::Equipment::from_str(token).unwrap_or_else(|_| {
        debug!("unknown equipment token {token:?}, assuming bodyweight");
        domain::Equipment::default()
    })
}

fn reps(value: u32) -> domain::Reps {
    domain::Reps::new(value.min(999)).unwrap_or_default()
}

fn weight(value: f32) -> domain::Weight {
    let rounded = (value * 10.0).round() / 10.0;
    domain::Weight::new(rounded.clamp(0.0, 999.9)).unwrap_or_default()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub id: Uuid,
    pub name: String,
    #[serde(default, deserialize_with = "loose_u32")]
    pub total_days: u32,
    #[serde(default)]
    pub days: Vec<SplitDay>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SplitDay {
    #[serde(default, deserialize_with = "loose_u32")]
    pub day_index: u32,
    pub name: String,
    #[serde(default)]
    pub is_rest: bool,
    #[serde(default)]
    pub exercises: Vec<SplitExercise>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SplitExercise {
    #[serde(deserialize_with = "exercise_id", serialize_with = "serialize_exercise_id")]
    pub exercise_id: domain::ExerciseID,
    #[serde(default, deserialize_with = "loose_u32")]
    pub target_sets: u32,
    #[serde(default, deserialize_with = "loose_u32")]
    pub target_reps: u32,
    #[serde(default, deserialize_with = "loose_u32")]
    pub rest_seconds: u32,
}

impl From<&domain::Split> for Split {
    fn from(value: &domain::Split) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            total_days: value.total_days,
            days: value.days.iter().map(Into::into).collect(),
        }
    }
}

impl From<&domain::SplitDay> for SplitDay {
    fn from(value: &domain::SplitDay) -> Self {
        Self {
            day_index: value.day_index,
            name: value.name.clone(),
            is_rest: value.is_rest,
            exercises: value
                .exercises
                .iter()
                .map(|e| SplitExercise {
                    exercise_id: e.exercise_id,
                    target_sets: e.target_sets,
                    target_reps: e.target_reps,
                    rest_seconds: e.rest_seconds,
                })
                .collect(),
        }
    }
}

impl TryFrom<Split> for domain::Split {
    type Error = RecordError;

    fn try_from(value: Split) -> Result<Self, Self::Error> {
        Ok(domain::Split {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            total_days: value.total_days,
            days: value
                .days
                .into_iter()
                .map(|day| domain::SplitDay {
                    day_index: day.day_index,
                    name: day.name,
                    is_rest: day.is_rest,
                    exercises: day
                        .exercises
                        .into_iter()
                        .map(|e| domain::SplitExercise {
                            exercise_id: e.exercise_id,
                            target_sets: e.target_sets,
                            target_reps: e.target_reps,
                            rest_seconds: e.rest_seconds,
                        })
                        .collect(),
                })
                .collect(),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Workout,
    Rest,
}

impl From<domain::SessionKind> for SessionKind {
    fn from(value: domain::SessionKind) -> Self {
        match value {
            domain::SessionKind::Workout => SessionKind::Workout,
            domain::SessionKind::Rest => SessionKind::Rest,
        }
    }
}

impl From<SessionKind> for domain::SessionKind {
    fn from(value: SessionKind) -> Self {
        match value {
            SessionKind::Workout => domain::SessionKind::Workout,
            SessionKind::Rest => domain::SessionKind::Rest,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: Uuid,
    pub split_id: Uuid,
    #[serde(default, deserialize_with = "loose_u32")]
    pub day_index: u32,
    #[serde(default)]
    pub kind: SessionKind,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
    #[serde(default)]
    pub pending_sync: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    #[serde(deserialize_with = "exercise_id", serialize_with = "serialize_exercise_id")]
    pub exercise_id: domain::ExerciseID,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    #[serde(default, deserialize_with = "loose_u32")]
    pub set_index: u32,
    #[serde(default, deserialize_with = "loose_u32")]
    pub reps: u32,
    #[serde(default, deserialize_with = "loose_f32")]
    pub weight: f32,
    #[serde(default)]
    pub completed: bool,
}

impl From<&domain::WorkoutSession> for WorkoutSession {
    fn from(value: &domain::WorkoutSession) -> Self {
        Self {
            id: *value.id,
            split_id: *value.split_id,
            day_index: value.day_index,
            kind: value.kind.into(),
            started_at: value.started_at,
            completed_at: value.completed_at,
            exercises: value
                .exercises
                .iter()
                .map(|e| WorkoutExercise {
                    exercise_id: e.exercise_id,
                    sets: e
                        .sets
                        .iter()
                        .map(|s| WorkoutSet {
                            set_index: s.set_index,
                            reps: s.reps.into(),
                            weight: s.weight.into(),
                            completed: s.completed,
                        })
                        .collect(),
                })
                .collect(),
            pending_sync: value.pending_sync,
        }
    }
}

impl From<WorkoutSession> for domain::WorkoutSession {
    fn from(value: WorkoutSession) -> Self {
        domain::WorkoutSession {
            id: value.id.into(),
            split_id: value.split_id.into(),
            day_index: value.day_index,
            kind: value.kind.into(),
            started_at: value.started_at,
            completed_at: value.completed_at,
            exercises: value
                .exercises
                .into_iter()
                .map(|e| domain::WorkoutExercise {
                    exercise_id: e.exercise_id,
                    sets: e
                        .sets
                        .into_iter()
                        .map(|s| domain::WorkoutSet {
                            set_index: s.set_index,
                            reps: reps(s.reps),
                            weight: weight(s.weight),
                            completed: s.completed,
                        })
                        .collect(),
                })
                .collect(),
            pending_sync: value.pending_sync,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(deserialize_with = "exercise_id", serialize_with = "serialize_exercise_id")]
    pub id: domain::ExerciseID,
    pub name: String,
    #[serde(default)]
    pub primary_muscles: Vec<String>,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    #[serde(default)]
    pub equipment: Option<String>,
}

impl From<&domain::Exercise> for Exercise {
    fn from(value: &domain::Exercise) -> Self {
        Self {
            id: value.id,
            name: value.name.to_string(),
            primary_muscles: muscle_tokens(&value.primary_muscles),
            secondary_muscles: muscle_tokens(&value.secondary_muscles),
            equipment: Some(value.equipment.as_ref().to_string()),
        }
    }
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = RecordError;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        Ok(domain::Exercise {
            id: value.id,
            name: domain::Name::new(&value.name)?,
            primary_muscles: muscles(&value.primary_muscles),
            secondary_muscles: muscles(&value.secondary_muscles),
            equipment: value.equipment.as_deref().map_or_else(
                domain::Equipment::default,
                equipment,
            ),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomExercise {
    #[serde(deserialize_with = "exercise_id", serialize_with = "serialize_exercise_id")]
    pub id: domain::ExerciseID,
    pub name: String,
    #[serde(default)]
    pub primary_muscles: Vec<String>,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub pending_sync: bool,
    #[serde(default)]
    pub backend_id: Option<u64>,
}

impl From<&domain::CustomExercise> for CustomExercise {
    fn from(value: &domain::CustomExercise) -> Self {
        Self {
            id: value.id,
            name: value.name.to_string(),
            primary_muscles: muscle_tokens(&value.primary_muscles),
            secondary_muscles: muscle_tokens(&value.secondary_muscles),
            equipment: Some(value.equipment.as_ref().to_string()),
            category: Some(value.category.as_ref().to_string()),
            difficulty: Some(value.difficulty.as_ref().to_string()),
            pending_sync: value.pending_sync,
            backend_id: value.backend_id.map(|id| *id),
        }
    }
}

impl TryFrom<CustomExercise> for domain::CustomExercise {
    type Error = RecordError;

    fn try_from(value: CustomExercise) -> Result<Self, Self::Error> {
        Ok(domain::CustomExercise {
            id: value.id,
            name: domain::Name::new(&value.name)?,
            primary_muscles: muscles(&value.primary_muscles),
            secondary_muscles: muscles(&value.secondary_muscles),
            equipment: value.equipment.as_deref().map_or_else(
                domain::Equipment::default,
                equipment,
            ),
            category: value
                .category
                .as_deref()
                .and_then(|token| domain::Category::from_str(token).ok())
                .unwrap_or_default(),
            difficulty: value
                .difficulty
                .as_deref()
                .and_then(|token| domain::Difficulty::from_str(token).ok())
                .unwrap_or_default(),
            pending_sync: value.pending_sync,
            backend_id: value.backend_id.map(domain::BackendID::from),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueuedAction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default, deserialize_with = "loose_u32")]
    pub retry_count: u32,
}

impl From<&domain::QueuedAction> for QueuedAction {
    fn from(value: &domain::QueuedAction) -> Self {
        Self {
            id: *value.id,
            kind: value.kind.clone(),
            payload: serde_json::from_str(&value.payload)
                .unwrap_or_else(|_| Value::String(value.payload.clone())),
            timestamp: value.timestamp,
            user_id: value.user_id.map(|id| *id),
            retry_count: value.retry_count,
        }
    }
}

impl From<QueuedAction> for domain::QueuedAction {
    fn from(value: QueuedAction) -> Self {
        domain::QueuedAction {
            id: value.id.into(),
            kind: value.kind,
            payload: match value.payload {
                Value::String(text) => text,
                payload => payload.to_string(),
            },
            timestamp: value.timestamp,
            user_id: value.user_id.map(Into::into),
            retry_count: value.retry_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(r#"{"exerciseId": 12, "targetSets": 3, "targetReps": 10, "restSeconds": 90}"#, 12)]
    #[case(r#"{"exerciseId": "12", "targetSets": 3, "targetReps": 10, "restSeconds": 90}"#, 12)]
    #[case(r#"{"exerciseId": " 12 ", "targetSets": 3, "targetReps": 10, "restSeconds": 90}"#, 12)]
    #[case(r#"{"exerciseId": 12.0, "targetSets": 3, "targetReps": 10, "restSeconds": 90}"#, 12)]
    fn test_exercise_id_coercion(#[case] json: &str, #[case] expected: u64) {
        let record = serde_json::from_str::<SplitExercise>(json).unwrap();
        assert_eq!(record.exercise_id, expected.into());
    }

    #[test]
    fn test_exercise_id_rejects_garbage() {
        assert!(
            serde_json::from_str::<SplitExercise>(r#"{"exerciseId": "bench press"}"#).is_err()
        );
    }

    #[rstest]
    #[case(r#"{"setIndex": 0, "reps": "8", "weight": "60.0"}"#, 8, 60.0)]
    #[case(r#"{"setIndex": 0, "reps": 8.0, "weight": 60}"#, 8, 60.0)]
    #[case(r#"{"setIndex": 0}"#, 0, 0.0)]
    #[case(r#"{"setIndex": 0, "reps": null, "weight": null}"#, 0, 0.0)]
    fn test_workout_set_coercion(#[case] json: &str, #[case] reps: u32, #[case] weight: f32) {
        let record = serde_json::from_str::<WorkoutSet>(json).unwrap();
        assert_eq!(record.reps, reps);
        assert_eq!(record.weight, weight);
    }

    #[test]
    fn test_workout_set_out_of_range_values_are_clamped() {
        let record = serde_json::from_str::<WorkoutSet>(
            r#"{"setIndex": 0, "reps": 100000, "weight": 62.5432}"#,
        )
        .unwrap();
        let session = domain::WorkoutSession::from(WorkoutSession {
            id: Uuid::nil(),
            split_id: Uuid::nil(),
            day_index: 0,
            kind: SessionKind::Workout,
            started_at: Utc::now(),
            completed_at: None,
            exercises: vec![WorkoutExercise {
                exercise_id: 1.into(),
                sets: vec![record],
            }],
            pending_sync: false,
        });
        let set = session.exercises[0].sets[0];
        assert_eq!(set.reps, domain::Reps::new(999).unwrap());
        assert_eq!(set.weight, domain::Weight::new(62.5).unwrap());
    }

    #[test]
    fn test_session_kind_defaults_to_workout() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "splitId": "00000000-0000-0000-0000-000000000002",
            "dayIndex": 0,
            "startedAt": "2024-03-10T18:00:00Z"
        }"#;
        let record = serde_json::from_str::<WorkoutSession>(json).unwrap();
        assert_eq!(record.kind, SessionKind::Workout);
        assert!(!record.pending_sync);
    }

    #[test]
    fn test_unknown_muscle_tokens_are_dropped() {
        let record = Exercise {
            id: 1.into(),
            name: "Bench Press".to_string(),
            primary_muscles: vec!["chest".to_string(), "wings".to_string()],
            secondary_muscles: vec![],
            equipment: Some("plasma rifle".to_string()),
        };
        let exercise = domain::Exercise::try_from(record).unwrap();
        assert_eq!(exercise.primary_muscles, vec![domain::Muscle::Chest]);
        assert_eq!(exercise.equipment, domain::Equipment::Bodyweight);
    }

    #[test]
    fn test_queued_action_payload_round_trip() {
        let action = domain::QueuedAction::new(
            "create-custom-exercise",
            r#"{"name":"Cossack Squat"}"#.to_string(),
            None,
        );
        let record = QueuedAction::from(&action);
        assert_eq!(record.payload["name"], "Cossack Squat");
        assert_eq!(domain::QueuedAction::from(record), action);
    }

    #[test]
    fn test_queued_action_non_json_payload_survives() {
        let action = domain::QueuedAction::new("note", "free text".to_string(), None);
        let record = QueuedAction::from(&action);
        assert_eq!(domain::QueuedAction::from(record).payload, "free text");
    }
}
