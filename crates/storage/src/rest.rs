use std::time::Duration;

use ferrum_domain as domain;
use ferrum_domain::{ApiError, BackendID, SessionUpload};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::model;

/// Remote calls are failed, not hung, past this bound.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl Request {
    #[must_use]
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::Get,
            path: path.to_string(),
            body: None,
        }
    }

    #[must_use]
    pub fn post(path: &str, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.to_string(),
            body: Some(body),
        }
    }

    #[must_use]
    pub fn put(path: &str, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.to_string(),
            body: Some(body),
        }
    }

    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self {
            method: Method::Delete,
            path: path.to_string(),
            body: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send(&self, request: Request) -> Result<Response, ApiError>;
}

/// `SendRequest` implementation over HTTPS with a hard per-request timeout.
pub struct ReqwestSendRequest {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestSendRequest {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl SendRequest for ReqwestSendRequest {
    async fn send(&self, request: Request) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        let builder = match request.body {
            Some(body) => builder.json(&body),
            None => builder,
        };
        let response = builder.send().await.map_err(|_| ApiError::NoConnection)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|_| ApiError::NoConnection)?;
        Ok(Response { status, body })
    }
}

/// Client for the backend's JSON API. Any non-2xx response surfaces as
/// `ApiError::Status`; transport failures surface as `NoConnection`.
pub struct Api<S> {
    send_request: S,
}

#[derive(Deserialize)]
struct Created {
    id: u64,
}

/// Backend row of a split, as returned by `GET /splits`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSplit {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub total_days: u32,
    #[serde(default)]
    pub days: Vec<model::SplitDay>,
}

impl RemoteSplit {
    pub fn into_split(self, id: domain::SplitID) -> Result<domain::Split, model::RecordError> {
        domain::Split::try_from(model::Split {
            id: *id,
            name: self.name,
            total_days: self.total_days,
            days: self.days,
        })
    }
}

impl<S: SendRequest> Api<S> {
    pub fn new(send_request: S) -> Self {
        Self { send_request }
    }

    async fn fetch<T: for<'de> Deserialize<'de>>(&self, request: Request) -> Result<T, ApiError> {
        let response = self.send_request.send(request).await?;
        if !(200..300).contains(&response.status) {
            return Err(ApiError::Status(response.status));
        }
        serde_json::from_str(&response.body)
            .map_err(|err| ApiError::Deserialization(err.to_string()))
    }

    async fn fetch_no_content(&self, request: Request) -> Result<(), ApiError> {
        let response = self.send_request.send(request).await?;
        if !(200..300).contains(&response.status) {
            return Err(ApiError::Status(response.status));
        }
        Ok(())
    }

    pub async fn read_splits(&self) -> Result<Vec<RemoteSplit>, ApiError> {
        self.fetch(Request::get("/splits")).await
    }

    pub async fn create_split(&self, split: &domain::Split) -> Result<BackendID, ApiError> {
        let created: Created = self
            .fetch(Request::post("/splits", split_body(split)))
            .await?;
        Ok(created.id.into())
    }

    pub async fn update_split(
        &self,
        id: BackendID,
        split: &domain::Split,
    ) -> Result<(), ApiError> {
        self.fetch_no_content(Request::put(&format!("/splits/{id}"), split_body(split)))
            .await
    }

    pub async fn delete_split(&self, id: BackendID) -> Result<(), ApiError> {
        self.fetch_no_content(Request::delete(&format!("/splits/{id}")))
            .await
    }

    pub async fn read_custom_exercises(
        &self,
    ) -> Result<Vec<domain::CustomExercise>, ApiError> {
        let records: Vec<model::CustomExercise> =
            self.fetch(Request::get("/custom-exercises")).await?;
        Ok(records
            .into_iter()
            .filter_map(|mut record| {
                record.backend_id = record.backend_id.or(Some(*record.id));
                record.pending_sync = false;
                domain::CustomExercise::try_from(record).ok()
            })
            .collect())
    }

    pub async fn create_custom_exercise(
        &self,
        exercise: &domain::CustomExercise,
    ) -> Result<BackendID, ApiError> {
        let created: Created = self
            .fetch(Request::post(
                "/custom-exercises",
                custom_exercise_body(exercise),
            ))
            .await?;
        Ok(created.id.into())
    }

    pub async fn update_custom_exercise(
        &self,
        id: BackendID,
        exercise: &domain::CustomExercise,
    ) -> Result<(), ApiError> {
        self.fetch_no_content(Request::put(
            &format!("/custom-exercises/{id}"),
            custom_exercise_body(exercise),
        ))
        .await
    }

    pub async fn delete_custom_exercise(&self, id: BackendID) -> Result<(), ApiError> {
        self.fetch_no_content(Request::delete(&format!("/custom-exercises/{id}")))
            .await
    }
}

impl<S: SendRequest> domain::WorkoutApi for Api<S> {
    async fn create_workout_session(
        &self,
        upload: &SessionUpload,
    ) -> Result<BackendID, ApiError> {
        let created: Created = self
            .fetch(Request::post(
                "/workout-sessions",
                json!({
                    "userId": upload.user_id.to_string(),
                    "splitId": upload.split_id.to_string(),
                    "dayName": upload.day_name,
                    "dayNumber": upload.day_number,
                    "completedAt": upload.completed_at.to_rfc3339(),
                    "exercises": upload
                        .exercises
                        .iter()
                        .map(|e| json!({
                            "name": e.name,
                            "sets": e
                                .sets
                                .iter()
                                .map(|s| json!({
                                    "setNumber": s.set_number,
                                    "weight": s.weight,
                                    "reps": s.reps,
                                    "completed": s.completed,
                                }))
                                .collect::<Vec<Value>>(),
                        }))
                        .collect::<Vec<Value>>(),
                }),
            ))
            .await?;
        Ok(created.id.into())
    }

    async fn delete_workout_session(&self, id: BackendID) -> Result<(), ApiError> {
        self.fetch_no_content(Request::delete(&format!("/workout-sessions/{id}")))
            .await
    }
}

fn split_body(split: &domain::Split) -> Value {
    json!({
        "name": split.name.to_string(),
        "totalDays": split.total_days,
        "days": split
            .days
            .iter()
            .map(|d| json!({
                "dayIndex": d.day_index,
                "name": d.name,
                "isRest": d.is_rest,
                "exercises": d
                    .exercises
                    .iter()
                    .map(|e| json!({
                        "exerciseId": *e.exercise_id,
                        "targetSets": e.target_sets,
                        "targetReps": e.target_reps,
                        "restSeconds": e.rest_seconds,
                    }))
                    .collect::<Vec<Value>>(),
            }))
            .collect::<Vec<Value>>(),
    })
}

fn custom_exercise_body(exercise: &domain::CustomExercise) -> Value {
    json!({
        "name": exercise.name.to_string(),
        "primaryMuscles": exercise
            .primary_muscles
            .iter()
            .map(|m| m.as_ref())
            .collect::<Vec<&str>>(),
        "secondaryMuscles": exercise
            .secondary_muscles
            .iter()
            .map(|m| m.as_ref())
            .collect::<Vec<&str>>(),
        "equipment": exercise.equipment.as_ref(),
        "category": exercise.category.as_ref(),
        "difficulty": exercise.difficulty.as_ref(),
    })
}
