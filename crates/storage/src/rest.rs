//! REST
//!
//! Client of the HTTP API. The wire types mirror the JSON documents of the API and are converted
//! into domain types at the boundary. Attributes, equipment or muscles with unknown names are
//! skipped instead of rejecting the whole document, and so are templates with an invalid name.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use forma_domain as domain;
use gloo_net::http::{Request, Response};
use log::warn;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error>;
}

#[derive(Clone, Default)]
pub struct GlooNetSendRequest;

impl SendRequest for GlooNetSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error> {
        request.send().await
    }
}

#[derive(Clone)]
pub struct REST<S: SendRequest> {
    pub sender: S,
}

impl REST<GlooNetSendRequest> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sender: GlooNetSendRequest,
        }
    }
}

impl Default for REST<GlooNetSendRequest> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SendRequest> domain::SessionRepository for REST<S> {
    async fn initialize_session(&self) -> Result<domain::User, domain::ReadError> {
        let user: User = self.fetch(Request::get("api/session").build()).await?;
        domain::User::try_from(user).map_err(|err| domain::ReadError::Other(err.into()))
    }
}

impl<S: SendRequest> domain::ExerciseRepository for REST<S> {
    async fn read_exercises_by_muscle(
        &self,
        equipment: &BTreeSet<domain::Equipment>,
        muscles: &BTreeSet<domain::Muscle>,
    ) -> Result<Vec<domain::MuscleGroup>, domain::ReadError> {
        let groups: Vec<MuscleGroup> = self
            .fetch(
                Request::get("api/exercises/by-muscle")
                    .query([
                        ("equipment", join(equipment.iter().copied())),
                        ("muscles", join(muscles.iter().copied())),
                    ])
                    .build(),
            )
            .await?;
        Ok(groups
            .into_iter()
            .filter_map(|group| domain::MuscleGroup::try_from(group).ok())
            .collect())
    }

    async fn search_exercises(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let results: SearchResults = self
            .fetch(
                Request::get("api/exercises/all")
                    .query([("search", query.to_string()), ("limit", limit.to_string())])
                    .build(),
            )
            .await?;
        Ok(results
            .data
            .into_iter()
            .map(domain::Exercise::from)
            .collect())
    }
}

impl<S: SendRequest> domain::TemplateRepository for REST<S> {
    async fn read_templates(
        &self,
        _owner: domain::UserID,
    ) -> Result<Vec<domain::Template>, domain::ReadError> {
        let templates: Vec<Template> = self.fetch(Request::get("api/templates").build()).await?;
        Ok(valid_templates(templates))
    }

    async fn create_template(
        &self,
        _owner: domain::UserID,
        name: domain::Name,
        equipment: BTreeSet<domain::Equipment>,
        muscles: BTreeSet<domain::Muscle>,
        exercises: Vec<domain::TemplateExerciseEntry>,
    ) -> Result<domain::Template, domain::CreateError> {
        let template: Template = self
            .fetch(Request::post("api/templates").json(&NewTemplate {
                name: name.to_string(),
                equipment: equipment.into_iter().map(Into::into).collect(),
                muscles: muscles.into_iter().map(Into::into).collect(),
                exercises: exercises.into_iter().map(TemplateExerciseEntry::from).collect(),
            }))
            .await?;
        domain::Template::try_from(template).map_err(|err| domain::CreateError::Other(err.into()))
    }

    async fn modify_template(
        &self,
        _owner: domain::UserID,
        id: domain::TemplateID,
        changes: domain::TemplateChanges,
    ) -> Result<domain::Template, domain::UpdateError> {
        let template: Template = self
            .fetch(
                Request::patch(&format!("api/templates/{id}"))
                    .json(&TemplateChanges::from(changes)),
            )
            .await?;
        domain::Template::try_from(template).map_err(|err| domain::UpdateError::Other(err.into()))
    }

    async fn delete_template(
        &self,
        _owner: domain::UserID,
        id: domain::TemplateID,
    ) -> Result<domain::TemplateID, domain::DeleteError> {
        self.fetch_no_content(
            Request::delete(&format!("api/templates/{id}")).build(),
            id,
        )
        .await
        .map_err(Into::into)
    }
}

impl<S: SendRequest> REST<S> {
    async fn fetch<T>(&self, request: Result<Request, gloo_net::Error>) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| Error::Other(err.into()))
    }

    async fn fetch_no_content<T>(
        &self,
        request: Result<Request, gloo_net::Error>,
        result: T,
    ) -> Result<T, Error> {
        self.send(request).await?;
        Ok(result)
    }

    async fn send(&self, request: Result<Request, gloo_net::Error>) -> Result<Response, Error> {
        let request = request.map_err(|err| Error::Other(err.into()))?;
        let response = self
            .sender
            .send_request(request)
            .await
            .map_err(|_| Error::NoConnection)?;

        match response.status() {
            200..=299 => Ok(response),
            401 | 403 => Err(Error::Unauthorized),
            404 => Err(Error::NotFound),
            409 => Err(Error::Conflict),
            422 => match response.json::<UnknownExercise>().await {
                Ok(body) => Err(Error::UnknownExercise(body.exercise_id.into())),
                Err(err) => Err(Error::Other(err.into())),
            },
            status => Err(Error::Status(status, response.status_text())),
        }
    }
}

fn join<P: Into<&'static str>>(properties: impl Iterator<Item = P>) -> String {
    properties
        .map(Into::<&'static str>::into)
        .collect::<Vec<&str>>()
        .join(",")
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no connection")]
    NoConnection,
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error("unknown exercise {0}")]
    UnknownExercise(domain::ExerciseID),
    #[error("unexpected response: {0} {1}")]
    Status(u16, String),
    #[error(transparent)]
    Other(Box<dyn std::error::Error>),
}

impl From<Error> for domain::ReadError {
    fn from(value: Error) -> Self {
        match value {
            Error::NoConnection => domain::ReadError::Storage(domain::StorageError::NoConnection),
            Error::Unauthorized => domain::ReadError::Storage(domain::StorageError::NoSession),
            Error::NotFound => domain::ReadError::NotFound,
            Error::Other(err) => domain::ReadError::Other(err),
            err => domain::ReadError::Other(err.into()),
        }
    }
}

impl From<Error> for domain::CreateError {
    fn from(value: Error) -> Self {
        match value {
            Error::NoConnection => domain::CreateError::Storage(domain::StorageError::NoConnection),
            Error::Unauthorized => domain::CreateError::Unauthorized,
            Error::Conflict => domain::CreateError::Conflict,
            Error::UnknownExercise(id) => domain::CreateError::UnknownExercise(id),
            Error::Other(err) => domain::CreateError::Other(err),
            err => domain::CreateError::Other(err.into()),
        }
    }
}

impl From<Error> for domain::UpdateError {
    fn from(value: Error) -> Self {
        match value {
            Error::NoConnection => domain::UpdateError::Storage(domain::StorageError::NoConnection),
            Error::Unauthorized => domain::UpdateError::Unauthorized,
            Error::NotFound => domain::UpdateError::NotFound,
            Error::Conflict => domain::UpdateError::Conflict,
            Error::UnknownExercise(id) => domain::UpdateError::UnknownExercise(id),
            Error::Other(err) => domain::UpdateError::Other(err),
            err @ Error::Status(..) => domain::UpdateError::Other(err.into()),
        }
    }
}

impl From<Error> for domain::DeleteError {
    fn from(value: Error) -> Self {
        match value {
            Error::NoConnection => domain::DeleteError::Storage(domain::StorageError::NoConnection),
            Error::Unauthorized => domain::DeleteError::Unauthorized,
            Error::NotFound => domain::DeleteError::NotFound,
            Error::Other(err) => domain::DeleteError::Other(err),
            err => domain::DeleteError::Other(err.into()),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
}

impl TryFrom<User> for domain::User {
    type Error = domain::NameError;

    fn try_from(value: User) -> Result<Self, Self::Error> {
        Ok(domain::User {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
        })
    }
}

impl From<domain::User> for User {
    fn from(value: domain::User) -> Self {
        User {
            id: *value.id,
            name: value.name.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub full_video_url: Option<String>,
    #[serde(default)]
    pub full_video_image_url: Option<String>,
    #[serde(default)]
    pub attributes: Vec<ExerciseAttribute>,
}

impl From<Exercise> for domain::Exercise {
    fn from(value: Exercise) -> Self {
        let attributes = value
            .attributes
            .iter()
            .filter_map(|attribute| {
                domain::ExerciseAttribute::parse(
                    &attribute.attribute_name.name,
                    &attribute.attribute_value.value,
                )
                .inspect_err(|err| warn!("ignoring attribute of exercise {}: {err}", value.id))
                .ok()
            })
            .collect();
        domain::Exercise {
            id: value.id.into(),
            name: value.name,
            name_en: value.name_en,
            full_video_url: value.full_video_url,
            full_video_image_url: value.full_video_image_url,
            attributes,
        }
    }
}

impl From<domain::Exercise> for Exercise {
    fn from(value: domain::Exercise) -> Self {
        Exercise {
            id: value.id.to_string(),
            name: value.name,
            name_en: value.name_en,
            full_video_url: value.full_video_url,
            full_video_image_url: value.full_video_image_url,
            attributes: value
                .attributes
                .into_iter()
                .map(ExerciseAttribute::from)
                .collect(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseAttribute {
    pub attribute_name: AttributeName,
    pub attribute_value: AttributeValue,
}

impl From<domain::ExerciseAttribute> for ExerciseAttribute {
    fn from(value: domain::ExerciseAttribute) -> Self {
        ExerciseAttribute {
            attribute_name: AttributeName {
                name: value.name().to_string(),
            },
            attribute_value: AttributeValue {
                value: value.value().to_string(),
            },
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AttributeName {
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue {
    pub value: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MuscleGroup {
    pub muscle: String,
    pub exercises: Vec<Exercise>,
}

impl TryFrom<MuscleGroup> for domain::MuscleGroup {
    type Error = strum::ParseError;

    fn try_from(value: MuscleGroup) -> Result<Self, Self::Error> {
        let muscle = value
            .muscle
            .parse::<domain::Muscle>()
            .inspect_err(|err| warn!("ignoring exercises of muscle {}: {err}", value.muscle))?;
        Ok(domain::MuscleGroup {
            muscle,
            exercises: value
                .exercises
                .into_iter()
                .map(domain::Exercise::from)
                .collect(),
        })
    }
}

impl From<domain::MuscleGroup> for MuscleGroup {
    fn from(value: domain::MuscleGroup) -> Self {
        MuscleGroup {
            muscle: <&'static str>::from(value.muscle).to_string(),
            exercises: value.exercises.into_iter().map(Exercise::from).collect(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub data: Vec<Exercise>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub equipment: Vec<String>,
    pub muscles: Vec<String>,
    pub exercises: Vec<TemplateExercise>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Template> for domain::Template {
    type Error = domain::NameError;

    fn try_from(value: Template) -> Result<Self, Self::Error> {
        let mut exercises = value
            .exercises
            .into_iter()
            .map(|e| domain::TemplateExercise {
                exercise: e.exercise.into(),
                order: e.order,
            })
            .collect::<Vec<_>>();
        exercises.sort_by_key(|e| e.order);
        Ok(domain::Template {
            id: value.id.into(),
            owner: value.user_id.into(),
            name: domain::Name::new(&value.name)?,
            equipment: parse_all(&value.equipment),
            muscles: parse_all(&value.muscles),
            exercises,
            updated_at: value.updated_at,
        })
    }
}

/// Templates with an invalid name are skipped, so that one bad record does not hide the others.
fn valid_templates(templates: Vec<Template>) -> Vec<domain::Template> {
    templates
        .into_iter()
        .filter_map(|template| {
            let id = template.id;
            domain::Template::try_from(template)
                .inspect_err(|err| warn!("ignoring template {id}: {err}"))
                .ok()
        })
        .collect()
}

impl From<domain::Template> for Template {
    fn from(value: domain::Template) -> Self {
        Template {
            id: *value.id,
            user_id: *value.owner,
            name: value.name.to_string(),
            equipment: value
                .equipment
                .into_iter()
                .map(|e| <&'static str>::from(e).to_string())
                .collect(),
            muscles: value
                .muscles
                .into_iter()
                .map(|m| <&'static str>::from(m).to_string())
                .collect(),
            exercises: value
                .exercises
                .into_iter()
                .map(|e| TemplateExercise {
                    exercise_id: e.exercise.id.to_string(),
                    order: e.order,
                    exercise: e.exercise.into(),
                })
                .collect(),
            updated_at: value.updated_at,
        }
    }
}

fn parse_all<T>(values: &[String]) -> BTreeSet<T>
where
    T: std::str::FromStr + Ord,
{
    values
        .iter()
        .filter_map(|value| {
            let parsed = value.parse().ok();
            if parsed.is_none() {
                warn!("ignoring unknown value {value}");
            }
            parsed
        })
        .collect()
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercise {
    pub exercise_id: String,
    pub order: u32,
    pub exercise: Exercise,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExerciseEntry {
    pub exercise_id: String,
    pub order: u32,
}

impl From<domain::TemplateExerciseEntry> for TemplateExerciseEntry {
    fn from(value: domain::TemplateExerciseEntry) -> Self {
        TemplateExerciseEntry {
            exercise_id: value.exercise_id.to_string(),
            order: value.order,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewTemplate {
    pub name: String,
    pub equipment: Vec<&'static str>,
    pub muscles: Vec<&'static str>,
    pub exercises: Vec<TemplateExerciseEntry>,
}

#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct TemplateChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscles: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<TemplateExerciseEntry>>,
}

impl From<domain::TemplateChanges> for TemplateChanges {
    fn from(value: domain::TemplateChanges) -> Self {
        TemplateChanges {
            name: value.name.map(|name| name.to_string()),
            equipment: value
                .equipment
                .map(|equipment| equipment.into_iter().map(Into::into).collect()),
            muscles: value
                .muscles
                .map(|muscles| muscles.into_iter().map(Into::into).collect()),
            exercises: value.exercises.map(|exercises| {
                exercises
                    .into_iter()
                    .map(TemplateExerciseEntry::from)
                    .collect()
            }),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UnknownExercise {
    exercise_id: String,
}
