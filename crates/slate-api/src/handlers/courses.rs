//! Handlers for `/courses` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/courses` | Optional `?classId` |
//! | `POST`   | `/courses` | Body: `{"name": "...", "classIds": [...]}`; returns 201 |
//! | `GET`    | `/courses/{id}` | |
//! | `PUT`    | `/courses/{id}` | Same body as `POST` |
//! | `DELETE` | `/courses/{id}` | 204 |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use slate_core::{
  access::{Operation, authorize},
  gradebook::store_err,
  school::{Course, NewCourse},
  store::SchoolStore,
};
use uuid::Uuid;

use super::{not_found, required};
use crate::{
  auth::Authenticated,
  error::ApiError,
  extract::{Json, Path, Query},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseBody {
  pub name:      String,
  #[serde(default)]
  pub class_ids: Vec<Uuid>,
}

impl CourseBody {
  async fn validate<S: SchoolStore>(self, store: &S) -> Result<NewCourse, ApiError> {
    let name = required("name", &self.name)?;
    for &class_id in &self.class_ids {
      store
        .get_class(class_id)
        .await
        .map_err(store_err)?
        .ok_or_else(|| not_found("class", class_id))?;
    }
    Ok(NewCourse { name, class_ids: self.class_ids })
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub class_id: Option<Uuid>,
}

/// `GET /courses[?classId=<id>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Course>>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ViewCatalogue)?;
  Ok(Json(store.list_courses(params.class_id).await.map_err(store_err)?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /courses`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Json(body): Json<CourseBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ManageRoster)?;
  let input = body.validate(&*store).await?;
  let course = store.create_course(input).await.map_err(store_err)?;
  tracing::info!(course = %course.id, name = %course.name, "course created");
  Ok((StatusCode::CREATED, Json(course)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /courses/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Course>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ViewCatalogue)?;
  let course = store
    .get_course(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("course", id))?;
  Ok(Json(course))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /courses/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<CourseBody>,
) -> Result<Json<Course>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ManageRoster)?;
  let input = body.validate(&*store).await?;
  let course = store
    .update_course(id, input)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("course", id))?;
  Ok(Json(course))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /courses/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::DeleteRoster)?;
  if !store.delete_course(id).await.map_err(store_err)? {
    return Err(not_found("course", id));
  }
  tracing::info!(course = %id, by = %caller.id, "course deleted");
  Ok(StatusCode::NO_CONTENT)
}
