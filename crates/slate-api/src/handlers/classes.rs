//! Handlers for `/classes` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/classes` | Highest grade first, then by section |
//! | `POST`   | `/classes` | Body: `{"grade": 9, "section": "b"}`; returns 201 |
//! | `GET`    | `/classes/{id}` | |
//! | `PUT`    | `/classes/{id}` | Same body as `POST` |
//! | `DELETE` | `/classes/{id}` | 204; 409 while students are enrolled |
//! | `GET`    | `/classes/{id}/averages` | Per-course mean of the students' course averages |

use std::{collections::BTreeMap, sync::Arc};

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use slate_core::{
  access::{Operation, authorize},
  average::class_course_averages,
  gradebook::store_err,
  school::{Class, NewClass},
  store::SchoolStore,
  student::StudentQuery,
};
use uuid::Uuid;

use super::not_found;
use crate::{
  auth::Authenticated,
  error::ApiError,
  extract::{Json, Path},
};

#[derive(Debug, Deserialize)]
pub struct ClassBody {
  pub grade:   u8,
  pub section: String,
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /classes`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<Vec<Class>>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ViewCatalogue)?;
  Ok(Json(store.list_classes().await.map_err(store_err)?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /classes`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Json(body): Json<ClassBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ManageRoster)?;
  let input = NewClass::normalized(body.grade, &body.section)?;
  let class = store.create_class(input).await.map_err(store_err)?;
  tracing::info!(class = %class.id, name = %class.name, "class created");
  Ok((StatusCode::CREATED, Json(class)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /classes/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Class>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ViewCatalogue)?;
  let class = store
    .get_class(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("class", id))?;
  Ok(Json(class))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /classes/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<ClassBody>,
) -> Result<Json<Class>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ManageRoster)?;
  let input = NewClass::normalized(body.grade, &body.section)?;
  let class = store
    .update_class(id, input)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("class", id))?;
  Ok(Json(class))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /classes/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::DeleteRoster)?;
  if !store.delete_class(id).await.map_err(store_err)? {
    return Err(not_found("class", id));
  }
  tracing::info!(class = %id, by = %caller.id, "class deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Averages ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAverages {
  pub class_id: Uuid,
  /// Course id → mean of the students' averages in that course.
  pub averages: BTreeMap<Uuid, f64>,
}

/// `GET /classes/{id}/averages`
pub async fn averages<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<ClassAverages>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ViewRoster)?;
  store
    .get_class(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("class", id))?;

  let students = store.list_students(StudentQuery::in_class(id)).await.map_err(store_err)?;
  Ok(Json(ClassAverages { class_id: id, averages: class_course_averages(&students) }))
}
