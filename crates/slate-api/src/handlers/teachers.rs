//! Handlers for `/teachers` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/teachers` | |
//! | `POST`   | `/teachers` | Body: [`CreateBody`]; returns 201 |
//! | `GET`    | `/teachers/{id}` | |
//! | `PUT`    | `/teachers/{id}` | Body: [`UpdateBody`] |
//! | `DELETE` | `/teachers/{id}` | 204 |
//! | `GET`    | `/teachers/{id}/classes` | The classes the teacher is assigned to |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use slate_core::{
  access::{Operation, authorize},
  gradebook::store_err,
  school::Class,
  staff::{NewTeacher, Teacher, TeacherUpdate},
  store::SchoolStore,
};
use uuid::Uuid;

use super::{email, not_found, required};
use crate::{
  auth::{Authenticated, hash_password},
  error::ApiError,
  extract::{Json, Path},
};

/// Reject references to a course or classes that do not exist.
async fn check_assignment<S>(
  store: &S,
  course_id: Option<Uuid>,
  class_ids: &[Uuid],
) -> Result<(), ApiError>
where
  S: SchoolStore,
{
  if let Some(course_id) = course_id {
    store
      .get_course(course_id)
      .await
      .map_err(store_err)?
      .ok_or_else(|| not_found("course", course_id))?;
  }
  for &class_id in class_ids {
    store
      .get_class(class_id)
      .await
      .map_err(store_err)?
      .ok_or_else(|| not_found("class", class_id))?;
  }
  Ok(())
}

/// Resolve a teacher's class ids, skipping any that have since been deleted.
pub(crate) async fn classes_of<S>(store: &S, teacher: &Teacher) -> Result<Vec<Class>, ApiError>
where
  S: SchoolStore,
{
  let mut classes = Vec::with_capacity(teacher.class_ids.len());
  for &class_id in &teacher.class_ids {
    if let Some(class) = store.get_class(class_id).await.map_err(store_err)? {
      classes.push(class);
    }
  }
  Ok(classes)
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /teachers`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<Vec<Teacher>>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ViewRoster)?;
  let teachers = store.list_teachers().await.map_err(store_err)?;
  Ok(Json(teachers))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub name:      String,
  pub email:     String,
  pub password:  String,
  pub course_id: Option<Uuid>,
  #[serde(default)]
  pub class_ids: Vec<Uuid>,
}

/// `POST /teachers`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ManageRoster)?;

  let input = NewTeacher {
    name:          required("name", &body.name)?,
    email:         email(&body.email)?,
    password_hash: hash_password(&required("password", &body.password)?)?,
    course_id:     body.course_id,
    class_ids:     body.class_ids,
  };
  check_assignment(&*store, input.course_id, &input.class_ids).await?;

  let teacher = store.create_teacher(input).await.map_err(store_err)?;
  tracing::info!(teacher = %teacher.id, by = %caller.id, "teacher created");
  Ok((StatusCode::CREATED, Json(teacher)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /teachers/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Teacher>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ViewRoster)?;
  let teacher = store
    .get_teacher(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("teacher", id))?;
  Ok(Json(teacher))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub name:      String,
  pub email:     String,
  pub course_id: Option<Uuid>,
  #[serde(default)]
  pub class_ids: Vec<Uuid>,
}

/// `PUT /teachers/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Teacher>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ManageRoster)?;

  let update = TeacherUpdate {
    name:      required("name", &body.name)?,
    email:     email(&body.email)?,
    course_id: body.course_id,
    class_ids: body.class_ids,
  };
  check_assignment(&*store, update.course_id, &update.class_ids).await?;

  let teacher = store
    .update_teacher(id, update)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("teacher", id))?;
  Ok(Json(teacher))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /teachers/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::DeleteRoster)?;
  if !store.delete_teacher(id).await.map_err(store_err)? {
    return Err(not_found("teacher", id));
  }
  tracing::info!(teacher = %id, by = %caller.id, "teacher deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Classes ──────────────────────────────────────────────────────────────────

/// `GET /teachers/{id}/classes`
pub async fn classes<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Class>>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ViewRoster)?;
  let teacher = store
    .get_teacher(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("teacher", id))?;
  Ok(Json(classes_of(&*store, &teacher).await?))
}
