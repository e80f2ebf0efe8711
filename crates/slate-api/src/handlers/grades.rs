//! Handlers for `/grades` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/grades` | Optional `?classId`, `?courseId`, `?studentId`; narrowed to the caller's scope |
//! | `POST` | `/grades` | Teachers only. Body: [`GradeBody`]; returns 201 `{newGrade, grades, average}` |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use slate_core::{
  grade::{Grade, GradeQuery},
  gradebook::{self, GradeEntry},
  store::SchoolStore,
};
use uuid::Uuid;

use crate::{
  auth::Authenticated,
  error::ApiError,
  extract::{Json, Query},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub class_id:   Option<Uuid>,
  pub course_id:  Option<Uuid>,
  pub student_id: Option<Uuid>,
}

/// `GET /grades`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Grade>>, ApiError>
where
  S: SchoolStore + 'static,
{
  let query = GradeQuery {
    student_id: params.student_id,
    teacher_id: None,
    course_id:  params.course_id,
    class_id:   params.class_id,
  };
  Ok(Json(gradebook::list_grades(&*store, &caller, query).await?))
}

/// JSON body accepted by `POST /grades`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBody {
  pub student_id: Uuid,
  pub course_id:  Uuid,
  pub class_id:   Uuid,
  pub value:      f64,
}

/// `POST /grades`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Json(body): Json<GradeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SchoolStore + 'static,
{
  let entry = GradeEntry {
    student_id: body.student_id,
    course_id:  body.course_id,
    class_id:   body.class_id,
    value:      body.value,
  };
  let recording = gradebook::record_grade(&*store, &caller, entry).await?;
  Ok((StatusCode::CREATED, Json(recording)))
}
