//! Handlers for `/students` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/students` | Optional `?classId`; each student embeds the grades the caller may see |
//! | `POST`   | `/students` | Body: [`CreateBody`]; returns 201 |
//! | `GET`    | `/students/{id}` | Embeds all of the student's grades |
//! | `PUT`    | `/students/{id}` | Body: [`UpdateBody`] |
//! | `DELETE` | `/students/{id}` | 204; grades, badges and submissions go too |
//! | `GET`    | `/students/{id}/grades` | Optional `?courseId`; `{grades, average}` |
//! | `POST`   | `/students/{id}/points` | `{"points": n}` |
//! | `POST`   | `/students/{id}/badges` | `{"badgeId": "..."}` |

use std::{collections::HashMap, sync::Arc};

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use slate_core::{
  access::{Operation, authorize},
  grade::{Grade, GradeQuery, StudentGrades},
  gradebook::{self, store_err},
  store::SchoolStore,
  student::{NewStudent, Student, StudentQuery, StudentUpdate},
};
use uuid::Uuid;

use super::{email, not_found, required};
use crate::{
  auth::{Authenticated, hash_password},
  error::ApiError,
  extract::{Json, Path, Query},
};

/// A student with their grades attached.
#[derive(Debug, Serialize)]
pub struct StudentView {
  #[serde(flatten)]
  pub student: Student,
  pub grades:  Vec<Grade>,
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub class_id: Option<Uuid>,
}

/// `GET /students[?classId=<id>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<StudentView>>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ViewRoster)?;

  let query = params.class_id.map(StudentQuery::in_class).unwrap_or_default();
  let students = store.list_students(query).await.map_err(store_err)?;

  let mut by_student: HashMap<Uuid, Vec<Grade>> = HashMap::new();
  for grade in gradebook::list_grades(&*store, &caller, GradeQuery::default()).await? {
    by_student.entry(grade.student_id).or_default().push(grade);
  }

  let views = students
    .into_iter()
    .map(|student| {
      let grades = by_student.remove(&student.id).unwrap_or_default();
      StudentView { student, grades }
    })
    .collect();
  Ok(Json(views))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub student_no: String,
  pub name:       String,
  pub email:      String,
  pub password:   String,
  pub class_id:   Uuid,
}

/// `POST /students`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ManageRoster)?;

  let input = NewStudent {
    student_no:    required("studentNo", &body.student_no)?,
    name:          required("name", &body.name)?,
    email:         email(&body.email)?,
    password_hash: hash_password(&required("password", &body.password)?)?,
    class_id:      body.class_id,
  };
  store
    .get_class(input.class_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("class", input.class_id))?;

  let student = store.create_student(input).await.map_err(store_err)?;
  tracing::info!(student = %student.id, by = %caller.id, "student created");
  Ok((StatusCode::CREATED, Json(student)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /students/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<StudentView>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ViewStudent { student_id: id })?;

  let student = store
    .get_student(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("student", id))?;
  let grades = store.list_grades(GradeQuery::for_student(id)).await.map_err(store_err)?;
  Ok(Json(StudentView { student, grades }))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub student_no: String,
  pub name:       String,
  pub email:      String,
  pub class_id:   Uuid,
}

/// `PUT /students/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Student>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::UpdateStudent)?;

  let update = StudentUpdate {
    student_no: required("studentNo", &body.student_no)?,
    name:       required("name", &body.name)?,
    email:      email(&body.email)?,
    class_id:   body.class_id,
  };
  store
    .get_class(update.class_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("class", update.class_id))?;

  let student = store
    .update_student(id, update)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("student", id))?;
  Ok(Json(student))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /students/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::DeleteRoster)?;

  if !store.delete_student(id).await.map_err(store_err)? {
    return Err(not_found("student", id));
  }
  tracing::info!(student = %id, by = %caller.id, "student deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Grades ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeParams {
  pub course_id: Option<Uuid>,
}

/// `GET /students/{id}/grades[?courseId=<id>]`
pub async fn grades<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
  Query(params): Query<GradeParams>,
) -> Result<Json<StudentGrades>, ApiError>
where
  S: SchoolStore + 'static,
{
  let grades = gradebook::student_grades(&*store, &caller, id, params.course_id).await?;
  Ok(Json(grades))
}

// ─── Points and badges ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PointsBody {
  pub points: i64,
}

/// `POST /students/{id}/points` — adds `points`, which may be negative.
pub async fn add_points<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<PointsBody>,
) -> Result<Json<Student>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::AwardStudent)?;

  let student = store
    .add_points(id, body.points)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("student", id))?;
  tracing::info!(student = %id, delta = body.points, total = student.points, "points awarded");
  Ok(Json(student))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeBody {
  pub badge_id: Uuid,
}

/// `POST /students/{id}/badges`
pub async fn award_badge<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<BadgeBody>,
) -> Result<Json<Student>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::AwardStudent)?;

  store
    .get_badge(body.badge_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("badge", body.badge_id))?;
  let student = store
    .award_badge(id, body.badge_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("student", id))?;
  tracing::info!(student = %id, badge = %body.badge_id, "badge awarded");
  Ok(Json(student))
}
