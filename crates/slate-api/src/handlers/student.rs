//! Student self-service under `/student`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/student/courses` | Courses of the student's class with their own `average` |
//! | `GET`  | `/student/homework` | Homework of the student's class with `submitted` |
//! | `POST` | `/student/homework/{id}/submit` | 201; 409 on a second submission |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use slate_core::{
  access::{Caller, Operation, authorize},
  gradebook::store_err,
  homework::{HomeworkQuery, SubmissionStatus},
  school::Course,
  store::SchoolStore,
  student::Student,
};
use uuid::Uuid;

use super::not_found;
use crate::{
  auth::Authenticated,
  error::ApiError,
  extract::{Json, Path},
};

async fn me<S: SchoolStore>(store: &S, caller: &Caller) -> Result<Student, ApiError> {
  authorize(caller, Operation::StudentSelfService)?;
  store
    .get_student(caller.id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("student", caller.id))
}

// ─── Courses ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MyCourse {
  #[serde(flatten)]
  pub course:  Course,
  /// `null` until the student has a grade in the course.
  pub average: Option<f64>,
}

/// `GET /student/courses`
pub async fn courses<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<Vec<MyCourse>>, ApiError>
where
  S: SchoolStore + 'static,
{
  let student = me(&*store, &caller).await?;
  let courses = store
    .list_courses(Some(student.class_id))
    .await
    .map_err(store_err)?
    .into_iter()
    .map(|course| MyCourse {
      average: student.grade_averages.get(&course.id).copied(),
      course,
    })
    .collect();
  Ok(Json(courses))
}

// ─── Homework ─────────────────────────────────────────────────────────────────

/// One assignment as its student sees it; other students' submissions are
/// left out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyHomework {
  pub id:          Uuid,
  pub title:       String,
  pub description: String,
  pub teacher_id:  Uuid,
  pub due_date:    DateTime<Utc>,
  pub submitted:   bool,
  pub status:      Option<SubmissionStatus>,
}

/// `GET /student/homework`
pub async fn homework<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<Vec<MyHomework>>, ApiError>
where
  S: SchoolStore + 'static,
{
  let student = me(&*store, &caller).await?;
  let homework = store
    .list_homework(HomeworkQuery { class_id: Some(student.class_id), ..Default::default() })
    .await
    .map_err(store_err)?;

  let views = homework
    .into_iter()
    .map(|hw| {
      let status = hw
        .submissions
        .iter()
        .find(|s| s.student_id == student.id)
        .map(|s| s.status);
      MyHomework {
        id:          hw.id,
        title:       hw.title,
        description: hw.description,
        teacher_id:  hw.teacher_id,
        due_date:    hw.due_date,
        submitted:   status.is_some(),
        status,
      }
    })
    .collect();
  Ok(Json(views))
}

/// `POST /student/homework/{id}/submit`
pub async fn submit<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SchoolStore + 'static,
{
  let student = me(&*store, &caller).await?;
  let homework = store
    .get_homework(id)
    .await
    .map_err(store_err)?
    .filter(|hw| hw.class_id == student.class_id)
    .ok_or_else(|| not_found("homework", id))?;

  let submission = store
    .submit_homework(homework.id, student.id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("homework", id))?;
  tracing::info!(homework = %id, student = %student.id, status = ?submission.status, "homework submitted");
  Ok((StatusCode::CREATED, Json(submission)))
}
