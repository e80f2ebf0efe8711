//! Teacher self-service under `/teacher`. The caller must be a teacher and
//! everything is resolved from their own record.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/teacher/classes` | Each with `studentCount` |
//! | `GET`  | `/teacher/students` | Students of the teacher's classes, with `className` |
//! | `GET`  | `/teacher/course` | `{courseId}` |
//! | `GET`  | `/teacher/dashboard` | `{classCount, studentCount, homeworkCount}` |
//! | `GET`  | `/teacher/homework` | Homework the teacher set |
//! | `POST` | `/teacher/homework` | Body: [`HomeworkBody`]; returns 201 |

use std::{collections::HashMap, sync::Arc};

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slate_core::{
  access::{Caller, Operation, authorize},
  gradebook::store_err,
  homework::{Homework, HomeworkQuery, NewHomework},
  school::Class,
  staff::Teacher,
  store::SchoolStore,
  student::{Student, StudentQuery},
};
use uuid::Uuid;

use super::{not_found, required, teachers::classes_of};
use crate::{auth::Authenticated, error::ApiError, extract::Json};

async fn me<S: SchoolStore>(store: &S, caller: &Caller) -> Result<Teacher, ApiError> {
  authorize(caller, Operation::TeacherSelfService)?;
  store
    .get_teacher(caller.id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("teacher", caller.id))
}

// ─── Classes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
  #[serde(flatten)]
  pub class:         Class,
  pub student_count: usize,
}

/// `GET /teacher/classes`
pub async fn classes<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<Vec<ClassSummary>>, ApiError>
where
  S: SchoolStore + 'static,
{
  let teacher = me(&*store, &caller).await?;
  let mut summaries = Vec::new();
  for class in classes_of(&*store, &teacher).await? {
    let student_count = store.count_students(vec![class.id]).await.map_err(store_err)?;
    summaries.push(ClassSummary { class, student_count });
  }
  Ok(Json(summaries))
}

// ─── Students ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassmateView {
  #[serde(flatten)]
  pub student:    Student,
  pub class_name: String,
}

/// `GET /teacher/students`
pub async fn students<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<Vec<ClassmateView>>, ApiError>
where
  S: SchoolStore + 'static,
{
  let teacher = me(&*store, &caller).await?;
  let names: HashMap<Uuid, String> = classes_of(&*store, &teacher)
    .await?
    .into_iter()
    .map(|c| (c.id, c.name))
    .collect();
  if names.is_empty() {
    return Ok(Json(Vec::new()));
  }

  let students = store
    .list_students(StudentQuery { class_ids: names.keys().copied().collect() })
    .await
    .map_err(store_err)?;
  let views = students
    .into_iter()
    .map(|student| ClassmateView {
      class_name: names.get(&student.class_id).cloned().unwrap_or_default(),
      student,
    })
    .collect();
  Ok(Json(views))
}

// ─── Course ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedCourse {
  pub course_id: Option<Uuid>,
}

/// `GET /teacher/course`
pub async fn course<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<AssignedCourse>, ApiError>
where
  S: SchoolStore + 'static,
{
  let teacher = me(&*store, &caller).await?;
  Ok(Json(AssignedCourse { course_id: teacher.course_id }))
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
  pub class_count:    usize,
  pub student_count:  usize,
  pub homework_count: usize,
}

/// `GET /teacher/dashboard`
pub async fn dashboard<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<Dashboard>, ApiError>
where
  S: SchoolStore + 'static,
{
  let teacher = me(&*store, &caller).await?;
  let classes = classes_of(&*store, &teacher).await?;
  let student_count = store
    .count_students(classes.iter().map(|c| c.id).collect())
    .await
    .map_err(store_err)?;
  let homework = store
    .list_homework(HomeworkQuery { teacher_id: Some(teacher.id), ..Default::default() })
    .await
    .map_err(store_err)?;

  Ok(Json(Dashboard {
    class_count: classes.len(),
    student_count,
    homework_count: homework.len(),
  }))
}

// ─── Homework ─────────────────────────────────────────────────────────────────

/// `GET /teacher/homework`
pub async fn homework<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<Vec<Homework>>, ApiError>
where
  S: SchoolStore + 'static,
{
  let teacher = me(&*store, &caller).await?;
  let homework = store
    .list_homework(HomeworkQuery { teacher_id: Some(teacher.id), ..Default::default() })
    .await
    .map_err(store_err)?;
  Ok(Json(homework))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkBody {
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub class_id:    Uuid,
  pub due_date:    DateTime<Utc>,
}

/// `POST /teacher/homework` — the class must be one of the teacher's.
pub async fn create_homework<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Json(body): Json<HomeworkBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SchoolStore + 'static,
{
  let teacher = me(&*store, &caller).await?;
  let title = required("title", &body.title)?;
  if !teacher.class_ids.contains(&body.class_id) {
    return Err(ApiError::Validation(format!(
      "class {} is not assigned to this teacher",
      body.class_id
    )));
  }
  store
    .get_class(body.class_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("class", body.class_id))?;

  let homework = store
    .create_homework(NewHomework {
      title,
      description: body.description.trim().to_string(),
      teacher_id: teacher.id,
      class_id: body.class_id,
      due_date: body.due_date,
    })
    .await
    .map_err(store_err)?;
  tracing::info!(homework = %homework.id, class = %homework.class_id, "homework set");
  Ok((StatusCode::CREATED, Json(homework)))
}
