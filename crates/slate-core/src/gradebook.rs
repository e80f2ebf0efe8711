//! Grade workflows: access gate → grade recorder → average calculator.
//!
//! These functions are the only way the API touches grades, so the gate is
//! applied uniformly whichever endpoint is used.

use uuid::Uuid;

use crate::{
  Error, Result,
  access::{Caller, Operation, authorize, grade_scope},
  average::mean,
  grade::{Grade, GradeQuery, GradeRecording, GradeValue, NewGrade, StudentGrades},
  store::SchoolStore,
};

/// Convert a backend error into the core taxonomy.
pub fn store_err<E: Into<Error>>(e: E) -> Error { e.into() }

/// A grade as submitted by a teacher, before validation.
#[derive(Debug, Clone, Copy)]
pub struct GradeEntry {
  pub student_id: Uuid,
  pub course_id:  Uuid,
  pub class_id:   Uuid,
  pub value:      f64,
}

/// Record a grade on behalf of `caller`, who must be a teacher.
///
/// The value must lie in `[0, 100]` and the student, course and class must
/// exist. Whether the teacher actually teaches the student is not checked.
pub async fn record_grade<S>(store: &S, caller: &Caller, entry: GradeEntry) -> Result<GradeRecording>
where
  S: SchoolStore,
{
  authorize(caller, Operation::WriteGrade)?;
  let value = GradeValue::new(entry.value)?;

  store
    .get_student(entry.student_id)
    .await
    .map_err(store_err)?
    .ok_or(Error::not_found("student", entry.student_id))?;
  store
    .get_course(entry.course_id)
    .await
    .map_err(store_err)?
    .ok_or(Error::not_found("course", entry.course_id))?;
  store
    .get_class(entry.class_id)
    .await
    .map_err(store_err)?
    .ok_or(Error::not_found("class", entry.class_id))?;

  let recording = store
    .record_grade(NewGrade {
      student_id: entry.student_id,
      teacher_id: caller.id,
      course_id: entry.course_id,
      class_id: entry.class_id,
      value,
    })
    .await
    .map_err(store_err)?;

  tracing::info!(
    student = %entry.student_id,
    course = %entry.course_id,
    teacher = %caller.id,
    value = value.get(),
    average = ?recording.average,
    "grade recorded"
  );

  Ok(recording)
}

/// One student's grades, optionally for a single course, with their mean.
pub async fn student_grades<S>(
  store: &S,
  caller: &Caller,
  student_id: Uuid,
  course_id: Option<Uuid>,
) -> Result<StudentGrades>
where
  S: SchoolStore,
{
  authorize(caller, Operation::ReadStudentGrades { student_id })?;

  store
    .get_student(student_id)
    .await
    .map_err(store_err)?
    .ok_or(Error::not_found("student", student_id))?;

  let grades = store
    .list_grades(GradeQuery { course_id, ..GradeQuery::for_student(student_id) })
    .await
    .map_err(store_err)?;
  let average = mean(grades.iter().map(|g| g.value.get()));

  Ok(StudentGrades { grades, average })
}

/// Grades across students, narrowed to what the caller's role may see.
pub async fn list_grades<S>(store: &S, caller: &Caller, query: GradeQuery) -> Result<Vec<Grade>>
where
  S: SchoolStore,
{
  authorize(caller, Operation::ListGrades)?;
  store
    .list_grades(query.scoped(grade_scope(caller)))
    .await
    .map_err(store_err)
}
