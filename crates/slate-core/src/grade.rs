//! Grade types — one scored observation for a student in a course.
//!
//! Grades are immutable. A correction is a new grade; averages treat every
//! stored grade for a pair as data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, access::GradeScope};

pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 100.0;

/// A score in `[0, 100]`. Construction is the only validation point.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct GradeValue(f64);

impl GradeValue {
  pub fn new(value: f64) -> Result<Self> {
    if value.is_finite() && (MIN_GRADE..=MAX_GRADE).contains(&value) {
      Ok(Self(value))
    } else {
      Err(Error::Validation(format!(
        "grade value must be between {MIN_GRADE} and {MAX_GRADE}, got {value}"
      )))
    }
  }

  pub fn get(self) -> f64 { self.0 }
}

impl TryFrom<f64> for GradeValue {
  type Error = Error;

  fn try_from(value: f64) -> Result<Self> { Self::new(value) }
}

impl From<GradeValue> for f64 {
  fn from(v: GradeValue) -> Self { v.0 }
}

/// A persisted grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
  pub id:         Uuid,
  pub student_id: Uuid,
  pub teacher_id: Uuid,
  pub course_id:  Uuid,
  pub class_id:   Uuid,
  pub value:      GradeValue,
  /// Server-assigned at insert.
  pub date:       DateTime<Utc>,
}

/// Input to [`SchoolStore::record_grade`](crate::store::SchoolStore::record_grade).
#[derive(Debug, Clone)]
pub struct NewGrade {
  pub student_id: Uuid,
  pub teacher_id: Uuid,
  pub course_id:  Uuid,
  pub class_id:   Uuid,
  pub value:      GradeValue,
}

/// Result of recording a grade: the new row, every grade of the
/// `(student, course)` pair after the insert, and the pair's new mean.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecording {
  pub new_grade: Grade,
  pub grades:    Vec<Grade>,
  pub average:   Option<f64>,
}

/// A set of grades with their mean; `average` is `None` when empty.
#[derive(Debug, Clone, Serialize)]
pub struct StudentGrades {
  pub grades:  Vec<Grade>,
  pub average: Option<f64>,
}

/// Filter for [`SchoolStore::list_grades`](crate::store::SchoolStore::list_grades).
/// Every `Some` field must match.
#[derive(Debug, Clone, Default)]
pub struct GradeQuery {
  pub student_id: Option<Uuid>,
  pub teacher_id: Option<Uuid>,
  pub course_id:  Option<Uuid>,
  pub class_id:   Option<Uuid>,
}

impl GradeQuery {
  pub fn for_student(student_id: Uuid) -> Self {
    Self { student_id: Some(student_id), ..Self::default() }
  }

  /// Narrow the query to what `scope` allows.
  pub fn scoped(mut self, scope: GradeScope) -> Self {
    match scope {
      GradeScope::All => {}
      GradeScope::Teacher(id) => self.teacher_id = Some(id),
      GradeScope::Student(id) => self.student_id = Some(id),
    }
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_bounds() {
    assert_eq!(GradeValue::new(0.0).unwrap().get(), 0.0);
    assert_eq!(GradeValue::new(100.0).unwrap().get(), 100.0);
    assert_eq!(GradeValue::new(72.5).unwrap().get(), 72.5);
  }

  #[test]
  fn rejects_out_of_range() {
    for v in [-1.0, 100.5, f64::NAN, f64::INFINITY] {
      assert!(matches!(GradeValue::new(v), Err(Error::Validation(_))), "{v}");
    }
  }

  #[test]
  fn scope_overrides_student_filter() {
    let me = Uuid::new_v4();
    let q = GradeQuery::for_student(Uuid::new_v4()).scoped(GradeScope::Student(me));
    assert_eq!(q.student_id, Some(me));

    let t = Uuid::new_v4();
    let q = GradeQuery::default().scoped(GradeScope::Teacher(t));
    assert_eq!(q.teacher_id, Some(t));
    assert_eq!(q.student_id, None);
  }
}
