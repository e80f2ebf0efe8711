//! Students and their derived grade averages.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A student record. `grade_averages` and `overall_average` are derived and
/// rewritten by the store on every grade insert for the student.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
  pub id:              Uuid,
  /// School-issued number; unique.
  pub student_no:      String,
  pub name:            String,
  /// Login; unique.
  pub email:           String,
  #[serde(skip_serializing)]
  pub password_hash:   String,
  pub class_id:        Uuid,
  /// Course id → mean of that course's grade values.
  pub grade_averages:  BTreeMap<Uuid, f64>,
  /// Mean over all grade values; `None` until the first grade.
  pub overall_average: Option<f64>,
  pub points:          i64,
  pub badges:          BTreeSet<Uuid>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
  pub student_no:    String,
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub class_id:      Uuid,
}

/// Editable fields. Password and derived fields are not editable here.
#[derive(Debug, Clone)]
pub struct StudentUpdate {
  pub student_no: String,
  pub name:       String,
  pub email:      String,
  pub class_id:   Uuid,
}

/// Filter for listing students; an empty `class_ids` means all classes.
#[derive(Debug, Clone, Default)]
pub struct StudentQuery {
  pub class_ids: Vec<Uuid>,
}

impl StudentQuery {
  pub fn in_class(class_id: Uuid) -> Self { Self { class_ids: vec![class_id] } }
}
