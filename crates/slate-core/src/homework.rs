//! Homework assignments and student submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
  Submitted,
  Late,
}

impl SubmissionStatus {
  /// `Late` strictly after the due date; on time otherwise.
  pub fn at(submitted_at: DateTime<Utc>, due_date: DateTime<Utc>) -> Self {
    if submitted_at > due_date { Self::Late } else { Self::Submitted }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub student_id:   Uuid,
  pub submitted_at: DateTime<Utc>,
  pub status:       SubmissionStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
  pub id:          Uuid,
  pub title:       String,
  pub description: String,
  pub teacher_id:  Uuid,
  pub class_id:    Uuid,
  pub due_date:    DateTime<Utc>,
  pub created_at:  DateTime<Utc>,
  pub submissions: Vec<Submission>,
}

impl Homework {
  pub fn submitted_by(&self, student_id: Uuid) -> bool {
    self.submissions.iter().any(|s| s.student_id == student_id)
  }
}

#[derive(Debug, Clone)]
pub struct NewHomework {
  pub title:       String,
  pub description: String,
  pub teacher_id:  Uuid,
  pub class_id:    Uuid,
  pub due_date:    DateTime<Utc>,
}

/// Every `Some` field must match.
#[derive(Debug, Clone, Default)]
pub struct HomeworkQuery {
  pub teacher_id: Option<Uuid>,
  pub class_id:   Option<Uuid>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  #[test]
  fn late_only_after_due_date() {
    let due = Utc::now();
    assert_eq!(SubmissionStatus::at(due, due), SubmissionStatus::Submitted);
    assert_eq!(SubmissionStatus::at(due - Duration::hours(1), due), SubmissionStatus::Submitted);
    assert_eq!(SubmissionStatus::at(due + Duration::seconds(1), due), SubmissionStatus::Late);
  }
}
