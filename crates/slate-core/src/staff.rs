//! Teachers and administrators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Role;

// ─── Teachers ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
  pub id:            Uuid,
  pub name:          String,
  /// Login; unique.
  pub email:         String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  /// The course this teacher teaches, if assigned.
  pub course_id:     Option<Uuid>,
  pub class_ids:     Vec<Uuid>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTeacher {
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub course_id:     Option<Uuid>,
  pub class_ids:     Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct TeacherUpdate {
  pub name:      String,
  pub email:     String,
  pub course_id: Option<Uuid>,
  pub class_ids: Vec<Uuid>,
}

// ─── Administrators ──────────────────────────────────────────────────────────

/// Privilege level of an administrator account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
  Super,
  #[default]
  Manager,
}

impl AdminLevel {
  /// The role an account of this level signs in with.
  pub fn role(self) -> Role {
    match self {
      AdminLevel::Super => Role::Admin,
      AdminLevel::Manager => Role::Manager,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
  pub id:            Uuid,
  pub username:      String,
  pub email:         String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub level:         AdminLevel,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub level:         AdminLevel,
}

#[derive(Debug, Clone)]
pub struct AdminUpdate {
  pub username: String,
  pub email:    String,
  pub level:    AdminLevel,
}
