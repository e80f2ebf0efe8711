//! Access gate — decides whether a caller may perform an operation.
//!
//! Every role is a closed variant and every rule is an exhaustive match, so
//! adding a role or an operation is a compile error until the table below is
//! extended.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Roles ───────────────────────────────────────────────────────────────────

/// The role an authenticated caller acts under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Manager,
  Teacher,
  Student,
}

impl Role {
  /// Landing page a client should route this role to after sign-in.
  pub fn dashboard_path(self) -> &'static str {
    match self {
      Role::Admin | Role::Manager => "/admin/dashboard",
      Role::Teacher => "/teacher/dashboard",
      Role::Student => "/student/dashboard",
    }
  }
}

/// An authenticated principal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
  pub id:   Uuid,
  pub role: Role,
  pub name: String,
}

/// A stored login, resolved by the credential lookup before password
/// verification.
#[derive(Debug, Clone)]
pub struct Credential {
  pub id:            Uuid,
  pub role:          Role,
  pub name:          String,
  /// PHC string produced by argon2.
  pub password_hash: String,
}

impl Credential {
  pub fn into_caller(self) -> Caller {
    Caller { id: self.id, role: self.role, name: self.name }
  }
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// Everything the gate knows how to rule on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  /// Read the grades of one student.
  ReadStudentGrades { student_id: Uuid },
  /// List grades across students; narrowed by [`grade_scope`].
  ListGrades,
  WriteGrade,
  ViewStudent { student_id: Uuid },
  /// List students and teachers, look up class averages.
  ViewRoster,
  /// Create or update students, teachers, classes and courses.
  ManageRoster,
  UpdateStudent,
  DeleteRoster,
  ManageAdmins,
  DefineBadges,
  /// Award points or badges to a student.
  AwardStudent,
  /// Classes, courses and badges.
  ViewCatalogue,
  TeacherSelfService,
  StudentSelfService,
}

/// Rule on `op` for `caller`. Fails with [`Error::Unauthorized`].
pub fn authorize(caller: &Caller, op: Operation) -> Result<()> {
  let allowed = match op {
    Operation::ReadStudentGrades { student_id }
    | Operation::ViewStudent { student_id } => match caller.role {
      Role::Admin | Role::Manager | Role::Teacher => true,
      Role::Student => caller.id == student_id,
    },
    Operation::ListGrades | Operation::ViewCatalogue => match caller.role {
      Role::Admin | Role::Manager | Role::Teacher | Role::Student => true,
    },
    Operation::WriteGrade | Operation::TeacherSelfService => match caller.role {
      Role::Teacher => true,
      Role::Admin | Role::Manager | Role::Student => false,
    },
    Operation::ViewRoster
    | Operation::UpdateStudent
    | Operation::AwardStudent => match caller.role {
      Role::Admin | Role::Manager | Role::Teacher => true,
      Role::Student => false,
    },
    Operation::ManageRoster => match caller.role {
      Role::Admin | Role::Manager => true,
      Role::Teacher | Role::Student => false,
    },
    Operation::DeleteRoster
    | Operation::ManageAdmins
    | Operation::DefineBadges => match caller.role {
      Role::Admin => true,
      Role::Manager | Role::Teacher | Role::Student => false,
    },
    Operation::StudentSelfService => match caller.role {
      Role::Student => true,
      Role::Admin | Role::Manager | Role::Teacher => false,
    },
  };

  if allowed {
    Ok(())
  } else {
    tracing::debug!(caller = %caller.id, role = ?caller.role, ?op, "access denied");
    Err(Error::Unauthorized)
  }
}

// ─── Grade scope ─────────────────────────────────────────────────────────────

/// Which grade rows a caller may see when listing across students.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeScope {
  All,
  /// Only grades this teacher recorded.
  Teacher(Uuid),
  /// Only this student's own grades.
  Student(Uuid),
}

pub fn grade_scope(caller: &Caller) -> GradeScope {
  match caller.role {
    Role::Admin | Role::Manager => GradeScope::All,
    Role::Teacher => GradeScope::Teacher(caller.id),
    Role::Student => GradeScope::Student(caller.id),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn caller(role: Role) -> Caller {
    Caller { id: Uuid::new_v4(), role, name: "someone".into() }
  }

  #[test]
  fn student_reads_own_grades() {
    let me = caller(Role::Student);
    let op = Operation::ReadStudentGrades { student_id: me.id };
    assert!(authorize(&me, op).is_ok());
  }

  #[test]
  fn student_reading_another_student_is_unauthorized() {
    let me = caller(Role::Student);
    let op = Operation::ReadStudentGrades { student_id: Uuid::new_v4() };
    assert!(matches!(authorize(&me, op), Err(Error::Unauthorized)));
  }

  #[test]
  fn staff_read_any_students_grades() {
    let other = Uuid::new_v4();
    for role in [Role::Admin, Role::Manager, Role::Teacher] {
      let op = Operation::ReadStudentGrades { student_id: other };
      assert!(authorize(&caller(role), op).is_ok(), "{role:?}");
    }
  }

  #[test]
  fn only_teachers_write_grades() {
    assert!(authorize(&caller(Role::Teacher), Operation::WriteGrade).is_ok());
    for role in [Role::Admin, Role::Manager, Role::Student] {
      assert!(
        matches!(authorize(&caller(role), Operation::WriteGrade), Err(Error::Unauthorized)),
        "{role:?} must not write grades"
      );
    }
  }

  #[test]
  fn managers_cannot_delete_or_manage_admins() {
    let m = caller(Role::Manager);
    assert!(authorize(&m, Operation::ManageRoster).is_ok());
    assert!(authorize(&m, Operation::DeleteRoster).is_err());
    assert!(authorize(&m, Operation::ManageAdmins).is_err());
    assert!(authorize(&m, Operation::DefineBadges).is_err());
  }

  #[test]
  fn self_service_is_role_exclusive() {
    assert!(authorize(&caller(Role::Teacher), Operation::TeacherSelfService).is_ok());
    assert!(authorize(&caller(Role::Admin), Operation::TeacherSelfService).is_err());
    assert!(authorize(&caller(Role::Student), Operation::StudentSelfService).is_ok());
    assert!(authorize(&caller(Role::Teacher), Operation::StudentSelfService).is_err());
  }

  #[test]
  fn grade_scope_narrows_by_role() {
    let t = caller(Role::Teacher);
    let s = caller(Role::Student);
    assert_eq!(grade_scope(&caller(Role::Admin)), GradeScope::All);
    assert_eq!(grade_scope(&caller(Role::Manager)), GradeScope::All);
    assert_eq!(grade_scope(&t), GradeScope::Teacher(t.id));
    assert_eq!(grade_scope(&s), GradeScope::Student(s.id));
  }

  #[test]
  fn dashboards() {
    assert_eq!(Role::Manager.dashboard_path(), "/admin/dashboard");
    assert_eq!(Role::Student.dashboard_path(), "/student/dashboard");
  }
}
