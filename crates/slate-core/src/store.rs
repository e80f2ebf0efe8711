//! The `SchoolStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `slate-store-sqlite`).
//! Higher layers (`slate-api`, `slate-server`) depend on this abstraction,
//! not on any concrete backend.
//!
//! Lookups return `Option` for a missing id; updates return `Option` of the
//! updated record; deletes return whether a row was removed. Uniqueness
//! violations surface as an error that converts to [`Error::Conflict`].

use std::future::Future;

use uuid::Uuid;

use crate::{
  Error,
  access::Credential,
  gamification::{Badge, NewBadge},
  grade::{Grade, GradeQuery, GradeRecording, NewGrade},
  homework::{Homework, HomeworkQuery, NewHomework, Submission},
  school::{Class, Course, NewClass, NewCourse},
  staff::{Admin, AdminLevel, AdminUpdate, NewAdmin, NewTeacher, Teacher, TeacherUpdate},
  student::{NewStudent, Student, StudentQuery, StudentUpdate},
};

/// Abstraction over a Slate storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SchoolStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<Error>;

  // ── Credentials ───────────────────────────────────────────────────────

  /// Resolve a login to a stored credential. Admins are matched by username
  /// or email (case-insensitive), then teachers by email, then students by
  /// email. The first match wins.
  fn find_credential(
    &self,
    login: String,
  ) -> impl Future<Output = Result<Option<Credential>, Self::Error>> + Send + '_;

  // ── Administrators ────────────────────────────────────────────────────

  fn create_admin(
    &self,
    input: NewAdmin,
  ) -> impl Future<Output = Result<Admin, Self::Error>> + Send + '_;

  fn list_admins(&self) -> impl Future<Output = Result<Vec<Admin>, Self::Error>> + Send + '_;

  /// Fails with [`Error::Conflict`] when the update
  /// would demote the last super admin; the check and the write are atomic.
  fn update_admin(
    &self,
    id: Uuid,
    update: AdminUpdate,
  ) -> impl Future<Output = Result<Option<Admin>, Self::Error>> + Send + '_;

  /// Fails with [`Error::Conflict`] for the last
  /// super admin.
  fn delete_admin(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Count admin accounts, optionally of one level only.
  fn count_admins(
    &self,
    level: Option<AdminLevel>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Students ──────────────────────────────────────────────────────────

  fn create_student(
    &self,
    input: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  fn get_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  fn list_students(
    &self,
    query: StudentQuery,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  fn update_student(
    &self,
    id: Uuid,
    update: StudentUpdate,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Delete a student together with their grades, averages, badges and
  /// homework submissions.
  fn delete_student(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Atomically add `delta` (possibly negative) to the student's points.
  /// A total outside `i64` is a [`Error::Validation`]
  /// and leaves the points unchanged.
  fn add_points(
    &self,
    id: Uuid,
    delta: i64,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Add a badge to the student's set. Awarding a badge twice is a no-op.
  fn award_badge(
    &self,
    id: Uuid,
    badge_id: Uuid,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  // ── Teachers ──────────────────────────────────────────────────────────

  fn create_teacher(
    &self,
    input: NewTeacher,
  ) -> impl Future<Output = Result<Teacher, Self::Error>> + Send + '_;

  fn get_teacher(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Teacher>, Self::Error>> + Send + '_;

  fn list_teachers(&self) -> impl Future<Output = Result<Vec<Teacher>, Self::Error>> + Send + '_;

  fn update_teacher(
    &self,
    id: Uuid,
    update: TeacherUpdate,
  ) -> impl Future<Output = Result<Option<Teacher>, Self::Error>> + Send + '_;

  fn delete_teacher(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Classes ───────────────────────────────────────────────────────────

  fn create_class(
    &self,
    input: NewClass,
  ) -> impl Future<Output = Result<Class, Self::Error>> + Send + '_;

  fn get_class(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Class>, Self::Error>> + Send + '_;

  /// All classes, highest grade first, then by section.
  fn list_classes(&self) -> impl Future<Output = Result<Vec<Class>, Self::Error>> + Send + '_;

  fn update_class(
    &self,
    id: Uuid,
    input: NewClass,
  ) -> impl Future<Output = Result<Option<Class>, Self::Error>> + Send + '_;

  fn delete_class(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Number of students enrolled in any of `class_ids`.
  fn count_students(
    &self,
    class_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Courses ───────────────────────────────────────────────────────────

  fn create_course(
    &self,
    input: NewCourse,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  fn get_course(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  /// All courses, or only those taught in `class_id`.
  fn list_courses(
    &self,
    class_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  fn update_course(
    &self,
    id: Uuid,
    input: NewCourse,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  fn delete_course(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Badges ────────────────────────────────────────────────────────────

  fn create_badge(
    &self,
    input: NewBadge,
  ) -> impl Future<Output = Result<Badge, Self::Error>> + Send + '_;

  fn get_badge(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Badge>, Self::Error>> + Send + '_;

  fn list_badges(&self) -> impl Future<Output = Result<Vec<Badge>, Self::Error>> + Send + '_;

  // ── Grades ────────────────────────────────────────────────────────────

  /// Append a grade and recompute the student's averages as one atomic
  /// unit. The `date` is set by the store.
  fn record_grade(
    &self,
    input: NewGrade,
  ) -> impl Future<Output = Result<GradeRecording, Self::Error>> + Send + '_;

  /// Grades matching `query`, newest first.
  fn list_grades(
    &self,
    query: GradeQuery,
  ) -> impl Future<Output = Result<Vec<Grade>, Self::Error>> + Send + '_;

  // ── Homework ──────────────────────────────────────────────────────────

  fn create_homework(
    &self,
    input: NewHomework,
  ) -> impl Future<Output = Result<Homework, Self::Error>> + Send + '_;

  fn get_homework(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Homework>, Self::Error>> + Send + '_;

  /// Homework matching `query`, by due date.
  fn list_homework(
    &self,
    query: HomeworkQuery,
  ) -> impl Future<Output = Result<Vec<Homework>, Self::Error>> + Send + '_;

  /// Record a submission stamped now; late if past the due date. `None` if
  /// the homework does not exist. A second submission by the same student is
  /// a conflict.
  fn submit_homework(
    &self,
    homework_id: Uuid,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;
}
