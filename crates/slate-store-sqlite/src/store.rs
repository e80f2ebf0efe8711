//! [`SqliteStore`] — the SQLite implementation of [`SchoolStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, Row, params, types::Type};
use uuid::Uuid;

use slate_core::{
  access::Credential,
  average::StudentAverages,
  gamification::{Badge, NewBadge},
  grade::{Grade, GradeQuery, GradeRecording, NewGrade},
  homework::{Homework, HomeworkQuery, NewHomework, Submission, SubmissionStatus},
  school::{Class, Course, NewClass, NewCourse},
  staff::{Admin, AdminLevel, AdminUpdate, NewAdmin, NewTeacher, Teacher, TeacherUpdate},
  store::SchoolStore,
  student::{NewStudent, Student, StudentQuery, StudentUpdate},
};

use crate::{
  Result,
  error::refuse,
  encode::{
    RawAdmin, RawBadge, RawClass, RawCourse, RawGrade, RawHomework, RawStudent, RawSubmission,
    RawTeacher, decode_admin_level, decode_dt, decode_uuid, encode_admin_level,
    encode_badge_category, encode_dt, encode_ids, encode_submission_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Column lists and row mappers ────────────────────────────────────────────

const ADMIN_COLUMNS: &str =
  "admin_id, username, email, password_hash, level, created_at, updated_at";
const STUDENT_COLUMNS: &str = "student_id, student_no, name, email, password_hash, class_id, \
                               overall_average, points, created_at, updated_at";
const TEACHER_COLUMNS: &str =
  "teacher_id, name, email, password_hash, course_id, class_ids, created_at, updated_at";
const CLASS_COLUMNS: &str = "class_id, grade, section, name";
const COURSE_COLUMNS: &str = "course_id, name, class_ids";
const BADGE_COLUMNS: &str = "badge_id, name, description, category, icon, criteria";
const GRADE_COLUMNS: &str = "grade_id, student_id, teacher_id, course_id, class_id, value, date";
const HOMEWORK_COLUMNS: &str =
  "homework_id, title, description, teacher_id, class_id, due_date, created_at";

fn admin_row(row: &Row<'_>) -> rusqlite::Result<RawAdmin> {
  Ok(RawAdmin {
    admin_id:      row.get(0)?,
    username:      row.get(1)?,
    email:         row.get(2)?,
    password_hash: row.get(3)?,
    level:         row.get(4)?,
    created_at:    row.get(5)?,
    updated_at:    row.get(6)?,
  })
}

fn student_row(row: &Row<'_>) -> rusqlite::Result<RawStudent> {
  Ok(RawStudent {
    student_id:      row.get(0)?,
    student_no:      row.get(1)?,
    name:            row.get(2)?,
    email:           row.get(3)?,
    password_hash:   row.get(4)?,
    class_id:        row.get(5)?,
    overall_average: row.get(6)?,
    points:          row.get(7)?,
    created_at:      row.get(8)?,
    updated_at:      row.get(9)?,
    averages:        Vec::new(),
    badges:          Vec::new(),
  })
}

fn teacher_row(row: &Row<'_>) -> rusqlite::Result<RawTeacher> {
  Ok(RawTeacher {
    teacher_id:    row.get(0)?,
    name:          row.get(1)?,
    email:         row.get(2)?,
    password_hash: row.get(3)?,
    course_id:     row.get(4)?,
    class_ids:     row.get(5)?,
    created_at:    row.get(6)?,
    updated_at:    row.get(7)?,
  })
}

fn class_row(row: &Row<'_>) -> rusqlite::Result<RawClass> {
  Ok(RawClass {
    class_id: row.get(0)?,
    grade:    row.get(1)?,
    section:  row.get(2)?,
    name:     row.get(3)?,
  })
}

fn course_row(row: &Row<'_>) -> rusqlite::Result<RawCourse> {
  Ok(RawCourse { course_id: row.get(0)?, name: row.get(1)?, class_ids: row.get(2)? })
}

fn badge_row(row: &Row<'_>) -> rusqlite::Result<RawBadge> {
  Ok(RawBadge {
    badge_id:    row.get(0)?,
    name:        row.get(1)?,
    description: row.get(2)?,
    category:    row.get(3)?,
    icon:        row.get(4)?,
    criteria:    row.get(5)?,
  })
}

fn grade_row(row: &Row<'_>) -> rusqlite::Result<RawGrade> {
  Ok(RawGrade {
    grade_id:   row.get(0)?,
    student_id: row.get(1)?,
    teacher_id: row.get(2)?,
    course_id:  row.get(3)?,
    class_id:   row.get(4)?,
    value:      row.get(5)?,
    date:       row.get(6)?,
  })
}

fn homework_row(row: &Row<'_>) -> rusqlite::Result<RawHomework> {
  Ok(RawHomework {
    homework_id: row.get(0)?,
    title:       row.get(1)?,
    description: row.get(2)?,
    teacher_id:  row.get(3)?,
    class_id:    row.get(4)?,
    due_date:    row.get(5)?,
    created_at:  row.get(6)?,
    submissions: Vec::new(),
  })
}

// ─── Connection-thread helpers ───────────────────────────────────────────────
//
// These run inside `Connection::call` closures and speak rusqlite types only.

/// Attach averages and badges to a student row.
fn fill_student(conn: &rusqlite::Connection, raw: &mut RawStudent) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare_cached(
    "SELECT course_id, average FROM student_course_averages WHERE student_id = ?1",
  )?;
  let averages = stmt
    .query_map(params![raw.student_id], |r| Ok((r.get(0)?, r.get(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare_cached(
    "SELECT badge_id FROM student_badges WHERE student_id = ?1 ORDER BY awarded_at",
  )?;
  let badges = stmt
    .query_map(params![raw.student_id], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raw.averages = averages;
  raw.badges = badges;
  Ok(())
}

fn load_student(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<RawStudent>> {
  let raw = conn
    .query_row(
      &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = ?1"),
      params![id],
      student_row,
    )
    .optional()?;
  match raw {
    Some(mut raw) => {
      fill_student(conn, &mut raw)?;
      Ok(Some(raw))
    }
    None => Ok(None),
  }
}

fn load_submissions(
  conn: &rusqlite::Connection,
  raw: &mut RawHomework,
) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare_cached(
    "SELECT student_id, submitted_at, status FROM homework_submissions
     WHERE homework_id = ?1 ORDER BY submitted_at",
  )?;
  let subs = stmt
    .query_map(params![raw.homework_id], |r| {
      Ok(RawSubmission { student_id: r.get(0)?, submitted_at: r.get(1)?, status: r.get(2)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raw.submissions = subs;
  Ok(())
}

/// Parse a UUID column inside a row closure.
fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
  let s: String = row.get(idx)?;
  Uuid::parse_str(&s)
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Refuse to remove or demote `admin_id` when it is the only super admin.
fn guard_last_super(conn: &rusqlite::Connection, admin_id: &str) -> tokio_rusqlite::Result<()> {
  let super_str = encode_admin_level(AdminLevel::Super);
  let last: bool = conn.query_row(
    "SELECT EXISTS (SELECT 1 FROM admins WHERE admin_id = ?1 AND level = ?2)
       AND (SELECT COUNT(*) FROM admins WHERE level = ?2) <= 1",
    params![admin_id, super_str],
    |r| r.get(0),
  )?;
  if last {
    return Err(refuse(slate_core::Error::Conflict(
      "the last super admin cannot be removed".into(),
    )));
  }
  Ok(())
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Slate store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Delete one row by primary key; `true` if a row was removed.
  async fn delete_by_id(&self, table: &'static str, key: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&format!("DELETE FROM {table} WHERE {key} = ?1"), params![id_str])?)
      })
      .await?;
    Ok(removed > 0)
  }
}

// ─── SchoolStore impl ────────────────────────────────────────────────────────

impl SchoolStore for SqliteStore {
  type Error = crate::Error;

  // ── Credentials ───────────────────────────────────────────────────────────

  async fn find_credential(&self, login: String) -> Result<Option<Credential>> {
    let found: Option<(String, String, String, String, Option<String>)> = self
      .conn
      .call(move |conn| {
        let admin = conn
          .query_row(
            "SELECT admin_id, username, password_hash, 'admin', level FROM admins
             WHERE lower(username) = lower(?1) OR lower(email) = lower(?1)",
            params![login],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
          )
          .optional()?;
        if admin.is_some() {
          return Ok(admin);
        }

        let teacher = conn
          .query_row(
            "SELECT teacher_id, name, password_hash, 'teacher', NULL FROM teachers
             WHERE email = ?1",
            params![login],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
          )
          .optional()?;
        if teacher.is_some() {
          return Ok(teacher);
        }

        Ok(
          conn
            .query_row(
              "SELECT student_id, name, password_hash, 'student', NULL FROM students
               WHERE email = ?1",
              params![login],
              |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((id, name, password_hash, kind, level)) = found else {
      return Ok(None);
    };

    let role = match (kind.as_str(), level.as_deref()) {
      ("admin", Some(level)) => decode_admin_level(level)?.role(),
      ("teacher", _) => slate_core::access::Role::Teacher,
      _ => slate_core::access::Role::Student,
    };

    Ok(Some(Credential { id: decode_uuid(&id)?, role, name, password_hash }))
  }

  // ── Administrators ────────────────────────────────────────────────────────

  async fn create_admin(&self, input: NewAdmin) -> Result<Admin> {
    let now = Utc::now();
    let admin = Admin {
      id:            Uuid::new_v4(),
      username:      input.username,
      email:         input.email,
      password_hash: input.password_hash,
      level:         input.level,
      created_at:    now,
      updated_at:    now,
    };

    let id_str    = encode_uuid(admin.id);
    let username  = admin.username.clone();
    let email     = admin.email.clone();
    let hash      = admin.password_hash.clone();
    let level_str = encode_admin_level(admin.level);
    let at_str    = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO admins ({ADMIN_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)"),
          params![id_str, username, email, hash, level_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(admin)
  }

  async fn list_admins(&self) -> Result<Vec<Admin>> {
    let raws: Vec<RawAdmin> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {ADMIN_COLUMNS} FROM admins ORDER BY username"))?;
        let rows = stmt.query_map([], admin_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAdmin::into_admin).collect()
  }

  async fn update_admin(&self, id: Uuid, update: AdminUpdate) -> Result<Option<Admin>> {
    let id_str    = encode_uuid(id);
    let level_str = encode_admin_level(update.level);
    let at_str    = encode_dt(Utc::now());

    let demotes = update.level != AdminLevel::Super;
    let raw: Option<RawAdmin> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if demotes {
          guard_last_super(&tx, &id_str)?;
        }
        let changed = tx.execute(
          "UPDATE admins SET username = ?2, email = ?3, level = ?4, updated_at = ?5
           WHERE admin_id = ?1",
          params![id_str, update.username, update.email, level_str, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx
          .query_row(
            &format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE admin_id = ?1"),
            params![id_str],
            admin_row,
          )
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawAdmin::into_admin).transpose()
  }

  async fn delete_admin(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        guard_last_super(&tx, &id_str)?;
        let removed = tx.execute("DELETE FROM admins WHERE admin_id = ?1", params![id_str])?;
        tx.commit()?;
        Ok(removed)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn count_admins(&self, level: Option<AdminLevel>) -> Result<usize> {
    let level_str = level.map(encode_admin_level);
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM admins WHERE ?1 IS NULL OR level = ?1",
          params![level_str],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(count as usize)
  }

  // ── Students ──────────────────────────────────────────────────────────────

  async fn create_student(&self, input: NewStudent) -> Result<Student> {
    let now = Utc::now();
    let student = Student {
      id:              Uuid::new_v4(),
      student_no:      input.student_no,
      name:            input.name,
      email:           input.email,
      password_hash:   input.password_hash,
      class_id:        input.class_id,
      grade_averages:  Default::default(),
      overall_average: None,
      points:          0,
      badges:          Default::default(),
      created_at:      now,
      updated_at:      now,
    };

    let id_str       = encode_uuid(student.id);
    let student_no   = student.student_no.clone();
    let name         = student.name.clone();
    let email        = student.email.clone();
    let hash         = student.password_hash.clone();
    let class_id_str = encode_uuid(student.class_id);
    let at_str       = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO students (
             student_id, student_no, name, email, password_hash, class_id,
             overall_average, points, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, 0, ?7, ?7)",
          params![id_str, student_no, name, email, hash, class_id_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(student)
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
    let id_str = encode_uuid(id);
    let raw = self.conn.call(move |conn| Ok(load_student(conn, &id_str)?)).await?;
    raw.map(RawStudent::into_student).transpose()
  }

  async fn list_students(&self, query: StudentQuery) -> Result<Vec<Student>> {
    let class_ids: Vec<String> = query.class_ids.into_iter().map(encode_uuid).collect();

    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let sql = if class_ids.is_empty() {
          format!("SELECT {STUDENT_COLUMNS} FROM students ORDER BY name")
        } else {
          let marks = vec!["?"; class_ids.len()].join(", ");
          format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE class_id IN ({marks}) ORDER BY name"
          )
        };
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt
          .query_map(rusqlite::params_from_iter(class_ids.iter()), student_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        for raw in &mut rows {
          fill_student(conn, raw)?;
        }
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStudent::into_student).collect()
  }

  async fn update_student(&self, id: Uuid, update: StudentUpdate) -> Result<Option<Student>> {
    let id_str       = encode_uuid(id);
    let class_id_str = encode_uuid(update.class_id);
    let at_str       = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE students
           SET student_no = ?2, name = ?3, email = ?4, class_id = ?5, updated_at = ?6
           WHERE student_id = ?1",
          params![id_str, update.student_no, update.name, update.email, class_id_str, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(load_student(conn, &id_str)?)
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  async fn delete_student(&self, id: Uuid) -> Result<bool> {
    // Grades, averages, badges and submissions go with it via ON DELETE CASCADE.
    self.delete_by_id("students", "student_id", id).await
  }

  async fn add_points(&self, id: Uuid, delta: i64) -> Result<Option<Student>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let current: Option<i64> = tx
          .query_row(
            "SELECT points FROM students WHERE student_id = ?1",
            params![id_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(current) = current else {
          return Ok(None);
        };
        // SQLite would silently promote an overflowing sum to REAL.
        let points = current.checked_add(delta).ok_or_else(|| {
          refuse(slate_core::Error::Validation("points total out of range".into()))
        })?;
        tx.execute(
          "UPDATE students SET points = ?2, updated_at = ?3 WHERE student_id = ?1",
          params![id_str, points, at_str],
        )?;
        let raw = load_student(&tx, &id_str)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  async fn award_badge(&self, id: Uuid, badge_id: Uuid) -> Result<Option<Student>> {
    let id_str    = encode_uuid(id);
    let badge_str = encode_uuid(badge_id);
    let at_str    = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        if load_student(conn, &id_str)?.is_none() {
          return Ok(None);
        }
        conn.execute(
          "INSERT OR IGNORE INTO student_badges (student_id, badge_id, awarded_at)
           VALUES (?1, ?2, ?3)",
          params![id_str, badge_str, at_str],
        )?;
        Ok(load_student(conn, &id_str)?)
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  // ── Teachers ──────────────────────────────────────────────────────────────

  async fn create_teacher(&self, input: NewTeacher) -> Result<Teacher> {
    let now = Utc::now();
    let teacher = Teacher {
      id:            Uuid::new_v4(),
      name:          input.name,
      email:         input.email,
      password_hash: input.password_hash,
      course_id:     input.course_id,
      class_ids:     input.class_ids,
      created_at:    now,
      updated_at:    now,
    };

    let id_str     = encode_uuid(teacher.id);
    let name       = teacher.name.clone();
    let email      = teacher.email.clone();
    let hash       = teacher.password_hash.clone();
    let course_str = teacher.course_id.map(encode_uuid);
    let class_ids  = encode_ids(&teacher.class_ids)?;
    let at_str     = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO teachers ({TEACHER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)"
          ),
          params![id_str, name, email, hash, course_str, class_ids, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(teacher)
  }

  async fn get_teacher(&self, id: Uuid) -> Result<Option<Teacher>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawTeacher> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TEACHER_COLUMNS} FROM teachers WHERE teacher_id = ?1"),
              params![id_str],
              teacher_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTeacher::into_teacher).transpose()
  }

  async fn list_teachers(&self) -> Result<Vec<Teacher>> {
    let raws: Vec<RawTeacher> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {TEACHER_COLUMNS} FROM teachers ORDER BY name"))?;
        let rows = stmt.query_map([], teacher_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTeacher::into_teacher).collect()
  }

  async fn update_teacher(&self, id: Uuid, update: TeacherUpdate) -> Result<Option<Teacher>> {
    let id_str     = encode_uuid(id);
    let course_str = update.course_id.map(encode_uuid);
    let class_ids  = encode_ids(&update.class_ids)?;
    let at_str     = encode_dt(Utc::now());

    let raw: Option<RawTeacher> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE teachers
           SET name = ?2, email = ?3, course_id = ?4, class_ids = ?5, updated_at = ?6
           WHERE teacher_id = ?1",
          params![id_str, update.name, update.email, course_str, class_ids, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {TEACHER_COLUMNS} FROM teachers WHERE teacher_id = ?1"),
              params![id_str],
              teacher_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTeacher::into_teacher).transpose()
  }

  async fn delete_teacher(&self, id: Uuid) -> Result<bool> {
    self.delete_by_id("teachers", "teacher_id", id).await
  }

  // ── Classes ───────────────────────────────────────────────────────────────

  async fn create_class(&self, input: NewClass) -> Result<Class> {
    let class = Class {
      id:      Uuid::new_v4(),
      name:    input.name(),
      grade:   input.grade,
      section: input.section,
    };

    let id_str  = encode_uuid(class.id);
    let grade   = class.grade;
    let section = class.section.clone();
    let name    = class.name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO classes ({CLASS_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
          params![id_str, grade, section, name],
        )?;
        Ok(())
      })
      .await?;

    Ok(class)
  }

  async fn get_class(&self, id: Uuid) -> Result<Option<Class>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawClass> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CLASS_COLUMNS} FROM classes WHERE class_id = ?1"),
              params![id_str],
              class_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawClass::into_class).transpose()
  }

  async fn list_classes(&self) -> Result<Vec<Class>> {
    let raws: Vec<RawClass> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CLASS_COLUMNS} FROM classes ORDER BY grade DESC, section ASC"
        ))?;
        let rows = stmt.query_map([], class_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawClass::into_class).collect()
  }

  async fn update_class(&self, id: Uuid, input: NewClass) -> Result<Option<Class>> {
    let id_str = encode_uuid(id);
    let name   = input.name();

    let raw: Option<RawClass> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE classes SET grade = ?2, section = ?3, name = ?4 WHERE class_id = ?1",
          params![id_str, input.grade, input.section, name],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {CLASS_COLUMNS} FROM classes WHERE class_id = ?1"),
              params![id_str],
              class_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawClass::into_class).transpose()
  }

  async fn delete_class(&self, id: Uuid) -> Result<bool> {
    // Fails with a constraint violation while students are still enrolled.
    self.delete_by_id("classes", "class_id", id).await
  }

  async fn count_students(&self, class_ids: Vec<Uuid>) -> Result<usize> {
    if class_ids.is_empty() {
      return Ok(0);
    }
    let ids: Vec<String> = class_ids.into_iter().map(encode_uuid).collect();

    let count: i64 = self
      .conn
      .call(move |conn| {
        let marks = vec!["?"; ids.len()].join(", ");
        Ok(conn.query_row(
          &format!("SELECT COUNT(*) FROM students WHERE class_id IN ({marks})"),
          rusqlite::params_from_iter(ids.iter()),
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(count as usize)
  }

  // ── Courses ───────────────────────────────────────────────────────────────

  async fn create_course(&self, input: NewCourse) -> Result<Course> {
    let course = Course { id: Uuid::new_v4(), name: input.name, class_ids: input.class_ids };

    let id_str    = encode_uuid(course.id);
    let name      = course.name.clone();
    let class_ids = encode_ids(&course.class_ids)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO courses ({COURSE_COLUMNS}) VALUES (?1, ?2, ?3)"),
          params![id_str, name, class_ids],
        )?;
        Ok(())
      })
      .await?;

    Ok(course)
  }

  async fn get_course(&self, id: Uuid) -> Result<Option<Course>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawCourse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE course_id = ?1"),
              params![id_str],
              course_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCourse::into_course).transpose()
  }

  async fn list_courses(&self, class_id: Option<Uuid>) -> Result<Vec<Course>> {
    let raws: Vec<RawCourse> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY name"))?;
        let rows = stmt.query_map([], course_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut courses: Vec<Course> =
      raws.into_iter().map(RawCourse::into_course).collect::<Result<_>>()?;
    if let Some(class_id) = class_id {
      courses.retain(|c| c.class_ids.contains(&class_id));
    }
    Ok(courses)
  }

  async fn update_course(&self, id: Uuid, input: NewCourse) -> Result<Option<Course>> {
    let id_str    = encode_uuid(id);
    let class_ids = encode_ids(&input.class_ids)?;

    let raw: Option<RawCourse> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE courses SET name = ?2, class_ids = ?3 WHERE course_id = ?1",
          params![id_str, input.name, class_ids],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE course_id = ?1"),
              params![id_str],
              course_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCourse::into_course).transpose()
  }

  async fn delete_course(&self, id: Uuid) -> Result<bool> {
    self.delete_by_id("courses", "course_id", id).await
  }

  // ── Badges ────────────────────────────────────────────────────────────────

  async fn create_badge(&self, input: NewBadge) -> Result<Badge> {
    let badge = Badge {
      id:          Uuid::new_v4(),
      name:        input.name,
      description: input.description,
      category:    input.category,
      icon:        input.icon,
      criteria:    input.criteria,
    };

    let id_str       = encode_uuid(badge.id);
    let name         = badge.name.clone();
    let description  = badge.description.clone();
    let category_str = encode_badge_category(badge.category);
    let icon         = badge.icon.clone();
    let criteria     = badge.criteria.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO badges ({BADGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
          params![id_str, name, description, category_str, icon, criteria],
        )?;
        Ok(())
      })
      .await?;

    Ok(badge)
  }

  async fn get_badge(&self, id: Uuid) -> Result<Option<Badge>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawBadge> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {BADGE_COLUMNS} FROM badges WHERE badge_id = ?1"),
              params![id_str],
              badge_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawBadge::into_badge).transpose()
  }

  async fn list_badges(&self) -> Result<Vec<Badge>> {
    let raws: Vec<RawBadge> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {BADGE_COLUMNS} FROM badges ORDER BY category, name"))?;
        let rows = stmt.query_map([], badge_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBadge::into_badge).collect()
  }

  // ── Grades ────────────────────────────────────────────────────────────────

  async fn record_grade(&self, input: NewGrade) -> Result<GradeRecording> {
    let new_grade = Grade {
      id:         Uuid::new_v4(),
      student_id: input.student_id,
      teacher_id: input.teacher_id,
      course_id:  input.course_id,
      class_id:   input.class_id,
      value:      input.value,
      date:       Utc::now(),
    };

    let grade_id_str   = encode_uuid(new_grade.id);
    let student_id_str = encode_uuid(new_grade.student_id);
    let teacher_id_str = encode_uuid(new_grade.teacher_id);
    let course_id_str  = encode_uuid(new_grade.course_id);
    let class_id_str   = encode_uuid(new_grade.class_id);
    let value          = new_grade.value.get();
    let date_str       = encode_dt(new_grade.date);
    let updated_str    = date_str.clone();
    let course_id      = new_grade.course_id;

    // Insert, re-read and write back inside one transaction so a concurrent
    // insert for the same student can never be missing from the stored mean.
    let (raws, average): (Vec<RawGrade>, Option<f64>) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          &format!("INSERT INTO grades ({GRADE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
          params![
            grade_id_str,
            student_id_str,
            teacher_id_str,
            course_id_str,
            class_id_str,
            value,
            date_str,
          ],
        )?;

        let pairs = {
          let mut stmt =
            tx.prepare("SELECT course_id, value FROM grades WHERE student_id = ?1")?;
          let rows = stmt
            .query_map(params![student_id_str], |r| Ok((uuid_column(r, 0)?, r.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(Uuid, f64)>>>()?;
          rows
        };
        let averages = StudentAverages::from_pairs(pairs);
        let average = averages.by_course.get(&course_id).copied();

        tx.execute(
          "INSERT INTO student_course_averages (student_id, course_id, average)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (student_id, course_id) DO UPDATE SET average = excluded.average",
          params![student_id_str, course_id_str, average],
        )?;
        tx.execute(
          "UPDATE students SET overall_average = ?2, updated_at = ?3 WHERE student_id = ?1",
          params![student_id_str, averages.overall, updated_str],
        )?;

        let grades = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {GRADE_COLUMNS} FROM grades
             WHERE student_id = ?1 AND course_id = ?2
             ORDER BY date, rowid"
          ))?;
          let rows = stmt
            .query_map(params![student_id_str, course_id_str], grade_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        };

        tx.commit()?;
        Ok((grades, average))
      })
      .await?;

    let grades = raws.into_iter().map(RawGrade::into_grade).collect::<Result<_>>()?;
    Ok(GradeRecording { new_grade, grades, average })
  }

  async fn list_grades(&self, query: GradeQuery) -> Result<Vec<Grade>> {
    let filters: Vec<(&'static str, String)> = [
      ("student_id", query.student_id),
      ("teacher_id", query.teacher_id),
      ("course_id", query.course_id),
      ("class_id", query.class_id),
    ]
    .into_iter()
    .filter_map(|(col, id)| id.map(|id| (col, encode_uuid(id))))
    .collect();

    let raws: Vec<RawGrade> = self
      .conn
      .call(move |conn| {
        let where_clause = if filters.is_empty() {
          String::new()
        } else {
          let conds: Vec<String> = filters
            .iter()
            .enumerate()
            .map(|(i, (col, _))| format!("{col} = ?{}", i + 1))
            .collect();
          format!("WHERE {}", conds.join(" AND "))
        };
        let sql = format!(
          "SELECT {GRADE_COLUMNS} FROM grades {where_clause} ORDER BY date DESC, rowid DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(filters.iter().map(|(_, v)| v)), grade_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGrade::into_grade).collect()
  }

  // ── Homework ──────────────────────────────────────────────────────────────

  async fn create_homework(&self, input: NewHomework) -> Result<Homework> {
    let homework = Homework {
      id:          Uuid::new_v4(),
      title:       input.title,
      description: input.description,
      teacher_id:  input.teacher_id,
      class_id:    input.class_id,
      due_date:    input.due_date,
      created_at:  Utc::now(),
      submissions: Vec::new(),
    };

    let id_str      = encode_uuid(homework.id);
    let title       = homework.title.clone();
    let description = homework.description.clone();
    let teacher_str = encode_uuid(homework.teacher_id);
    let class_str   = encode_uuid(homework.class_id);
    let due_str     = encode_dt(homework.due_date);
    let at_str      = encode_dt(homework.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO homework ({HOMEWORK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
          params![id_str, title, description, teacher_str, class_str, due_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(homework)
  }

  async fn get_homework(&self, id: Uuid) -> Result<Option<Homework>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawHomework> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {HOMEWORK_COLUMNS} FROM homework WHERE homework_id = ?1"),
            params![id_str],
            homework_row,
          )
          .optional()?;
        match raw {
          Some(mut raw) => {
            load_submissions(conn, &mut raw)?;
            Ok(Some(raw))
          }
          None => Ok(None),
        }
      })
      .await?;

    raw.map(RawHomework::into_homework).transpose()
  }

  async fn list_homework(&self, query: HomeworkQuery) -> Result<Vec<Homework>> {
    let teacher_str = query.teacher_id.map(encode_uuid);
    let class_str   = query.class_id.map(encode_uuid);

    let raws: Vec<RawHomework> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HOMEWORK_COLUMNS} FROM homework
           WHERE (?1 IS NULL OR teacher_id = ?1) AND (?2 IS NULL OR class_id = ?2)
           ORDER BY due_date"
        ))?;
        let mut rows = stmt
          .query_map(params![teacher_str, class_str], homework_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        for raw in &mut rows {
          load_submissions(conn, raw)?;
        }
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHomework::into_homework).collect()
  }

  async fn submit_homework(&self, homework_id: Uuid, student_id: Uuid) -> Result<Option<Submission>> {
    let homework_str = encode_uuid(homework_id);
    let student_str  = encode_uuid(student_id);
    // Truncated to the stored precision so the returned and stored status agree.
    let at_str       = encode_dt(Utc::now());
    let submitted_at = decode_dt(&at_str)?;

    let status = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let due: Option<String> = tx
          .query_row(
            "SELECT due_date FROM homework WHERE homework_id = ?1",
            params![homework_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(due) = due else {
          return Ok(None);
        };
        let due_date = DateTime::parse_from_rfc3339(&due)
          .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?
          .with_timezone(&Utc);

        let status = SubmissionStatus::at(submitted_at, due_date);
        tx.execute(
          "INSERT INTO homework_submissions (homework_id, student_id, submitted_at, status)
           VALUES (?1, ?2, ?3, ?4)",
          params![homework_str, student_str, at_str, encode_submission_status(status)],
        )?;
        tx.commit()?;
        Ok(Some(status))
      })
      .await?;

    Ok(status.map(|status| Submission { student_id, submitted_at, status }))
  }
}
