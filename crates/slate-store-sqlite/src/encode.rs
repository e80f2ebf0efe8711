//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond precision
//! so they sort lexically. Id lists are stored as compact JSON. UUIDs are
//! stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use slate_core::{
  gamification::{Badge, BadgeCategory},
  grade::{Grade, GradeValue},
  homework::{Homework, Submission, SubmissionStatus},
  school::{Class, Course},
  staff::{Admin, AdminLevel, Teacher},
  student::Student,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_ids(ids: &[Uuid]) -> Result<String> { Ok(serde_json::to_string(ids)?) }

pub fn decode_ids(s: &str) -> Result<Vec<Uuid>> { Ok(serde_json::from_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ────────────────────────────────────────────────────────────────────

pub fn encode_admin_level(l: AdminLevel) -> &'static str {
  match l {
    AdminLevel::Super => "super",
    AdminLevel::Manager => "manager",
  }
}

pub fn decode_admin_level(s: &str) -> Result<AdminLevel> {
  match s {
    "super" => Ok(AdminLevel::Super),
    "manager" => Ok(AdminLevel::Manager),
    other => Err(Error::UnknownValue { kind: "admin level", value: other.into() }),
  }
}

pub fn encode_badge_category(c: BadgeCategory) -> &'static str {
  match c {
    BadgeCategory::Academic => "academic",
    BadgeCategory::Social => "social",
    BadgeCategory::Participation => "participation",
  }
}

pub fn decode_badge_category(s: &str) -> Result<BadgeCategory> {
  match s {
    "academic" => Ok(BadgeCategory::Academic),
    "social" => Ok(BadgeCategory::Social),
    "participation" => Ok(BadgeCategory::Participation),
    other => Err(Error::UnknownValue { kind: "badge category", value: other.into() }),
  }
}

pub fn encode_submission_status(s: SubmissionStatus) -> &'static str {
  match s {
    SubmissionStatus::Submitted => "submitted",
    SubmissionStatus::Late => "late",
  }
}

pub fn decode_submission_status(s: &str) -> Result<SubmissionStatus> {
  match s {
    "submitted" => Ok(SubmissionStatus::Submitted),
    "late" => Ok(SubmissionStatus::Late),
    other => Err(Error::UnknownValue { kind: "submission status", value: other.into() }),
  }
}

// ─── Raw row types ────────────────────────────────────────────────────────────
//
// Rows are read into these inside the connection thread and decoded into
// domain types afterwards, so decoding errors use this crate's error type.

pub struct RawAdmin {
  pub admin_id:      String,
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub level:         String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawAdmin {
  pub fn into_admin(self) -> Result<Admin> {
    Ok(Admin {
      id:            decode_uuid(&self.admin_id)?,
      username:      self.username,
      email:         self.email,
      password_hash: self.password_hash,
      level:         decode_admin_level(&self.level)?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawStudent {
  pub student_id:      String,
  pub student_no:      String,
  pub name:            String,
  pub email:           String,
  pub password_hash:   String,
  pub class_id:        String,
  pub overall_average: Option<f64>,
  pub points:          i64,
  pub created_at:      String,
  pub updated_at:      String,
  /// `(course_id, average)` rows from `student_course_averages`.
  pub averages:        Vec<(String, f64)>,
  pub badges:          Vec<String>,
}

impl RawStudent {
  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      id:              decode_uuid(&self.student_id)?,
      student_no:      self.student_no,
      name:            self.name,
      email:           self.email,
      password_hash:   self.password_hash,
      class_id:        decode_uuid(&self.class_id)?,
      grade_averages:  self
        .averages
        .iter()
        .map(|(c, avg)| Ok((decode_uuid(c)?, *avg)))
        .collect::<Result<_>>()?,
      overall_average: self.overall_average,
      points:          self.points,
      badges:          self
        .badges
        .iter()
        .map(|b| decode_uuid(b))
        .collect::<Result<_>>()?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawTeacher {
  pub teacher_id:    String,
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub course_id:     Option<String>,
  pub class_ids:     String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawTeacher {
  pub fn into_teacher(self) -> Result<Teacher> {
    Ok(Teacher {
      id:            decode_uuid(&self.teacher_id)?,
      name:          self.name,
      email:         self.email,
      password_hash: self.password_hash,
      course_id:     self.course_id.as_deref().map(decode_uuid).transpose()?,
      class_ids:     decode_ids(&self.class_ids)?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawClass {
  pub class_id: String,
  pub grade:    u8,
  pub section:  String,
  pub name:     String,
}

impl RawClass {
  pub fn into_class(self) -> Result<Class> {
    Ok(Class {
      id:      decode_uuid(&self.class_id)?,
      grade:   self.grade,
      section: self.section,
      name:    self.name,
    })
  }
}

pub struct RawCourse {
  pub course_id: String,
  pub name:      String,
  pub class_ids: String,
}

impl RawCourse {
  pub fn into_course(self) -> Result<Course> {
    Ok(Course {
      id:        decode_uuid(&self.course_id)?,
      name:      self.name,
      class_ids: decode_ids(&self.class_ids)?,
    })
  }
}

pub struct RawBadge {
  pub badge_id:    String,
  pub name:        String,
  pub description: String,
  pub category:    String,
  pub icon:        String,
  pub criteria:    String,
}

impl RawBadge {
  pub fn into_badge(self) -> Result<Badge> {
    Ok(Badge {
      id:          decode_uuid(&self.badge_id)?,
      name:        self.name,
      description: self.description,
      category:    decode_badge_category(&self.category)?,
      icon:        self.icon,
      criteria:    self.criteria,
    })
  }
}

pub struct RawGrade {
  pub grade_id:   String,
  pub student_id: String,
  pub teacher_id: String,
  pub course_id:  String,
  pub class_id:   String,
  pub value:      f64,
  pub date:       String,
}

impl RawGrade {
  pub fn into_grade(self) -> Result<Grade> {
    Ok(Grade {
      id:         decode_uuid(&self.grade_id)?,
      student_id: decode_uuid(&self.student_id)?,
      teacher_id: decode_uuid(&self.teacher_id)?,
      course_id:  decode_uuid(&self.course_id)?,
      class_id:   decode_uuid(&self.class_id)?,
      value:      GradeValue::new(self.value)?,
      date:       decode_dt(&self.date)?,
    })
  }
}

pub struct RawSubmission {
  pub student_id:   String,
  pub submitted_at: String,
  pub status:       String,
}

impl RawSubmission {
  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      student_id:   decode_uuid(&self.student_id)?,
      submitted_at: decode_dt(&self.submitted_at)?,
      status:       decode_submission_status(&self.status)?,
    })
  }
}

pub struct RawHomework {
  pub homework_id: String,
  pub title:       String,
  pub description: String,
  pub teacher_id:  String,
  pub class_id:    String,
  pub due_date:    String,
  pub created_at:  String,
  pub submissions: Vec<RawSubmission>,
}

impl RawHomework {
  pub fn into_homework(self) -> Result<Homework> {
    Ok(Homework {
      id:          decode_uuid(&self.homework_id)?,
      title:       self.title,
      description: self.description,
      teacher_id:  decode_uuid(&self.teacher_id)?,
      class_id:    decode_uuid(&self.class_id)?,
      due_date:    decode_dt(&self.due_date)?,
      created_at:  decode_dt(&self.created_at)?,
      submissions: self
        .submissions
        .into_iter()
        .map(RawSubmission::into_submission)
        .collect::<Result<_>>()?,
    })
  }
}
