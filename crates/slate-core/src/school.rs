//! Classes and courses — the lookup entities grades hang off.

use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result};

/// A class, identified by grade level and section (e.g. `9-B`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
  pub id:      Uuid,
  pub grade:   u8,
  pub section: String,
  /// Derived: `"{grade}-{SECTION}"`.
  pub name:    String,
}

impl Class {
  pub fn display_name(grade: u8, section: &str) -> String {
    format!("{grade}-{}", section.to_uppercase())
  }
}

/// Input for creating or replacing a class.
#[derive(Debug, Clone)]
pub struct NewClass {
  pub grade:   u8,
  pub section: String,
}

impl NewClass {
  /// Trim and upper-case the section; reject an empty one.
  pub fn normalized(grade: u8, section: &str) -> Result<Self> {
    let section = section.trim().to_uppercase();
    if section.is_empty() {
      return Err(Error::Validation("section must not be empty".into()));
    }
    Ok(Self { grade, section })
  }

  pub fn name(&self) -> String { Class::display_name(self.grade, &self.section) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
  pub id:        Uuid,
  /// Unique.
  pub name:      String,
  /// Classes this course is taught in.
  pub class_ids: Vec<Uuid>,
}

/// Input for creating or replacing a course.
#[derive(Debug, Clone)]
pub struct NewCourse {
  pub name:      String,
  pub class_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn class_name_uppercases_section() {
    assert_eq!(Class::display_name(9, "b"), "9-B");
    let c = NewClass::normalized(11, "  a ").unwrap();
    assert_eq!(c.section, "A");
    assert_eq!(c.name(), "11-A");
  }

  #[test]
  fn empty_section_rejected() {
    assert!(matches!(NewClass::normalized(9, "  "), Err(Error::Validation(_))));
  }
}
