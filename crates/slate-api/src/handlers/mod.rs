//! Route handlers, one module per resource.

pub mod admins;
pub mod badges;
pub mod classes;
pub mod courses;
pub mod grades;
pub mod session;
pub mod student;
pub mod students;
pub mod teacher;
pub mod teachers;

use uuid::Uuid;

use crate::error::ApiError;

/// A trimmed, non-empty text field.
pub(crate) fn required(field: &str, value: &str) -> Result<String, ApiError> {
  let value = value.trim();
  if value.is_empty() {
    return Err(ApiError::Validation(format!("{field} is required")));
  }
  Ok(value.to_string())
}

/// Login emails must at least look like one.
pub(crate) fn email(value: &str) -> Result<String, ApiError> {
  let value = required("email", value)?;
  match value.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(value),
    _ => Err(ApiError::Validation(format!("invalid email: {value}"))),
  }
}

pub(crate) fn not_found(kind: &'static str, id: Uuid) -> ApiError {
  slate_core::Error::not_found(kind, id).into()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn required_trims_and_rejects_blank() {
    assert_eq!(required("name", "  Ada ").unwrap(), "Ada");
    assert!(matches!(required("name", "   "), Err(ApiError::Validation(_))));
  }

  #[test]
  fn email_needs_both_halves() {
    assert!(email("ada@school.test").is_ok());
    for bad in ["ada", "@school.test", "ada@", ""] {
      assert!(email(bad).is_err(), "{bad}");
    }
  }
}
