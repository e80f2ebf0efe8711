//! Points and badges.
//!
//! Points are a plain counter on the student. Badges are catalogue entries a
//! student collects as a set; there is no expiry or revocation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
  Academic,
  Social,
  Participation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
  pub id:          Uuid,
  /// Unique.
  pub name:        String,
  pub description: String,
  pub category:    BadgeCategory,
  /// Icon identifier understood by the client.
  pub icon:        String,
  /// What a student has to do to earn it.
  pub criteria:    String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBadge {
  pub name:        String,
  pub description: String,
  pub category:    BadgeCategory,
  pub icon:        String,
  pub criteria:    String,
}

fn badge(
  name: &str,
  description: &str,
  category: BadgeCategory,
  icon: &str,
  criteria: &str,
) -> NewBadge {
  NewBadge {
    name: name.into(),
    description: description.into(),
    category,
    icon: icon.into(),
    criteria: criteria.into(),
  }
}

/// The catalogue installed by `--seed-badges`: three badges per category.
pub fn default_catalogue() -> Vec<NewBadge> {
  use BadgeCategory::*;
  vec![
    badge("Bookworm", "Top grade in a course", Academic, "brain",
      "Earn the highest grade in a course"),
    badge("Busy Bee", "Every homework on time for a term", Academic, "bee",
      "Submit all homework on time during a term"),
    badge("Star Student", "Overall average of 90 or above", Academic, "star",
      "Reach an overall average of 90 or more"),
    badge("Helping Hand", "Helps classmates with their studies", Social, "helping-hand",
      "Help classmates with academic work"),
    badge("Natural Leader", "Leads group projects", Social, "crown",
      "Take the lead in a group project"),
    badge("Creative Thinker", "Brings original ideas and projects", Social, "lightbulb",
      "Produce original ideas and projects"),
    badge("Active Participant", "Speaks up and joins discussions in class", Participation,
      "hand-raised", "Take part in class discussions consistently"),
    badge("Volunteer", "Volunteers at school events", Participation, "heart",
      "Volunteer at school events"),
    badge("Sports Star", "Plays on a school sports team", Participation, "trophy",
      "Join a school sports team"),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn catalogue_names_are_unique_and_balanced() {
    let cat = default_catalogue();
    let names: HashSet<_> = cat.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names.len(), cat.len());
    for c in [BadgeCategory::Academic, BadgeCategory::Social, BadgeCategory::Participation] {
      assert_eq!(cat.iter().filter(|b| b.category == c).count(), 3);
    }
  }
}
