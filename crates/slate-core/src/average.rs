//! Average calculator.
//!
//! Plain reductions over grade values. Nothing here touches storage; the
//! store calls these after every grade insert and persists the results.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::student::Student;

/// Arithmetic mean. `None` for an empty input, never `0`.
pub fn mean<I>(values: I) -> Option<f64>
where
  I: IntoIterator<Item = f64>,
{
  let (sum, count) = values
    .into_iter()
    .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
  (count > 0).then(|| sum / count as f64)
}

/// A student's derived averages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAverages {
  /// Mean of each course's grade values.
  pub by_course: BTreeMap<Uuid, f64>,
  /// Mean over every grade value of the student, across all courses. This is
  /// not the mean of `by_course`; a course with more grades weighs more.
  pub overall:   Option<f64>,
}

impl StudentAverages {
  /// Build from `(course_id, value)` pairs covering all of a student's grades.
  pub fn from_pairs<I>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (Uuid, f64)>,
  {
    let mut per_course: BTreeMap<Uuid, (f64, usize)> = BTreeMap::new();
    let mut total = (0.0, 0usize);

    for (course_id, value) in pairs {
      let entry = per_course.entry(course_id).or_insert((0.0, 0));
      entry.0 += value;
      entry.1 += 1;
      total.0 += value;
      total.1 += 1;
    }

    Self {
      by_course: per_course
        .into_iter()
        .map(|(course_id, (sum, count))| (course_id, sum / count as f64))
        .collect(),
      overall:   (total.1 > 0).then(|| total.0 / total.1 as f64),
    }
  }
}

/// Per-course averages for a class: the mean of the per-course averages of
/// the given students. Courses none of them have grades in are absent.
pub fn class_course_averages<'a, I>(students: I) -> BTreeMap<Uuid, f64>
where
  I: IntoIterator<Item = &'a Student>,
{
  let mut per_course: BTreeMap<Uuid, Vec<f64>> = BTreeMap::new();
  for student in students {
    for (course_id, avg) in &student.grade_averages {
      per_course.entry(*course_id).or_default().push(*avg);
    }
  }
  per_course
    .into_iter()
    .filter_map(|(course_id, avgs)| mean(avgs).map(|m| (course_id, m)))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;
  use proptest::prelude::*;

  #[test]
  fn empty_is_none() {
    assert_eq!(mean(Vec::<f64>::new()), None);
  }

  #[test]
  fn two_then_three_values() {
    assert_eq!(mean([80.0, 90.0]), Some(85.0));
    assert_eq!(mean([80.0, 90.0, 70.0]), Some(80.0));
  }

  #[test]
  fn overall_is_mean_of_all_values_not_of_course_means() {
    let c1 = Uuid::new_v4();
    let c2 = Uuid::new_v4();
    let avgs = StudentAverages::from_pairs([(c1, 100.0), (c1, 80.0), (c2, 60.0)]);
    assert_eq!(avgs.by_course[&c1], 90.0);
    assert_eq!(avgs.by_course[&c2], 60.0);
    assert_eq!(avgs.overall, Some(80.0));
  }

  #[test]
  fn no_grades_no_averages() {
    let avgs = StudentAverages::from_pairs([]);
    assert!(avgs.by_course.is_empty());
    assert_eq!(avgs.overall, None);
  }

  fn student_with(averages: &[(Uuid, f64)]) -> Student {
    Student {
      id:              Uuid::new_v4(),
      student_no:      "S".into(),
      name:            "n".into(),
      email:           "e".into(),
      password_hash:   String::new(),
      class_id:        Uuid::new_v4(),
      grade_averages:  averages.iter().copied().collect(),
      overall_average: None,
      points:          0,
      badges:          Default::default(),
      created_at:      Utc::now(),
      updated_at:      Utc::now(),
    }
  }

  #[test]
  fn class_averages_skip_students_without_grades_in_course() {
    let math = Uuid::new_v4();
    let art = Uuid::new_v4();
    let students = [
      student_with(&[(math, 90.0), (art, 50.0)]),
      student_with(&[(math, 70.0)]),
      student_with(&[]),
    ];
    let avgs = class_course_averages(&students);
    assert_eq!(avgs[&math], 80.0);
    assert_eq!(avgs[&art], 50.0);
    assert_eq!(avgs.len(), 2);
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]
    #[test]
    fn mean_lies_within_bounds(values in prop::collection::vec(0.0f64..=100.0, 1..50)) {
      let m = mean(values.iter().copied()).unwrap();
      let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
      let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
      prop_assert!(m >= lo - 1e-9 && m <= hi + 1e-9);
    }

    #[test]
    fn single_course_overall_equals_course_mean(values in prop::collection::vec(0.0f64..=100.0, 1..30)) {
      let course = Uuid::nil();
      let avgs = StudentAverages::from_pairs(values.iter().map(|v| (course, *v)));
      let expected = values.iter().sum::<f64>() / values.len() as f64;
      prop_assert!((avgs.by_course[&course] - expected).abs() < 1e-9);
      prop_assert!((avgs.overall.unwrap() - expected).abs() < 1e-9);
    }
  }
}
