//! JSON REST API for Slate.
//!
//! Exposes an axum [`Router`] backed by any [`slate_core::store::SchoolStore`].
//! Every route except `/health` authenticates with HTTP Basic against the
//! credentials in the store; TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", slate_api::api_router(store.clone()))
//! ```

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use slate_core::store::SchoolStore;

pub use error::ApiError;
use handlers::{
  admins, badges, classes, courses, grades, session, student, students, teacher, teachers,
};

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SchoolStore + 'static,
{
  Router::new()
    .route("/health", get(session::health))
    .route("/session", get(session::current))
    // Students
    .route("/students", get(students::list::<S>).post(students::create::<S>))
    .route(
      "/students/{id}",
      get(students::get_one::<S>)
        .put(students::update::<S>)
        .delete(students::delete::<S>),
    )
    .route("/students/{id}/grades", get(students::grades::<S>))
    .route("/students/{id}/points", post(students::add_points::<S>))
    .route("/students/{id}/badges", post(students::award_badge::<S>))
    // Teachers
    .route("/teachers", get(teachers::list::<S>).post(teachers::create::<S>))
    .route(
      "/teachers/{id}",
      get(teachers::get_one::<S>)
        .put(teachers::update::<S>)
        .delete(teachers::delete::<S>),
    )
    .route("/teachers/{id}/classes", get(teachers::classes::<S>))
    // Classes and courses
    .route("/classes", get(classes::list::<S>).post(classes::create::<S>))
    .route(
      "/classes/{id}",
      get(classes::get_one::<S>)
        .put(classes::update::<S>)
        .delete(classes::delete::<S>),
    )
    .route("/classes/{id}/averages", get(classes::averages::<S>))
    .route("/courses", get(courses::list::<S>).post(courses::create::<S>))
    .route(
      "/courses/{id}",
      get(courses::get_one::<S>)
        .put(courses::update::<S>)
        .delete(courses::delete::<S>),
    )
    // Grades
    .route("/grades", get(grades::list::<S>).post(grades::create::<S>))
    // Badges
    .route("/badges", get(badges::list::<S>).post(badges::create::<S>))
    // Administrators
    .route("/admins", get(admins::list::<S>).post(admins::create::<S>))
    .route("/admins/{id}", put(admins::update::<S>).delete(admins::delete::<S>))
    // Teacher self-service
    .route("/teacher/classes", get(teacher::classes::<S>))
    .route("/teacher/students", get(teacher::students::<S>))
    .route("/teacher/course", get(teacher::course::<S>))
    .route("/teacher/dashboard", get(teacher::dashboard::<S>))
    .route(
      "/teacher/homework",
      get(teacher::homework::<S>).post(teacher::create_homework::<S>),
    )
    // Student self-service
    .route("/student/courses", get(student::courses::<S>))
    .route("/student/homework", get(student::homework::<S>))
    .route("/student/homework/{id}/submit", post(student::submit::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
