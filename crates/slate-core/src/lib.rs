//! Core types and trait definitions for the Slate school information service.
//!
//! No HTTP or database code lives here. The access gate, the grade recorder
//! and the average calculator are written against the [`store::SchoolStore`]
//! trait so every backend and every endpoint shares them.

pub mod access;
pub mod average;
pub mod error;
pub mod gamification;
pub mod grade;
pub mod gradebook;
pub mod homework;
pub mod school;
pub mod staff;
pub mod store;
pub mod student;

pub use error::{Error, Result};
