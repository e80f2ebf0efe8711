//! SQL schema for the Slate SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS admins (
    admin_id      TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE COLLATE NOCASE,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    level         TEXT NOT NULL,   -- 'super' | 'manager'
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS classes (
    class_id TEXT PRIMARY KEY,
    grade    INTEGER NOT NULL,
    section  TEXT NOT NULL,
    name     TEXT NOT NULL,
    UNIQUE (grade, section)
);

CREATE TABLE IF NOT EXISTS courses (
    course_id TEXT PRIMARY KEY,
    name      TEXT NOT NULL UNIQUE,
    class_ids TEXT NOT NULL DEFAULT '[]'   -- JSON array of class ids
);

CREATE TABLE IF NOT EXISTS teachers (
    teacher_id    TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    course_id     TEXT REFERENCES courses(course_id) ON DELETE SET NULL,
    class_ids     TEXT NOT NULL DEFAULT '[]',
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    student_id      TEXT PRIMARY KEY,
    student_no      TEXT NOT NULL UNIQUE,
    name            TEXT NOT NULL,
    email           TEXT NOT NULL UNIQUE,
    password_hash   TEXT NOT NULL,
    class_id        TEXT NOT NULL REFERENCES classes(class_id),
    overall_average REAL,            -- NULL until the first grade
    points          INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

-- Derived; rewritten in the same transaction as each grade insert.
CREATE TABLE IF NOT EXISTS student_course_averages (
    student_id TEXT NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
    course_id  TEXT NOT NULL,
    average    REAL NOT NULL,
    PRIMARY KEY (student_id, course_id)
);

CREATE TABLE IF NOT EXISTS badges (
    badge_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    category    TEXT NOT NULL,   -- 'academic' | 'social' | 'participation'
    icon        TEXT NOT NULL,
    criteria    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS student_badges (
    student_id TEXT NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
    badge_id   TEXT NOT NULL REFERENCES badges(badge_id) ON DELETE CASCADE,
    awarded_at TEXT NOT NULL,
    PRIMARY KEY (student_id, badge_id)
);

-- Grades are append-only. No UPDATE is ever issued against this table;
-- rows leave only when their student is deleted.
CREATE TABLE IF NOT EXISTS grades (
    grade_id   TEXT PRIMARY KEY,
    student_id TEXT NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
    teacher_id TEXT NOT NULL,
    course_id  TEXT NOT NULL,
    class_id   TEXT NOT NULL,
    value      REAL NOT NULL CHECK (value >= 0 AND value <= 100),
    date       TEXT NOT NULL     -- RFC 3339 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS homework (
    homework_id TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    teacher_id  TEXT NOT NULL,
    class_id    TEXT NOT NULL REFERENCES classes(class_id) ON DELETE CASCADE,
    due_date    TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS homework_submissions (
    homework_id  TEXT NOT NULL REFERENCES homework(homework_id) ON DELETE CASCADE,
    student_id   TEXT NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
    submitted_at TEXT NOT NULL,
    status       TEXT NOT NULL,   -- 'submitted' | 'late'
    PRIMARY KEY (homework_id, student_id)
);

CREATE INDEX IF NOT EXISTS grades_pair_idx     ON grades(student_id, course_id);
CREATE INDEX IF NOT EXISTS grades_teacher_idx  ON grades(teacher_id);
CREATE INDEX IF NOT EXISTS students_class_idx  ON students(class_id);
CREATE INDEX IF NOT EXISTS homework_class_idx  ON homework(class_id);

PRAGMA user_version = 1;
";
