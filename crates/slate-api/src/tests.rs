//! Router tests driven through `tower::ServiceExt::oneshot` against an
//! in-memory store.

use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version, password_hash::SaltString};
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand_core::OsRng;
use serde_json::{Value, json};
use slate_core::{
  school::{Class, Course, NewClass, NewCourse},
  staff::{AdminLevel, NewAdmin, NewTeacher, Teacher, TeacherUpdate},
  store::SchoolStore,
  student::{NewStudent, Student},
};
use slate_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use crate::api_router;

const PASSWORD: &str = "pw";

/// Low-cost argon2 parameters so verification stays fast in debug builds.
fn cheap_hash(password: &str) -> String {
  let params = Params::new(1024, 1, 1, None).unwrap();
  let salt = SaltString::generate(&mut OsRng);
  Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    .hash_password(password.as_bytes(), &salt)
    .unwrap()
    .to_string()
}

struct School {
  store:   Arc<SqliteStore>,
  class:   Class,
  course:  Course,
  teacher: Teacher,
  student: Student,
  other:   Student,
}

async fn school() -> School {
  let store = SqliteStore::open_in_memory().await.unwrap();

  for (username, level) in [("root", AdminLevel::Super), ("office", AdminLevel::Manager)] {
    store
      .create_admin(NewAdmin {
        username:      username.into(),
        email:         format!("{username}@school.test"),
        password_hash: cheap_hash(PASSWORD),
        level,
      })
      .await
      .unwrap();
  }

  let class = store.create_class(NewClass::normalized(9, "B").unwrap()).await.unwrap();
  let course = store
    .create_course(NewCourse { name: "Maths".into(), class_ids: vec![class.id] })
    .await
    .unwrap();
  let teacher = store
    .create_teacher(NewTeacher {
      name:          "Ms Ada".into(),
      email:         "ada@school.test".into(),
      password_hash: cheap_hash(PASSWORD),
      course_id:     Some(course.id),
      class_ids:     vec![class.id],
    })
    .await
    .unwrap();

  let mut students = Vec::new();
  for no in ["1001", "1002"] {
    students.push(
      store
        .create_student(NewStudent {
          student_no:    no.into(),
          name:          format!("Student {no}"),
          email:         format!("s{no}@school.test"),
          password_hash: cheap_hash(PASSWORD),
          class_id:      class.id,
        })
        .await
        .unwrap(),
    );
  }
  let other = students.pop().unwrap();
  let student = students.pop().unwrap();

  School { store: Arc::new(store), class, course, teacher, student, other }
}

async fn send(
  school: &School,
  method: &str,
  uri: &str,
  login: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(format!("/api{uri}"));
  if let Some(login) = login {
    let encoded = B64.encode(format!("{login}:{PASSWORD}"));
    builder = builder.header(header::AUTHORIZATION, format!("Basic {encoded}"));
  }
  let req = match body {
    Some(body) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let app = axum::Router::new().nest("/api", api_router(school.store.clone()));
  let resp = app.oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

fn grade_body(s: &School, student: &Student, value: f64) -> Value {
  json!({
    "studentId": student.id,
    "courseId": s.course.id,
    "classId": s.class.id,
    "value": value,
  })
}

// ─── Authentication ──────────────────────────────────────────────────────────

#[tokio::test]
async fn health_needs_no_credentials() {
  let s = school().await;
  let (status, body) = send(&s, "GET", "/health", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn missing_credentials_are_challenged() {
  let s = school().await;
  let req = Request::builder().uri("/students").body(Body::empty()).unwrap();
  let resp = api_router(s.store.clone()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
  let s = school().await;
  let encoded = B64.encode("root:nope");
  let req = Request::builder()
    .uri("/session")
    .header(header::AUTHORIZATION, format!("Basic {encoded}"))
    .body(Body::empty())
    .unwrap();
  let resp = api_router(s.store.clone()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_reports_role_and_dashboard() {
  let s = school().await;

  let (status, body) = send(&s, "GET", "/session", Some("ada@school.test"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["role"], "teacher");
  assert_eq!(body["dashboard"], "/teacher/dashboard");
  assert_eq!(body["id"], json!(s.teacher.id));

  let (_, body) = send(&s, "GET", "/session", Some("OFFICE"), None).await;
  assert_eq!(body["role"], "manager");
  assert_eq!(body["dashboard"], "/admin/dashboard");
}

// ─── Grade workflow ──────────────────────────────────────────────────────────

#[tokio::test]
async fn teacher_records_grades_and_average_follows() {
  let s = school().await;
  let teacher = Some("ada@school.test");

  let (status, _) = send(&s, "POST", "/grades", teacher, Some(grade_body(&s, &s.student, 80.0))).await;
  assert_eq!(status, StatusCode::CREATED);
  let (_, body) = send(&s, "POST", "/grades", teacher, Some(grade_body(&s, &s.student, 90.0))).await;
  assert_eq!(body["average"], 85.0);

  let (status, body) =
    send(&s, "POST", "/grades", teacher, Some(grade_body(&s, &s.student, 70.0))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["average"], 80.0);
  assert_eq!(body["newGrade"]["value"], 70.0);
  assert_eq!(body["newGrade"]["teacherId"], json!(s.teacher.id));
  assert_eq!(body["grades"].as_array().unwrap().len(), 3);

  let (_, body) = send(&s, "GET", &format!("/students/{}", s.student.id), Some("root"), None).await;
  assert_eq!(body["overallAverage"], 80.0);
  assert_eq!(body["gradeAverages"][s.course.id.to_string()], 80.0);
  assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn teacher_may_grade_outside_own_classes() {
  let s = school().await;
  let class = s.store.create_class(NewClass::normalized(10, "A").unwrap()).await.unwrap();
  let stranger = s
    .store
    .create_student(NewStudent {
      student_no:    "2001".into(),
      name:          "Student 2001".into(),
      email:         "s2001@school.test".into(),
      password_hash: cheap_hash(PASSWORD),
      class_id:      class.id,
    })
    .await
    .unwrap();

  let body = json!({
    "studentId": stranger.id,
    "courseId": s.course.id,
    "classId": class.id,
    "value": 75.0,
  });
  let (status, body) = send(&s, "POST", "/grades", Some("ada@school.test"), Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["average"], 75.0);
}

#[tokio::test]
async fn only_teachers_write_grades() {
  let s = school().await;
  for login in ["root", "office", "s1001@school.test"] {
    let (status, _) =
      send(&s, "POST", "/grades", Some(login), Some(grade_body(&s, &s.student, 50.0))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{login}");
  }
}

#[tokio::test]
async fn out_of_range_grade_is_rejected_and_not_stored() {
  let s = school().await;
  for value in [-1.0, 100.5] {
    let (status, body) = send(
      &s,
      "POST",
      "/grades",
      Some("ada@school.test"),
      Some(grade_body(&s, &s.student, value)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  let (_, body) =
    send(&s, "GET", &format!("/students/{}/grades", s.student.id), Some("root"), None).await;
  assert_eq!(body["grades"], json!([]));
  assert_eq!(body["average"], Value::Null);
}

#[tokio::test]
async fn grade_for_unknown_student_is_not_found() {
  let s = school().await;
  let mut body = grade_body(&s, &s.student, 50.0);
  body["studentId"] = json!(uuid::Uuid::new_v4());
  let (status, _) = send(&s, "POST", "/grades", Some("ada@school.test"), Some(body)).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
  let s = school().await;
  let (status, body) = send(
    &s,
    "POST",
    "/grades",
    Some("ada@school.test"),
    Some(json!({ "studentId": s.student.id, "value": 50 })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (status, _) = send(&s, "GET", "/students/not-a-uuid", Some("root"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn students_read_only_their_own_grades() {
  let s = school().await;
  send(&s, "POST", "/grades", Some("ada@school.test"), Some(grade_body(&s, &s.other, 40.0))).await;

  let me = Some("s1001@school.test");
  let (status, body) =
    send(&s, "GET", &format!("/students/{}/grades", s.student.id), me, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["average"], Value::Null);

  let (status, _) = send(&s, "GET", &format!("/students/{}/grades", s.other.id), me, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, body) = send(&s, "GET", "/grades", me, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!([]));
}

// ─── Roster ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn manager_creates_but_cannot_delete() {
  let s = school().await;

  let (status, body) = send(
    &s,
    "POST",
    "/students",
    Some("office"),
    Some(json!({
      "studentNo": "1003",
      "name": "New Student",
      "email": "s1003@school.test",
      "password": "pw",
      "classId": s.class.id,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let id = body["id"].as_str().unwrap().to_string();

  let (status, _) = send(&s, "DELETE", &format!("/students/{id}"), Some("office"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, _) = send(&s, "DELETE", &format!("/students/{id}"), Some("root"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&s, "GET", &format!("/students/{id}"), Some("root"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
  let s = school().await;
  let (status, body) = send(
    &s,
    "POST",
    "/students",
    Some("root"),
    Some(json!({
      "studentNo": "2001",
      "name": "Copy",
      "email": "s1001@school.test",
      "password": "pw",
      "classId": s.class.id,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn class_with_students_cannot_be_deleted() {
  let s = school().await;
  let (status, _) = send(&s, "DELETE", &format!("/classes/{}", s.class.id), Some("root"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, body) =
    send(&s, "POST", "/classes", Some("root"), Some(json!({ "grade": 10, "section": "a" }))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["name"], "10-A");
  let (_, body) = send(&s, "GET", "/classes", Some("s1001@school.test"), None).await;
  assert_eq!(body[0]["name"], "10-A");
}

#[tokio::test]
async fn points_and_badges() {
  let s = school().await;
  let (status, badge) = send(
    &s,
    "POST",
    "/badges",
    Some("root"),
    Some(json!({
      "name": "Helper",
      "description": "Helped a classmate",
      "category": "social",
      "icon": "hands",
      "criteria": "Help three classmates",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let uri = format!("/students/{}/points", s.student.id);
  send(&s, "POST", &uri, Some("ada@school.test"), Some(json!({ "points": 15 }))).await;
  let (_, body) = send(&s, "POST", &uri, Some("ada@school.test"), Some(json!({ "points": -5 }))).await;
  assert_eq!(body["points"], 10);

  let uri = format!("/students/{}/badges", s.student.id);
  let award = json!({ "badgeId": badge["id"] });
  send(&s, "POST", &uri, Some("office"), Some(award.clone())).await;
  let (status, body) = send(&s, "POST", &uri, Some("office"), Some(award)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["badges"].as_array().unwrap().len(), 1);

  let (status, _) = send(&s, "POST", &uri, Some("s1001@school.test"), Some(json!({ "badgeId": badge["id"] }))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn overflowing_points_leave_student_readable() {
  let s = school().await;
  let teacher = Some("ada@school.test");
  let uri = format!("/students/{}/points", s.student.id);

  send(&s, "POST", &uri, teacher, Some(json!({ "points": 1 }))).await;
  let (status, body) = send(&s, "POST", &uri, teacher, Some(json!({ "points": i64::MAX }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (status, body) =
    send(&s, "GET", &format!("/students/{}", s.student.id), Some("root"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["points"], 1);
  let (status, _) = send(&s, "GET", "/students", Some("root"), None).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn last_super_admin_cannot_be_removed() {
  let s = school().await;
  let (_, admins) = send(&s, "GET", "/admins", Some("root"), None).await;
  let root = admins
    .as_array()
    .unwrap()
    .iter()
    .find(|a| a["username"] == "root")
    .unwrap()["id"]
    .as_str()
    .unwrap()
    .to_string();

  let (status, _) = send(&s, "DELETE", &format!("/admins/{root}"), Some("root"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
  let demote = json!({ "username": "root", "email": "root@school.test", "level": "manager" });
  let (status, _) = send(&s, "PUT", &format!("/admins/{root}"), Some("root"), Some(demote)).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) = send(&s, "GET", "/admins", Some("office"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ─── Self-service ────────────────────────────────────────────────────────────

#[tokio::test]
async fn teacher_dashboard_and_homework() {
  let s = school().await;
  let teacher = Some("ada@school.test");

  let (status, hw) = send(
    &s,
    "POST",
    "/teacher/homework",
    teacher,
    Some(json!({
      "title": "Essay",
      "description": "Two pages",
      "classId": s.class.id,
      "dueDate": "2999-01-01T00:00:00Z",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (_, dash) = send(&s, "GET", "/teacher/dashboard", teacher, None).await;
  assert_eq!(dash, json!({ "classCount": 1, "studentCount": 2, "homeworkCount": 1 }));

  let (_, classes) = send(&s, "GET", "/teacher/classes", teacher, None).await;
  assert_eq!(classes[0]["studentCount"], 2);
  assert_eq!(classes[0]["name"], "9-B");

  let (_, students) = send(&s, "GET", "/teacher/students", teacher, None).await;
  assert_eq!(students.as_array().unwrap().len(), 2);
  assert_eq!(students[0]["className"], "9-B");

  let (_, course) = send(&s, "GET", "/teacher/course", teacher, None).await;
  assert_eq!(course["courseId"], json!(s.course.id));

  let me = Some("s1001@school.test");
  let submit = format!("/student/homework/{}/submit", hw["id"].as_str().unwrap());
  let (status, sub) = send(&s, "POST", &submit, me, None).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(sub["status"], "submitted");
  let (status, _) = send(&s, "POST", &submit, me, None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (_, mine) = send(&s, "GET", "/student/homework", me, None).await;
  assert_eq!(mine[0]["submitted"], true);
  let (_, theirs) = send(&s, "GET", "/student/homework", Some("s1002@school.test"), None).await;
  assert_eq!(theirs[0]["submitted"], false);

  let (status, _) = send(&s, "GET", "/teacher/dashboard", me, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dashboard_ignores_deleted_classes() {
  let s = school().await;
  let teacher = Some("ada@school.test");
  let spare = s.store.create_class(NewClass::normalized(10, "C").unwrap()).await.unwrap();
  s.store
    .update_teacher(s.teacher.id, TeacherUpdate {
      name:      s.teacher.name.clone(),
      email:     s.teacher.email.clone(),
      course_id: s.teacher.course_id,
      class_ids: vec![s.class.id, spare.id],
    })
    .await
    .unwrap()
    .unwrap();

  let (_, dash) = send(&s, "GET", "/teacher/dashboard", teacher, None).await;
  assert_eq!(dash["classCount"], 2);

  let (status, _) = send(&s, "DELETE", &format!("/classes/{}", spare.id), Some("root"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, dash) = send(&s, "GET", "/teacher/dashboard", teacher, None).await;
  let (_, classes) = send(&s, "GET", "/teacher/classes", teacher, None).await;
  assert_eq!(dash["classCount"], 1);
  assert_eq!(classes.as_array().unwrap().len(), 1);
  assert_eq!(dash["studentCount"], 2);
}

#[tokio::test]
async fn student_courses_show_own_average() {
  let s = school().await;
  send(&s, "POST", "/grades", Some("ada@school.test"), Some(grade_body(&s, &s.student, 64.0))).await;

  let (_, mine) = send(&s, "GET", "/student/courses", Some("s1001@school.test"), None).await;
  assert_eq!(mine[0]["name"], "Maths");
  assert_eq!(mine[0]["average"], 64.0);

  let (_, theirs) = send(&s, "GET", "/student/courses", Some("s1002@school.test"), None).await;
  assert_eq!(theirs[0]["average"], Value::Null);

  let (_, averages) =
    send(&s, "GET", &format!("/classes/{}/averages", s.class.id), Some("root"), None).await;
  assert_eq!(averages["averages"][s.course.id.to_string()], 64.0);
}
