//! Health check and the signed-in caller.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/health` | No auth |
//! | `GET`  | `/session` | `{id, role, name, dashboard}` |

use serde::Serialize;
use serde_json::{Value, json};
use slate_core::access::Role;
use uuid::Uuid;

use crate::{auth::Authenticated, extract::Json};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  pub id:        Uuid,
  pub role:      Role,
  pub name:      String,
  /// Where the client should land after sign-in.
  pub dashboard: &'static str,
}

/// `GET /health`
pub async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// `GET /session`
pub async fn current(Authenticated(caller): Authenticated) -> Json<Session> {
  Json(Session {
    id:        caller.id,
    role:      caller.role,
    dashboard: caller.role.dashboard_path(),
    name:      caller.name,
  })
}
