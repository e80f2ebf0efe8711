//! Handlers for `/admins` endpoints. Super admins only.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admins` | |
//! | `POST`   | `/admins` | Body: [`CreateBody`]; level defaults to `manager` |
//! | `PUT`    | `/admins/{id}` | Body: [`UpdateBody`]; 409 when demoting the last super admin |
//! | `DELETE` | `/admins/{id}` | 204; 409 for the last super admin |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use slate_core::{
  access::{Operation, authorize},
  gradebook::store_err,
  staff::{Admin, AdminLevel, AdminUpdate, NewAdmin},
  store::SchoolStore,
};
use uuid::Uuid;

use super::{email, not_found, required};
use crate::{
  auth::{Authenticated, hash_password},
  error::ApiError,
  extract::{Json, Path},
};

/// `GET /admins`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<Vec<Admin>>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ManageAdmins)?;
  Ok(Json(store.list_admins().await.map_err(store_err)?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub username: String,
  pub email:    String,
  pub password: String,
  #[serde(default)]
  pub level:    AdminLevel,
}

/// `POST /admins`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ManageAdmins)?;
  let input = NewAdmin {
    username:      required("username", &body.username)?,
    email:         email(&body.email)?,
    password_hash: hash_password(&required("password", &body.password)?)?,
    level:         body.level,
  };
  let admin = store.create_admin(input).await.map_err(store_err)?;
  tracing::info!(admin = %admin.id, level = ?admin.level, by = %caller.id, "admin created");
  Ok((StatusCode::CREATED, Json(admin)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub username: String,
  pub email:    String,
  pub level:    AdminLevel,
}

/// `PUT /admins/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Admin>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ManageAdmins)?;
  let update = AdminUpdate {
    username: required("username", &body.username)?,
    email:    email(&body.email)?,
    level:    body.level,
  };

  let admin = store
    .update_admin(id, update)
    .await
    .map_err(store_err)?
    .ok_or_else(|| not_found("admin", id))?;
  Ok(Json(admin))
}

/// `DELETE /admins/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ManageAdmins)?;
  if !store.delete_admin(id).await.map_err(store_err)? {
    return Err(not_found("admin", id));
  }
  tracing::info!(admin = %id, by = %caller.id, "admin deleted");
  Ok(StatusCode::NO_CONTENT)
}
