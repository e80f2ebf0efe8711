//! Handlers for `/badges` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/badges` | The catalogue |
//! | `POST` | `/badges` | Admins only; returns 201 |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use slate_core::{
  access::{Operation, authorize},
  gamification::{Badge, NewBadge},
  gradebook::store_err,
  store::SchoolStore,
};

use super::required;
use crate::{auth::Authenticated, error::ApiError, extract::Json};

/// `GET /badges`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
) -> Result<Json<Vec<Badge>>, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::ViewCatalogue)?;
  Ok(Json(store.list_badges().await.map_err(store_err)?))
}

/// `POST /badges` — body: `{name, description, category, icon, criteria}`.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Json(body): Json<NewBadge>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SchoolStore + 'static,
{
  authorize(&caller, Operation::DefineBadges)?;
  let input = NewBadge { name: required("name", &body.name)?, ..body };
  let badge = store.create_badge(input).await.map_err(store_err)?;
  tracing::info!(badge = %badge.id, name = %badge.name, "badge defined");
  Ok((StatusCode::CREATED, Json(badge)))
}
