//! Server assembly for Slate: configuration, first-run bootstrap and the
//! top-level HTTP application.

use std::{
  collections::HashSet,
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use serde::Deserialize;
use slate_core::{
  gamification::default_catalogue,
  staff::{Admin, AdminLevel, NewAdmin},
  store::SchoolStore,
};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SLATE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                          String,
  pub port:                          u16,
  pub store_path:                    PathBuf,
  /// First super admin, created when the store has no admins at all.
  pub bootstrap_admin_username:      Option<String>,
  pub bootstrap_admin_email:         Option<String>,
  /// PHC string, as printed by `--hash-password`.
  pub bootstrap_admin_password_hash: Option<String>,
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The API nested under `/api`, with request tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: SchoolStore + 'static,
{
  Router::new()
    .nest("/api", slate_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

// ─── Bootstrap ────────────────────────────────────────────────────────────────

/// Create the configured super admin if the store has no admins yet.
///
/// Returns the new admin, or `None` when admins already exist or no
/// bootstrap account is configured.
pub async fn bootstrap_admin<S>(store: &S, config: &ServerConfig) -> anyhow::Result<Option<Admin>>
where
  S: SchoolStore,
{
  if store.count_admins(None).await? > 0 {
    return Ok(None);
  }

  let (Some(username), Some(email), Some(password_hash)) = (
    config.bootstrap_admin_username.clone(),
    config.bootstrap_admin_email.clone(),
    config.bootstrap_admin_password_hash.clone(),
  ) else {
    tracing::warn!("no administrators exist and no bootstrap admin is configured");
    return Ok(None);
  };

  let admin = store
    .create_admin(NewAdmin { username, email, password_hash, level: AdminLevel::Super })
    .await?;
  tracing::info!(admin = %admin.id, username = %admin.username, "bootstrap super admin created");
  Ok(Some(admin))
}

/// Insert the default badge catalogue, skipping names already present.
/// Returns how many badges were added.
pub async fn seed_badges<S>(store: &S) -> anyhow::Result<usize>
where
  S: SchoolStore,
{
  let existing: HashSet<String> =
    store.list_badges().await?.into_iter().map(|b| b.name).collect();

  let mut added = 0;
  for badge in default_catalogue() {
    if existing.contains(&badge.name) {
      continue;
    }
    store.create_badge(badge).await?;
    added += 1;
  }
  tracing::info!(added, "badge catalogue seeded");
  Ok(added)
}
