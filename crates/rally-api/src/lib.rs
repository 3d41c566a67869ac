//! JSON REST API for Rally.
//!
//! Exposes an axum [`Router`] over events, hangouts and attendances, backed
//! by any [`DocumentStore`] and guarded by any [`Authenticator`]. Both are
//! injected through [`AppState`]. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = rally_api::api_router(AppState { store, auth });
//! ```

pub mod auth;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use rally_core::{
  Attendance, Event, Hangout,
  store::{Authenticator, DocumentStore},
};
use serde_json::{Value, json};

pub use error::{ApiError, OWNERSHIP_DENIED_STATUS};
use handlers::{attendances, resource};

// ─── Application state ────────────────────────────────────────────────────────

/// Collaborators threaded through all handlers.
pub struct AppState<S, A> {
  pub store: Arc<S>,
  pub auth:  Arc<A>,
}

impl<S, A> Clone for AppState<S, A> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      auth:  Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, A>(state: AppState<S, A>) -> Router<()>
where
  S: DocumentStore + 'static,
  A: Authenticator + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Events
    .route(
      "/events",
      get(resource::list::<S, A, Event>).post(resource::create::<S, A, Event>),
    )
    .route(
      "/events/{id}",
      get(resource::show::<S, A, Event>)
        .patch(resource::update::<S, A, Event>)
        .delete(resource::delete::<S, A, Event>),
    )
    .route("/events/{id}/attendances", get(attendances::by_parent::<S, A, Event>))
    // Hangouts
    .route(
      "/hangouts",
      get(resource::list::<S, A, Hangout>).post(resource::create::<S, A, Hangout>),
    )
    .route(
      "/hangouts/{id}",
      get(resource::show::<S, A, Hangout>)
        .patch(resource::update::<S, A, Hangout>)
        .delete(resource::delete::<S, A, Hangout>),
    )
    .route(
      "/hangouts/{id}/attendances",
      get(attendances::by_parent::<S, A, Hangout>),
    )
    // Attendances
    .route(
      "/attendances",
      get(attendances::list::<S, A>).post(resource::create::<S, A, Attendance>),
    )
    .route(
      "/attendances/{id}",
      get(resource::show::<S, A, Attendance>)
        .patch(resource::update::<S, A, Attendance>)
        .delete(resource::delete::<S, A, Attendance>),
    )
    .with_state(state)
}

/// `GET /health`: unauthenticated liveness probe.
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Integration tests ────────────────────────────────────────────────────────
