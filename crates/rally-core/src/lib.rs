//! Core types and trait definitions for the Rally backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::DocumentStore`] and
//! [`store::Authenticator`]; the API layer composes them with the
//! [`guard`] and [`sanitize`] helpers.

pub mod document;
pub mod error;
pub mod guard;
pub mod identity;
pub mod patch;
pub mod sanitize;
pub mod store;

pub use document::{
  Attendance, Document, Event, Hangout, Listing, MutationReply, ParentRef,
  ResourceKind,
};
pub use error::{Error, Result};
pub use identity::Identity;
