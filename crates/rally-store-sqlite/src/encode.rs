//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings and document bodies as compact JSON.

use chrono::{DateTime, Utc};
use rally_core::{Document, Identity, ResourceKind};
use uuid::Uuid;

use crate::Result;

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn encode_kind(kind: ResourceKind) -> &'static str { kind.singular() }

pub fn decode_identity(s: &str) -> Result<Identity> {
  decode_uuid(s).map(Identity)
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// The column values of one `documents` row, ready to bind.
pub struct DocumentRow {
  pub doc_id:     String,
  pub kind:       &'static str,
  pub owner_id:   String,
  pub parent_id:  Option<String>,
  pub body_json:  String,
  pub created_at: String,
  pub updated_at: String,
}

impl DocumentRow {
  pub fn encode<D: Document>(doc: &D) -> Result<Self> {
    let (created_at, updated_at) = doc.timestamps();
    Ok(Self {
      doc_id:     encode_uuid(doc.id()),
      kind:       encode_kind(D::KIND),
      owner_id:   encode_uuid(doc.owner().as_uuid()),
      parent_id:  doc.parent().map(|p| encode_uuid(p.id())),
      body_json:  serde_json::to_string(doc)?,
      created_at: encode_dt(created_at),
      updated_at: encode_dt(updated_at),
    })
  }
}

pub fn decode_body<D: Document>(body_json: &str) -> Result<D> {
  Ok(serde_json::from_str(body_json)?)
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;
  use rally_core::{Event, patch::build_document};
  use serde_json::json;

  use super::*;

  #[test]
  fn row_carries_document_timestamps() {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let fields = json!({
      "title": "A",
      "description": "d",
      "date": "2024-01-01",
      "location": "x",
    });
    let event: Event = build_document(
      Identity::new_v4(),
      fields.as_object().unwrap().clone(),
      created,
    )
    .unwrap();

    let row = DocumentRow::encode(&event).unwrap();
    assert_eq!(row.created_at, encode_dt(created));
    assert_eq!(row.updated_at, encode_dt(created));
    assert_eq!(row.kind, "event");
    assert!(row.parent_id.is_none());
  }
}
