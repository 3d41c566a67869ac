//! Document types: events, hangouts and attendances.
//!
//! Every document is owned by exactly one [`Identity`], fixed at creation.
//! Documents are stored as JSON bodies, so the serde representation here is
//! also the wire format of the REST API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Error, Result, identity::Identity};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The three resource kinds served by Rally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
  Event,
  Hangout,
  Attendance,
}

impl ResourceKind {
  /// Envelope key for a single document, e.g. `{"event": {...}}`.
  pub fn singular(self) -> &'static str {
    match self {
      Self::Event => "event",
      Self::Hangout => "hangout",
      Self::Attendance => "attendance",
    }
  }

  /// Envelope key for a collection, e.g. `{"events": [...]}`.
  pub fn plural(self) -> &'static str {
    match self {
      Self::Event => "events",
      Self::Hangout => "hangouts",
      Self::Attendance => "attendances",
    }
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.singular())
  }
}

/// What a successful create, update or delete answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationReply {
  /// `201` + the created item on create, `204` with no body otherwise.
  Item,
  /// `200` + the whole collection, re-read after the write.
  Collection,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A storable, owned document.
pub trait Document:
  Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
  const KIND: ResourceKind;
  const MUTATION_REPLY: MutationReply = MutationReply::Item;

  fn id(&self) -> Uuid;

  fn owner(&self) -> Identity;

  /// `(created_at, updated_at)`.
  fn timestamps(&self) -> (DateTime<Utc>, DateTime<Utc>);

  /// The referenced parent, for kinds that have one.
  fn parent(&self) -> Option<ParentRef> { None }

  /// Check required fields beyond what deserialization already enforces.
  fn validate(&self) -> Result<()>;

  /// Check the raw JSON body before it is deserialized.
  fn check_fields(_fields: &Map<String, Value>) -> Result<()> { Ok(()) }

  /// Keys of the stored body that must be dropped before `patch` is merged
  /// in. Lets a patch swap one mutually-exclusive key for another.
  fn displaced_keys(_patch: &Map<String, Value>) -> &'static [&'static str] {
    &[]
  }
}

// ─── Events and hangouts ─────────────────────────────────────────────────────

/// The descriptive fields shared by events and hangouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
  pub title:       String,
  pub description: String,
  /// Free-form date text as entered by the client.
  pub date:        String,
  pub location:    String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub picture:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub website:     Option<String>,
}

impl Listing {
  fn validate(&self, kind: ResourceKind) -> Result<()> {
    let required = [
      ("title", &self.title),
      ("description", &self.description),
      ("date", &self.date),
      ("location", &self.location),
    ];
    match required.iter().find(|(_, value)| value.is_empty()) {
      Some((field, _)) => {
        Err(Error::validation(kind, format!("`{field}` is required")))
      }
      None => Ok(()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub id:         Uuid,
  pub owner:      Identity,
  #[serde(flatten)]
  pub listing:    Listing,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Document for Event {
  const KIND: ResourceKind = ResourceKind::Event;

  fn id(&self) -> Uuid { self.id }

  fn owner(&self) -> Identity { self.owner }

  fn timestamps(&self) -> (DateTime<Utc>, DateTime<Utc>) {
    (self.created_at, self.updated_at)
  }

  fn validate(&self) -> Result<()> { self.listing.validate(Self::KIND) }
}

/// Same shape as [`Event`]; mutations answer with the full collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hangout {
  pub id:         Uuid,
  pub owner:      Identity,
  #[serde(flatten)]
  pub listing:    Listing,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Document for Hangout {
  const KIND: ResourceKind = ResourceKind::Hangout;
  const MUTATION_REPLY: MutationReply = MutationReply::Collection;

  fn id(&self) -> Uuid { self.id }

  fn owner(&self) -> Identity { self.owner }

  fn timestamps(&self) -> (DateTime<Utc>, DateTime<Utc>) {
    (self.created_at, self.updated_at)
  }

  fn validate(&self) -> Result<()> { self.listing.validate(Self::KIND) }
}

// ─── Attendances ─────────────────────────────────────────────────────────────

/// The event or hangout an attendance concerns.
///
/// Serialised flattened into the attendance as either `"event": "<id>"` or
/// `"hangout": "<id>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentRef {
  Event(Uuid),
  Hangout(Uuid),
}

impl ParentRef {
  const KEYS: &'static [&'static str] = &["event", "hangout"];

  pub fn id(&self) -> Uuid {
    match self {
      Self::Event(id) | Self::Hangout(id) => *id,
    }
  }

  pub fn kind(&self) -> ResourceKind {
    match self {
      Self::Event(_) => ResourceKind::Event,
      Self::Hangout(_) => ResourceKind::Hangout,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
  pub id:         Uuid,
  pub owner:      Identity,
  pub going:      bool,
  #[serde(flatten)]
  pub parent:     ParentRef,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Document for Attendance {
  const KIND: ResourceKind = ResourceKind::Attendance;

  fn id(&self) -> Uuid { self.id }

  fn owner(&self) -> Identity { self.owner }

  fn timestamps(&self) -> (DateTime<Utc>, DateTime<Utc>) {
    (self.created_at, self.updated_at)
  }

  fn parent(&self) -> Option<ParentRef> { Some(self.parent) }

  fn validate(&self) -> Result<()> { Ok(()) }

  fn check_fields(fields: &Map<String, Value>) -> Result<()> {
    let parents = ParentRef::KEYS
      .iter()
      .filter(|key| fields.contains_key(**key))
      .count();
    if parents == 1 {
      Ok(())
    } else {
      Err(Error::validation(
        Self::KIND,
        "exactly one of `event` or `hangout` is required",
      ))
    }
  }

  fn displaced_keys(patch: &Map<String, Value>) -> &'static [&'static str] {
    if ParentRef::KEYS.iter().any(|key| patch.contains_key(*key)) {
      ParentRef::KEYS
    } else {
      &[]
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn attendance_parent_is_flattened() {
    let event_id = Uuid::new_v4();
    let attendance = Attendance {
      id:         Uuid::new_v4(),
      owner:      Identity::new_v4(),
      going:      true,
      parent:     ParentRef::Event(event_id),
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };

    let value = serde_json::to_value(&attendance).unwrap();
    assert_eq!(value["event"], json!(event_id));
    assert!(value.get("hangout").is_none());

    let back: Attendance = serde_json::from_value(value).unwrap();
    assert_eq!(back.parent, ParentRef::Event(event_id));
  }

  #[test]
  fn optional_listing_fields_are_omitted() {
    let listing = Listing {
      title:       "A".into(),
      description: "d".into(),
      date:        "2024-01-01".into(),
      location:    "x".into(),
      picture:     None,
      website:     Some("https://example.com".into()),
    };
    let value = serde_json::to_value(&listing).unwrap();
    assert!(value.get("picture").is_none());
    assert_eq!(value["website"], "https://example.com");
  }

  #[test]
  fn blank_required_listing_field_fails_validation() {
    let listing = Listing {
      title:       "A".into(),
      description: String::new(),
      date:        "2024-01-01".into(),
      location:    "x".into(),
      picture:     None,
      website:     None,
    };
    let err = listing.validate(ResourceKind::Event).unwrap_err();
    assert!(err.to_string().contains("description"), "{err}");
  }

  #[test]
  fn attendance_needs_exactly_one_parent() {
    let both = json!({ "event": Uuid::new_v4(), "hangout": Uuid::new_v4() });
    assert!(Attendance::check_fields(both.as_object().unwrap()).is_err());
    let neither = json!({ "going": true });
    assert!(Attendance::check_fields(neither.as_object().unwrap()).is_err());
    let one = json!({ "hangout": Uuid::new_v4() });
    assert!(Attendance::check_fields(one.as_object().unwrap()).is_ok());
  }

  #[test]
  fn parent_keys_are_displaced_only_when_patched() {
    let patch = json!({ "hangout": Uuid::new_v4() });
    assert_eq!(
      Attendance::displaced_keys(patch.as_object().unwrap()),
      &["event", "hangout"]
    );
    let patch = json!({ "going": false });
    assert!(Attendance::displaced_keys(patch.as_object().unwrap()).is_empty());
  }
}
