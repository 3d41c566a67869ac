//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use rally_core::{
  Attendance, Event, Hangout, Identity,
  patch::{apply_patch, build_document},
  store::{Authenticator, DocumentStore},
};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn object(value: Value) -> Map<String, Value> {
  match value {
    Value::Object(map) => map,
    other => panic!("expected object, got {other}"),
  }
}

fn listing(title: &str) -> Map<String, Value> {
  object(json!({
    "title": title,
    "description": "d",
    "date": "2024-01-01",
    "location": "x",
  }))
}

fn event(owner: Identity, title: &str) -> Event {
  build_document(owner, listing(title), Utc::now()).unwrap()
}

fn attendance_for_event(owner: Identity, event_id: Uuid) -> Attendance {
  build_document(
    owner,
    object(json!({ "going": true, "event": event_id })),
    Utc::now(),
  )
  .unwrap()
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_find_by_id() {
  let s = store().await;
  let owner = Identity::new_v4();

  let created = s.insert(event(owner, "A")).await.unwrap();
  let fetched = s.find_by_id::<Event>(created.id).await.unwrap().unwrap();

  assert_eq!(fetched, created);
  assert_eq!(fetched.owner, owner);
}

#[tokio::test]
async fn find_by_id_missing_returns_none() {
  let s = store().await;
  let result = s.find_by_id::<Event>(Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn find_by_id_does_not_cross_kinds() {
  let s = store().await;
  let created = s.insert(event(Identity::new_v4(), "A")).await.unwrap();

  let as_hangout = s.find_by_id::<Hangout>(created.id).await.unwrap();
  assert!(as_hangout.is_none());
}

#[tokio::test]
async fn find_all_returns_every_owner_in_insertion_order() {
  let s = store().await;
  s.insert(event(Identity::new_v4(), "first")).await.unwrap();
  s.insert(event(Identity::new_v4(), "second")).await.unwrap();
  s.insert(event(Identity::new_v4(), "third")).await.unwrap();
  let hangout: Hangout =
    build_document(Identity::new_v4(), listing("elsewhere"), Utc::now()).unwrap();
  s.insert(hangout).await.unwrap();

  let events = s.find_all::<Event>().await.unwrap();
  let titles: Vec<_> = events.iter().map(|e| e.listing.title.as_str()).collect();
  assert_eq!(titles, ["first", "second", "third"]);

  let hangouts = s.find_all::<Hangout>().await.unwrap();
  assert_eq!(hangouts.len(), 1);
}

#[tokio::test]
async fn update_overwrites_body() {
  let s = store().await;
  let owner = Identity::new_v4();
  let created = s.insert(event(owner, "A")).await.unwrap();

  let patched =
    apply_patch(&created, object(json!({ "title": "B" })), Utc::now()).unwrap();
  assert!(s.update(patched).await.unwrap());

  let fetched = s.find_by_id::<Event>(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.listing.title, "B");
  assert_eq!(fetched.listing.location, "x");
}

#[tokio::test]
async fn update_missing_returns_false() {
  let s = store().await;
  assert!(!s.update(event(Identity::new_v4(), "ghost")).await.unwrap());
}

#[tokio::test]
async fn delete_removes_document() {
  let s = store().await;
  let created = s.insert(event(Identity::new_v4(), "A")).await.unwrap();

  assert!(s.delete::<Event>(created.id).await.unwrap());
  let fetched = s.find_by_id::<Event>(created.id).await.unwrap();
  assert!(fetched.is_none());
  assert!(!s.delete::<Event>(created.id).await.unwrap());
}

#[tokio::test]
async fn find_by_parent_filters_attendances() {
  let s = store().await;
  let owner = Identity::new_v4();
  let first = s.insert(event(owner, "first")).await.unwrap();
  let second = s.insert(event(owner, "second")).await.unwrap();

  s.insert(attendance_for_event(owner, first.id)).await.unwrap();
  s.insert(attendance_for_event(Identity::new_v4(), first.id)).await.unwrap();
  s.insert(attendance_for_event(owner, second.id)).await.unwrap();

  let found = s.find_by_parent::<Attendance>(first.id).await.unwrap();
  assert_eq!(found.len(), 2);
  assert!(found.iter().all(|a| a.parent.id() == first.id));

  let none = s.find_by_parent::<Attendance>(Uuid::new_v4()).await.unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn update_moves_parent_index() {
  let s = store().await;
  let owner = Identity::new_v4();
  let created = s
    .insert(attendance_for_event(owner, Uuid::new_v4()))
    .await
    .unwrap();

  let hangout_id = Uuid::new_v4();
  let moved = apply_patch(
    &created,
    object(json!({ "hangout": hangout_id })),
    Utc::now(),
  )
  .unwrap();
  s.update(moved).await.unwrap();

  let found = s.find_by_parent::<Attendance>(hangout_id).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].id, created.id);
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn registered_token_identifies_user() {
  let s = store().await;
  let identity = s.register_token("a@example.com", "digest-a").await.unwrap();

  assert_eq!(s.identify("digest-a").await.unwrap(), Some(identity));
  assert_eq!(s.identify("digest-b").await.unwrap(), None);
}

#[tokio::test]
async fn reregistering_rotates_token_but_keeps_identity() {
  let s = store().await;
  let first = s.register_token("a@example.com", "old").await.unwrap();
  let second = s.register_token("a@example.com", "new").await.unwrap();

  assert_eq!(first, second);
  assert_eq!(s.identify("old").await.unwrap(), None);
  assert_eq!(s.identify("new").await.unwrap(), Some(first));
}

#[tokio::test]
async fn revoked_token_no_longer_identifies() {
  let s = store().await;
  s.register_token("a@example.com", "digest").await.unwrap();

  assert!(s.revoke_token("a@example.com").await.unwrap());
  assert_eq!(s.identify("digest").await.unwrap(), None);
  assert!(!s.revoke_token("nobody@example.com").await.unwrap());
}

#[tokio::test]
async fn emails_of_resolves_known_users_only() {
  let s = store().await;
  let alice = s.register_token("alice@example.com", "a").await.unwrap();
  let bob = s.register_token("bob@example.com", "b").await.unwrap();
  let stranger = Identity::new_v4();

  let emails = s.emails_of(&[alice, bob, stranger]).await.unwrap();
  assert_eq!(emails.len(), 2);
  assert_eq!(emails[&alice], "alice@example.com");
  assert_eq!(emails[&bob], "bob@example.com");
  assert!(!emails.contains_key(&stranger));

  assert!(s.emails_of(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn revoked_user_keeps_email() {
  let s = store().await;
  let alice = s.register_token("alice@example.com", "a").await.unwrap();
  s.revoke_token("alice@example.com").await.unwrap();

  let emails = s.emails_of(&[alice]).await.unwrap();
  assert_eq!(emails[&alice], "alice@example.com");
}
