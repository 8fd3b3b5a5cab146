//! In-process backend for tests and local development.
//!
//! Every operation runs under one lock, so a filtered update is atomic with
//! respect to concurrent callers, matching a single `PostgREST` `PATCH`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;
use uuid::Uuid;

use rocky_gym_core::{Email, UserId};

use super::{AuthSession, AuthUser, Backend, BackendError, Filter, Query};

const PUBLIC_URL_PREFIX: &str = "memory://rocky-gym";

/// Backend that keeps tables, accounts and objects in memory.
///
/// Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Value>>,
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, AuthUser>,
    objects: HashMap<(String, String), StoredObject>,
    unavailable: bool,
    failing: HashSet<(TableOp, String)>,
}

/// Table operations that can be made to fail with [`InMemoryBackend::fail_on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableOp {
    Select,
    Insert,
    Update,
}

struct Account {
    user: AuthUser,
    password: SecretString,
}

struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

impl InMemoryBackend {
    /// An empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend seeded with a small gym: lockers in every status, a
    /// catalog and a price list.
    #[must_use]
    pub fn demo() -> Self {
        let mut state = MemoryState::default();
        for (table, rows) in demo_tables() {
            state.tables.insert(table.to_string(), rows);
        }
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Append rows to a table. Rows without an `id` get the next free one.
    pub async fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut state = self.state.lock().await;
        let stored = state.tables.entry(table.to_string()).or_default();
        for row in rows {
            push_row(stored, row);
        }
    }

    /// Current contents of a table, in storage order.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .lock()
            .await
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Stored bytes and content type of an object.
    pub async fn object(&self, bucket: &str, path: &str) -> Option<(Vec<u8>, String)> {
        self.state
            .lock()
            .await
            .objects
            .get(&(bucket.to_string(), path.to_string()))
            .map(|o| (o.bytes.clone(), o.content_type.clone()))
    }

    /// Paths of every object stored in `bucket`, sorted.
    pub async fn objects(&self, bucket: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .state
            .lock()
            .await
            .objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, path)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    /// Make every call fail as if the backend were down.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }

    /// Make one operation on one table fail with a 500 until cleared.
    pub async fn fail_on(&self, op: TableOp, table: &str) {
        self.state
            .lock()
            .await
            .failing
            .insert((op, table.to_string()));
    }

    /// Undo [`InMemoryBackend::fail_on`].
    pub async fn clear_failure(&self, op: TableOp, table: &str) {
        self.state
            .lock()
            .await
            .failing
            .remove(&(op, table.to_string()));
    }

    async fn lock(&self) -> Result<tokio::sync::MutexGuard<'_, MemoryState>, BackendError> {
        let state = self.state.lock().await;
        if state.unavailable {
            return Err(BackendError::Rejected {
                status: 503,
                message: "backend unavailable".to_string(),
            });
        }
        Ok(state)
    }

    async fn lock_for(
        &self,
        op: TableOp,
        table: &str,
    ) -> Result<tokio::sync::MutexGuard<'_, MemoryState>, BackendError> {
        let state = self.lock().await?;
        if state.failing.contains(&(op, table.to_string())) {
            return Err(BackendError::Rejected {
                status: 500,
                message: format!("{op:?} on {table} failed"),
            });
        }
        Ok(state)
    }
}

/// Append `row`, assigning `max(id) + 1` when it has no id.
fn push_row(rows: &mut Vec<Value>, mut row: Value) -> Value {
    if let Value::Object(fields) = &mut row
        && fields.get("id").is_none_or(Value::is_null)
    {
        let next = rows
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1;
        fields.insert("id".to_string(), json!(next));
    }
    rows.push(row.clone());
    row
}

fn merge(row: &mut Value, patch: &Map<String, Value>) {
    if let Value::Object(fields) = row {
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let state = self.lock_for(TableOp::Select, table).await?;
        let rows = state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filter_ref().matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(query.arrange(rows))
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        if !row.is_object() {
            return Err(BackendError::Rejected {
                status: 400,
                message: "row must be a JSON object".to_string(),
            });
        }
        let mut state = self.lock_for(TableOp::Insert, table).await?;
        let rows = state.tables.entry(table.to_string()).or_default();
        Ok(push_row(rows, row))
    }

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError> {
        let Value::Object(patch) = patch else {
            return Err(BackendError::Rejected {
                status: 400,
                message: "patch must be a JSON object".to_string(),
            });
        };
        let mut state = self.lock_for(TableOp::Update, table).await?;
        let Some(rows) = state.tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut changed = Vec::new();
        for row in rows.iter_mut().filter(|row| filter.matches(row)) {
            merge(row, &patch);
            changed.push(row.clone());
        }
        Ok(changed)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64, BackendError> {
        let mut state = self.lock().await?;
        let Some(rows) = state.tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !filter.matches(row));
        Ok((before - rows.len()) as u64)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthUser, BackendError> {
        let parsed = Email::parse(email).map_err(|e| BackendError::Rejected {
            status: 400,
            message: e.to_string(),
        })?;
        let key = parsed.as_str().trim().to_lowercase();

        let mut state = self.lock().await?;
        if state.accounts.contains_key(&key) {
            return Err(BackendError::Rejected {
                status: 422,
                message: "User already registered".to_string(),
            });
        }

        let user = AuthUser {
            id: UserId::new(Uuid::new_v4()),
            email: Some(parsed),
            created_at: Utc::now(),
        };
        state.accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: password.clone(),
            },
        );
        Ok(user)
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession, BackendError> {
        let key = email.trim().to_lowercase();
        let mut state = self.lock().await?;

        let user = state
            .accounts
            .get(&key)
            .filter(|account| account.password.expose_secret() == password.expose_secret())
            .map(|account| account.user.clone())
            .ok_or_else(|| BackendError::Rejected {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })?;

        let access_token = Uuid::new_v4().to_string();
        state.tokens.insert(access_token.clone(), user.clone());
        Ok(AuthSession {
            access_token,
            refresh_token: Some(Uuid::new_v4().to_string()),
            expires_in: Some(3600),
            user,
        })
    }

    async fn user_for_token(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        self.lock()
            .await?
            .tokens
            .get(access_token)
            .cloned()
            .ok_or_else(|| BackendError::Unauthorized("invalid JWT".to_string()))
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let mut state = self.lock().await?;
        let key = (bucket.to_string(), path.to_string());
        if state.objects.contains_key(&key) {
            return Err(BackendError::Rejected {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        state.objects.insert(
            key,
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{PUBLIC_URL_PREFIX}/{bucket}/{path}")
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError> {
        let mut state = self.lock().await?;
        for path in paths {
            state.objects.remove(&(bucket.to_string(), path.clone()));
        }
        Ok(())
    }
}

fn demo_tables() -> Vec<(&'static str, Vec<Value>)> {
    vec![
        (
            "lockers",
            vec![
                json!({"id": 1, "number": "A1", "available": true, "status": "available"}),
                json!({"id": 2, "number": "A2", "available": false, "status": "booked"}),
                json!({"id": 3, "number": "A3", "available": true, "status": "available"}),
                json!({"id": 4, "number": "B1", "available": false, "status": "pending"}),
                json!({"id": 5, "number": "B2", "available": true, "status": "available"}),
                json!({"id": 6, "number": "B3", "available": true, "status": "available"}),
            ],
        ),
        (
            "products",
            vec![
                json!({"id": 1, "name": "Shaker Bottle", "description": "700 ml, leak proof", "price": "150", "image": null}),
                json!({"id": 2, "name": "Lifting Belt", "description": "Leather, 10 cm", "price": "850", "image": null}),
                json!({"id": 3, "name": "Wrist Wraps", "description": "Pair, 60 cm", "price": "200", "image": null}),
            ],
        ),
        (
            "supplements",
            vec![
                json!({"id": 1, "name": "Whey Protein", "description": "2 lb", "price": "1800", "image": null,
                       "usage": "One scoop after training", "ingredients": "Whey concentrate, cocoa"}),
                json!({"id": 2, "name": "Creatine", "description": "300 g", "price": "950", "image": null,
                       "usage": "5 g daily", "ingredients": "Creatine monohydrate"}),
            ],
        ),
        (
            "exercises",
            vec![
                json!({"id": 1, "exercise_in_arabic": "ضغط الصدر", "exercise_in_english": "Bench Press"}),
                json!({"id": 2, "exercise_in_arabic": "القرفصاء", "exercise_in_english": "Squat"}),
                json!({"id": 3, "exercise_in_arabic": "الرفعة الميتة", "exercise_in_english": "Deadlift"}),
            ],
        ),
        (
            "gym_pricelist",
            vec![
                json!({"id": 1, "title": "Day Pass", "price": "50", "duration": "day"}),
                json!({"id": 2, "title": "Monthly", "price": "350", "duration": "month"}),
                json!({"id": 3, "title": "Quarterly", "price": "900", "duration": "3 months"}),
                json!({"id": 4, "title": "Annual", "price": "3000", "duration": "year"}),
            ],
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::supabase::Order;

    #[tokio::test]
    async fn test_insert_assigns_next_id() {
        let backend = InMemoryBackend::new();
        backend.seed("lockers", [json!({"id": 4, "number": "A4"})]).await;

        let row = backend
            .insert("lockers", json!({"number": "A5"}))
            .await
            .unwrap();
        assert_eq!(row["id"], 5);
    }

    #[tokio::test]
    async fn test_update_only_touches_matching_rows() {
        let backend = InMemoryBackend::demo();
        let filter = Filter::eq("id", 4).and_eq("status", "available");

        let changed = backend
            .update("lockers", &filter, json!({"status": "pending"}))
            .await
            .unwrap();
        assert!(changed.is_empty());

        let filter = Filter::eq("id", 1).and_eq("status", "available");
        let changed = backend
            .update("lockers", &filter, json!({"available": false, "status": "pending"}))
            .await
            .unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0]["number"], "A1");
        assert_eq!(changed[0]["status"], "pending");
    }

    #[tokio::test]
    async fn test_select_orders_and_limits() {
        let backend = InMemoryBackend::demo();
        let rows = backend
            .select(
                "lockers",
                &Query::all().order_by("id", Order::Descending).limit(2),
            )
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![6, 5]);
    }

    #[tokio::test]
    async fn test_delete_counts_rows() {
        let backend = InMemoryBackend::demo();
        let removed = backend
            .delete("products", &Filter::eq("id", 2))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(backend.rows("products").await.len(), 2);
    }

    #[tokio::test]
    async fn test_auth_round_trip() {
        let backend = InMemoryBackend::new();
        let password = SecretString::from("hunter22");
        let user = backend
            .sign_up("01012345678@rockygym.com", &password)
            .await
            .unwrap();

        let duplicate = backend
            .sign_up("01012345678@rockygym.com", &password)
            .await
            .unwrap_err();
        assert_eq!(duplicate.status(), Some(422));

        let session = backend
            .sign_in("01012345678@rockygym.com", &password)
            .await
            .unwrap();
        let resolved = backend.user_for_token(&session.access_token).await.unwrap();
        assert_eq!(resolved.id, user.id);

        let wrong = backend
            .sign_in("01012345678@rockygym.com", &SecretString::from("nope"))
            .await
            .unwrap_err();
        assert_eq!(wrong.status(), Some(400));

        assert!(matches!(
            backend.user_for_token("bogus").await,
            Err(BackendError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_rejects_overwrite() {
        let backend = InMemoryBackend::new();
        backend
            .upload("profiles", "u/a.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        let err = backend
            .upload("profiles", "u/a.png", vec![4], "image/png")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));

        backend
            .remove("profiles", &["u/a.png".to_string()])
            .await
            .unwrap();
        assert!(backend.object("profiles", "u/a.png").await.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let backend = InMemoryBackend::demo();
        backend.set_unavailable(true).await;
        let err = backend.select("lockers", &Query::all()).await.unwrap_err();
        assert_eq!(err.status(), Some(503));

        backend.set_unavailable(false).await;
        assert!(backend.select("lockers", &Query::all()).await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_on_is_scoped_to_one_table_and_op() {
        let backend = InMemoryBackend::demo();
        backend.fail_on(TableOp::Update, "lockers").await;

        let err = backend
            .update("lockers", &Filter::eq("id", 1), json!({"status": "pending"}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(backend.select("lockers", &Query::all()).await.is_ok());
        assert!(
            backend
                .update("products", &Filter::eq("id", 1), json!({"price": "160"}))
                .await
                .is_ok()
        );

        backend.clear_failure(TableOp::Update, "lockers").await;
        assert!(
            backend
                .update("lockers", &Filter::eq("id", 1), json!({"status": "pending"}))
                .await
                .is_ok()
        );
    }
}
