//! In-memory backend and notification recorder shared by the table tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use serde_json::Value as Json;
use serde_json::json;
use tokio::sync::Notify;

use istak_lib::api::FormPart;
use istak_lib::api::MutationBody;
use istak_lib::api::ResourceApi;
use istak_lib::auth::CurrentUser;
use istak_lib::auth::MemorySessionStore;
use istak_lib::auth::SessionGuard;
use istak_lib::auth::SessionToken;
use istak_lib::error::ApiError;
use istak_lib::error::Error;
use istak_lib::model::RecordId;
use istak_lib::model::ResourceKind;
use istak_lib::notify::NoticeKind;
use istak_lib::notify::NotificationSink;

/// A backend holding one collection of JSON rows.
#[derive(Default)]
pub struct FakeApi {
    rows: Mutex<Vec<Json>>,
    next_id: AtomicI64,
    failing_deletes: Mutex<HashSet<RecordId>>,
    list_failure: Mutex<Option<(u16, String)>>,
    mutation_failure: Mutex<Option<(u16, String)>>,
    user: Mutex<Option<CurrentUser>>,
    user_failure: Mutex<Option<u16>>,
    list_gate: Mutex<Option<Arc<Notify>>>,
    pub list_calls: AtomicUsize,
    pub mutation_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
}

impl FakeApi {
    pub fn with_rows(rows: Vec<Json>) -> Arc<Self> {
        let next = rows
            .iter()
            .filter_map(|r| r.get("id").and_then(Json::as_i64))
            .max()
            .unwrap_or(0);
        let api = Self {
            rows: Mutex::new(rows),
            next_id: AtomicI64::new(next + 1),
            ..Default::default()
        };
        Arc::new(api)
    }

    pub fn set_user_role(&self, role: &str) {
        *self.user.lock().unwrap() = Some(CurrentUser {
            role: Some(role.to_string()),
            username: Some("staff".to_string()),
            ..Default::default()
        });
    }

    pub fn fail_user_lookup(&self, status: u16) {
        *self.user_failure.lock().unwrap() = Some(status);
    }

    pub fn fail_delete(&self, id: impl Into<RecordId>) {
        self.failing_deletes.lock().unwrap().insert(id.into());
    }

    pub fn fail_list(&self, status: u16, body: &str) {
        *self.list_failure.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn fail_mutations(&self, status: u16, body: &str) {
        *self.mutation_failure.lock().unwrap() = Some((status, body.to_string()));
    }

    /// Makes the next list call wait until the returned handle is notified.
    pub fn hold_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Removes a row behind the table's back, as another client would.
    pub fn remove_row(&self, id: i64) {
        self.rows.lock().unwrap().retain(|r| r.get("id").and_then(Json::as_i64) != Some(id));
    }

    pub fn row_ids(&self) -> Vec<i64> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.get("id").and_then(Json::as_i64))
            .collect()
    }

    fn check_mutation(&self) -> Result<(), Error> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        match self.mutation_failure.lock().unwrap().clone() {
            Some((status, body)) => Err(ApiError::http(status, body).into()),
            None => Ok(()),
        }
    }
}

fn body_fields(body: &MutationBody) -> serde_json::Map<String, Json> {
    match body {
        MutationBody::Json(map) => map.clone(),
        MutationBody::Multipart(parts) => parts
            .iter()
            .filter_map(|part| match part {
                FormPart::Text { name, value } => Some((name.clone(), Json::String(value.clone()))),
                FormPart::File(file) => Some((file.field.clone(), json!(format!("/media/{}", file.file_name)))),
            })
            .collect(),
    }
}

fn row_id(row: &Json) -> Option<RecordId> {
    row.get("id").and_then(RecordId::from_json)
}

#[async_trait]
impl ResourceApi for FakeApi {
    async fn list(&self, _kind: ResourceKind, _token: &SessionToken) -> Result<Json, Error> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.list_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some((status, body)) = self.list_failure.lock().unwrap().clone() {
            return Err(ApiError::http(status, body).into());
        }
        let rows = self.rows.lock().unwrap().clone();
        Ok(json!({ "count": rows.len(), "results": rows }))
    }

    async fn create(&self, _kind: ResourceKind, body: &MutationBody, _token: &SessionToken) -> Result<Json, Error> {
        self.check_mutation()?;
        let mut row = body_fields(body);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        row.insert("id".to_string(), json!(id));
        let row = Json::Object(row);
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        _kind: ResourceKind,
        id: &RecordId,
        body: &MutationBody,
        _token: &SessionToken,
    ) -> Result<Json, Error> {
        self.check_mutation()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| row_id(r).as_ref() == Some(id))
            .ok_or_else(|| Error::from(ApiError::http(404, r#"{"detail": "Not found."}"#)))?;
        if let Json::Object(map) = &mut *row {
            map.extend(body_fields(body));
        }
        Ok(row.clone())
    }

    async fn delete(&self, _kind: ResourceKind, id: &RecordId, _token: &SessionToken) -> Result<(), Error> {
        self.check_mutation()?;
        if self.failing_deletes.lock().unwrap().contains(id) {
            return Err(ApiError::http(500, "Internal Server Error").into());
        }
        self.rows.lock().unwrap().retain(|r| row_id(r).as_ref() != Some(id));
        Ok(())
    }

    async fn current_user(&self, _token: &SessionToken) -> Result<CurrentUser, Error> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.user_failure.lock().unwrap() {
            return Err(ApiError::http(status, r#"{"detail": "Given token not valid for any token type"}"#).into());
        }
        self.user
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::http(404, "Not found").into())
    }
}

/// Records every notice it receives.
#[derive(Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<(NoticeKind, String, Option<String>)>>,
}

impl RecordingSink {
    pub fn notices(&self) -> Vec<(NoticeKind, String, Option<String>)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, kind: NoticeKind, title: &str, detail: Option<&str>) {
        self.notices
            .lock()
            .unwrap()
            .push((kind, title.to_string(), detail.map(str::to_string)));
    }
}

pub fn signed_in() -> (Arc<MemorySessionStore>, SessionGuard) {
    let store = Arc::new(MemorySessionStore::with_token(SessionToken::new("test-token")));
    let guard = SessionGuard::new(store.clone());
    (store, guard)
}

pub fn item(id: i64, name: &str, status: &str) -> Json {
    json!({ "id": id, "item_name": name, "status": status, "condition": "Good" })
}
