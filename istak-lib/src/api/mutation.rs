//! Mutation gateway
//!
//! Sends create/update/delete requests once, never retries, and never
//! touches local records. Callers reload after a reported success.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::info;
use log::warn;

use super::Attachment;
use super::MutationBody;
use super::ResourceApi;
use crate::auth::SessionGuard;
use crate::error::ApiError;
use crate::error::AuthError;
use crate::error::Error;
use crate::error::ValidationError;
use crate::model::RecordId;
use crate::model::Value;
use crate::normalize::AliasTable;
use crate::normalize::normalize;

/// The kind of change a mutation makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Create a new record.
    Create,
    /// Update an existing record.
    Update,
    /// Delete a record.
    Delete,
}

/// A change captured from form state at submit time.
///
/// # Example
///
/// ```
/// use istak_lib::api::{Attachment, MutationRequest};
///
/// let request = MutationRequest::create()
///     .field("item_name", "Tripod")
///     .field("condition", "Good")
///     .attachment(Attachment::new("tripod.png", vec![0x89, 0x50]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    pub(crate) kind: MutationKind,
    pub(crate) resource_id: Option<RecordId>,
    pub(crate) fields: BTreeMap<String, Value>,
    pub(crate) attachment: Option<Attachment>,
}

impl MutationRequest {
    /// A request of any kind. Update and delete need a `resource_id`;
    /// without one they are refused when submitted.
    pub fn new(kind: MutationKind, resource_id: Option<RecordId>) -> Self {
        Self {
            kind,
            resource_id,
            fields: BTreeMap::new(),
            attachment: None,
        }
    }

    /// A create request.
    pub fn create() -> Self {
        Self::new(MutationKind::Create, None)
    }

    /// An update request for `id`.
    pub fn update(id: RecordId) -> Self {
        Self::new(MutationKind::Update, Some(id))
    }

    /// A delete request for `id`.
    pub fn delete(id: RecordId) -> Self {
        Self::new(MutationKind::Delete, Some(id))
    }

    /// Sets a field (builder pattern).
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Replaces all fields.
    pub fn fields(mut self, fields: BTreeMap<String, Value>) -> Self {
        self.fields = fields;
        self
    }

    /// Attaches a file.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Returns the mutation kind.
    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    /// Returns the target record, for update and delete.
    pub fn resource_id(&self) -> Option<&RecordId> {
        self.resource_id.as_ref()
    }
}

/// What a mutation produced on success.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// A record was created with this identifier.
    Created(RecordId),
    /// The record was updated.
    Updated,
    /// The record was deleted.
    Deleted,
}

/// Per-id outcome of a bulk delete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteReport {
    /// Ids deleted, in request order.
    pub succeeded: Vec<RecordId>,
    /// Ids that failed, with the reason, in request order.
    pub failed: Vec<(RecordId, String)>,
    /// Set when the session was rejected during the batch.
    pub auth_failure: Option<AuthError>,
}

impl DeleteReport {
    /// Returns `true` if every delete succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Returns `true` if the session expired and the user must log in again.
    pub fn requires_login(&self) -> bool {
        self.auth_failure.is_some()
    }

    /// Returns `true` if at least one delete succeeded.
    pub fn any_succeeded(&self) -> bool {
        !self.succeeded.is_empty()
    }
}

/// Executes mutations for one resource kind.
#[derive(Clone)]
pub struct MutationGateway {
    api: Arc<dyn ResourceApi>,
    guard: SessionGuard,
    table: Arc<AliasTable>,
}

impl MutationGateway {
    /// Creates a gateway. `table` is used to read the identifier of created records.
    pub fn new(api: Arc<dyn ResourceApi>, guard: SessionGuard, table: Arc<AliasTable>) -> Self {
        Self { api, guard, table }
    }

    /// Creates a record and returns its server-assigned identifier.
    pub async fn create(
        &self,
        fields: &BTreeMap<String, Value>,
        attachment: Option<&Attachment>,
    ) -> Result<RecordId, Error> {
        let kind = self.table.kind();
        let token = self.guard.require()?;
        let body = MutationBody::encode(kind, fields, attachment);

        let created = self
            .api
            .create(kind, &body, &token)
            .await
            .map_err(|e| classify(&self.guard, e, true))?;

        let id = normalize(&created, &self.table).id().clone();
        if id.is_placeholder() {
            return Err(ApiError::parse_with_body("Created record has no identifier", created.to_string()).into());
        }
        info!("Created {} {}", kind, id);
        Ok(id)
    }

    /// Updates a record.
    pub async fn update(
        &self,
        id: &RecordId,
        fields: &BTreeMap<String, Value>,
        attachment: Option<&Attachment>,
    ) -> Result<(), Error> {
        let kind = self.table.kind();
        let token = self.guard.require()?;
        let body = MutationBody::encode(kind, fields, attachment);

        self.api
            .update(kind, id, &body, &token)
            .await
            .map_err(|e| classify(&self.guard, e, true))?;
        info!("Updated {} {}", kind, id);
        Ok(())
    }

    /// Deletes one record.
    pub async fn delete_one(&self, id: &RecordId) -> Result<(), Error> {
        let kind = self.table.kind();
        let token = self.guard.require()?;

        self.api
            .delete(kind, id, &token)
            .await
            .map_err(|e| classify(&self.guard, e, true))?;
        info!("Deleted {} {}", kind, id);
        Ok(())
    }

    /// Deletes records one after another.
    ///
    /// A failure does not stop the remaining deletes; every id ends up in
    /// exactly one side of the report. Once the session is rejected the
    /// remaining ids fail without a request and `auth_failure` is set.
    pub async fn delete_many(&self, ids: &[RecordId]) -> DeleteReport {
        let mut report = DeleteReport::default();
        for id in ids {
            match self.delete_one(id).await {
                Ok(()) => report.succeeded.push(id.clone()),
                Err(e) => {
                    warn!("Failed to delete {} {}: {}", self.table.kind(), id, e);
                    report.failed.push((id.clone(), e.user_message()));
                    if let (Error::Auth(auth), None) = (e, &report.auth_failure) {
                        report.auth_failure = Some(auth);
                    }
                }
            }
        }
        report
    }
}

impl std::fmt::Debug for MutationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationGateway")
            .field("kind", &self.table.kind())
            .finish_non_exhaustive()
    }
}

/// Maps a raw HTTP failure onto the caller-facing error taxonomy.
///
/// 401/403 expire the session. For mutations, other 4xx responses become
/// [`ValidationError`]s carrying the body verbatim.
pub(crate) fn classify(guard: &SessionGuard, err: Error, mutation: bool) -> Error {
    match err {
        Error::Api(ApiError::Http { status, .. }) if SessionGuard::is_auth_failure(status) => {
            Error::Auth(guard.expire(status))
        }
        Error::Api(ApiError::Http { status, message }) if mutation && (400..500).contains(&status) => {
            Error::Validation(ValidationError::from_body(status, message))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySessionStore;
    use crate::auth::SessionStore;
    use crate::auth::SessionToken;
    use crate::error::AuthError;

    fn guard() -> (Arc<MemorySessionStore>, SessionGuard) {
        let store = Arc::new(MemorySessionStore::with_token(SessionToken::new("t")));
        (store.clone(), SessionGuard::new(store))
    }

    #[test]
    fn test_classify_auth_failure_clears_session() {
        let (store, guard) = guard();
        let err = classify(&guard, ApiError::http(401, "").into(), false);
        assert!(matches!(err, Error::Auth(AuthError::Expired { status: 401 })));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_classify_mutation_rejection() {
        let (_, guard) = guard();
        let err = classify(&guard, ApiError::http(400, r#"{"item_name": ["required"]}"#).into(), true);
        match err {
            Error::Validation(v) => {
                assert_eq!(v.status(), 400);
                assert_eq!(v.fields().len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classify_leaves_server_errors() {
        let (_, guard) = guard();
        let err = classify(&guard, ApiError::http(500, "boom").into(), true);
        assert!(matches!(err, Error::Api(ApiError::Http { status: 500, .. })));
        let err = classify(&guard, ApiError::http(404, "gone").into(), false);
        assert!(matches!(err, Error::Api(ApiError::Http { status: 404, .. })));
    }

    #[test]
    fn test_request_builders() {
        let request = MutationRequest::update(RecordId::from(3)).field("condition", "Fair");
        assert_eq!(request.kind(), MutationKind::Update);
        assert_eq!(request.resource_id(), Some(&RecordId::from(3)));
        assert_eq!(request.fields.get("condition"), Some(&Value::from("Fair")));
    }
}
