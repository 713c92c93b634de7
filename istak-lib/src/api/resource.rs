//! The fetch collaborator boundary

use async_trait::async_trait;
use serde_json::Value as Json;

use super::MutationBody;
use crate::auth::CurrentUser;
use crate::auth::SessionToken;
use crate::error::Error;
use crate::model::RecordId;
use crate::model::ResourceKind;

/// REST operations on one backend, authenticated with a bearer token.
///
/// Implementations report non-success responses as
/// [`ApiError::Http`](crate::error::ApiError::Http) with the response body as
/// the message; callers decide what a status means. No implementation
/// retries.
///
/// [`IstakClient`](crate::IstakClient) is the HTTP implementation.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// `GET /{collection}/`: a JSON array or a `{"results": [...]}` envelope.
    async fn list(&self, kind: ResourceKind, token: &SessionToken) -> Result<Json, Error>;

    /// `POST /{collection}/`: returns the created record.
    async fn create(
        &self,
        kind: ResourceKind,
        body: &MutationBody,
        token: &SessionToken,
    ) -> Result<Json, Error>;

    /// `PATCH /{collection}/{id}/`: returns the updated record (or null).
    async fn update(
        &self,
        kind: ResourceKind,
        id: &RecordId,
        body: &MutationBody,
        token: &SessionToken,
    ) -> Result<Json, Error>;

    /// `DELETE /{collection}/{id}/`.
    async fn delete(&self, kind: ResourceKind, id: &RecordId, token: &SessionToken) -> Result<(), Error>;

    /// `GET /user/` (or `/current-user/`): the signed-in user.
    async fn current_user(&self, token: &SessionToken) -> Result<CurrentUser, Error>;
}
