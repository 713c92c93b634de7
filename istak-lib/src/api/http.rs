//! HTTP implementation of [`ResourceApi`]

use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use reqwest::RequestBuilder;
use reqwest::Response;
use serde_json::Value as Json;
use url::Url;

use super::MutationBody;
use super::ResourceApi;
use crate::IstakClient;
use crate::auth::CurrentUser;
use crate::auth::SessionToken;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::RecordId;
use crate::model::ResourceKind;

/// Paths tried, in order, for the current-user lookup.
const CURRENT_USER_PATHS: &[&str] = &["user/", "current-user/"];

impl IstakClient {
    fn request(&self, method: Method, url: &str, token: &SessionToken) -> RequestBuilder {
        debug!("{} {}", method, url);

        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .bearer_auth(token.as_str());

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    fn with_body(request: RequestBuilder, body: &MutationBody) -> Result<RequestBuilder, Error> {
        Ok(match body {
            MutationBody::Multipart(parts) => {
                request.multipart(MutationBody::to_form(parts).map_err(ApiError::from)?)
            }
            MutationBody::Json(map) => request.json(map),
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            debug!("HTTP {} response: {}", status, body);
            Err(Error::Api(ApiError::Http { status, message: body }))
        }
    }

    /// Reads a JSON body. An empty body reads as `null`.
    async fn read_json(&self, response: Response) -> Result<Json, Error> {
        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        if text.trim().is_empty() {
            return Ok(Json::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ApiError::parse_with_body(format!("Invalid JSON: {}", e), text).into())
    }

    fn collection_url(&self, kind: ResourceKind) -> String {
        self.endpoint(&format!("{}/", kind.collection()))
    }

    /// `{collection}/{id}/` with the id percent-encoded as one path segment.
    fn record_url(&self, kind: ResourceKind, id: &RecordId) -> Result<String, Error> {
        let base = self.collection_url(kind);
        let mut url = Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(base.clone()))?
            .pop_if_empty()
            .push(&id.as_path_segment())
            .push("");
        Ok(url.into())
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        match self.inner.timeout {
            Some(timeout) if e.is_timeout() => Error::Api(ApiError::Timeout(timeout)),
            _ => Error::Api(ApiError::Network(e)),
        }
    }
}

#[async_trait]
impl ResourceApi for IstakClient {
    async fn list(&self, kind: ResourceKind, token: &SessionToken) -> Result<Json, Error> {
        let request = self.request(Method::GET, &self.collection_url(kind), token);
        let response = self.send(request).await?;
        self.read_json(response).await
    }

    async fn create(
        &self,
        kind: ResourceKind,
        body: &MutationBody,
        token: &SessionToken,
    ) -> Result<Json, Error> {
        let request = self.request(Method::POST, &self.collection_url(kind), token);
        let response = self.send(Self::with_body(request, body)?).await?;
        self.read_json(response).await
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: &RecordId,
        body: &MutationBody,
        token: &SessionToken,
    ) -> Result<Json, Error> {
        let request = self.request(Method::PATCH, &self.record_url(kind, id)?, token);
        let response = self.send(Self::with_body(request, body)?).await?;
        self.read_json(response).await
    }

    async fn delete(&self, kind: ResourceKind, id: &RecordId, token: &SessionToken) -> Result<(), Error> {
        let request = self.request(Method::DELETE, &self.record_url(kind, id)?, token);
        self.send(request).await?;
        Ok(())
    }

    async fn current_user(&self, token: &SessionToken) -> Result<CurrentUser, Error> {
        let mut last_err = None;
        for path in CURRENT_USER_PATHS {
            let request = self.request(Method::GET, &self.endpoint(path), token);
            match self.send(request).await {
                Ok(response) => {
                    let json = self.read_json(response).await?;
                    return serde_json::from_value(json.clone()).map_err(|e| {
                        ApiError::parse_with_body(format!("Invalid user payload: {}", e), json.to_string())
                            .into()
                    });
                }
                Err(Error::Api(ApiError::Http { status: 404, message })) => {
                    debug!("No user endpoint at {}, trying next", path);
                    last_err = Some(Error::Api(ApiError::http(404, message)));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| ApiError::parse("No user endpoint configured").into()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::MemorySessionStore;

    fn client() -> IstakClient {
        IstakClient::builder()
            .url("http://localhost:8000/")
            .session_store(Arc::new(MemorySessionStore::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_collection_and_record_urls() {
        let client = client();
        assert_eq!(client.collection_url(ResourceKind::Borrower), "http://localhost:8000/api/borrowers/");
        assert_eq!(
            client.record_url(ResourceKind::Transaction, &RecordId::from(12)).unwrap(),
            "http://localhost:8000/api/transactions/12/"
        );
        assert_eq!(
            client.record_url(ResourceKind::QrTarget, &RecordId::from("A-1")).unwrap(),
            "http://localhost:8000/api/items/A-1/"
        );
    }

    #[test]
    fn test_record_url_escapes_id() {
        let url = client()
            .record_url(ResourceKind::Item, &RecordId::from("shelf/3 b?x"))
            .unwrap();
        assert_eq!(url, "http://localhost:8000/api/items/shelf%2F3%20b%3Fx/");
    }
}
