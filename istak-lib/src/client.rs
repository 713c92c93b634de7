//! Main IstakClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::auth::SessionGuard;
use crate::auth::SessionStore;
use crate::error::ApiError;
use crate::error::Error;

/// Default path prefix of the REST API.
pub const DEFAULT_API_PREFIX: &str = "/api";

/// HTTP client for the inventory backend.
///
/// Cheap to clone (uses `Arc` internally). Every request carries the
/// session token as a bearer credential; the client itself implements
/// [`ResourceApi`](crate::api::ResourceApi).
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use istak_lib::IstakClient;
/// use istak_lib::auth::MemorySessionStore;
///
/// let client = IstakClient::builder()
///     .url("https://inventory.example.edu")
///     .session_store(Arc::new(MemorySessionStore::new()))
///     .build()?;
/// ```
#[derive(Clone)]
pub struct IstakClient {
    pub(crate) inner: Arc<IstakClientInner>,
}

pub(crate) struct IstakClientInner {
    pub(crate) base_url: String,
    pub(crate) api_prefix: String,
    pub(crate) guard: SessionGuard,
    pub(crate) http_client: Client,
    pub(crate) timeout: Option<Duration>,
}

impl IstakClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> IstakClientBuilder<Missing, Missing> {
        IstakClientBuilder::new()
    }

    /// Returns the base URL of the backend.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns the session guard shared by everything built on this client.
    pub fn guard(&self) -> &SessionGuard {
        &self.inner.guard
    }

    /// Joins a path below the API prefix, e.g. `items/4/`.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}/{}",
            self.inner.base_url.trim_end_matches('/'),
            self.inner.api_prefix,
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for IstakClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IstakClient")
            .field("base_url", &self.inner.base_url)
            .field("api_prefix", &self.inner.api_prefix)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`IstakClient`].
///
/// # Required Fields
///
/// - `url` - The backend base URL
/// - `session_store` - Where the session token lives
pub struct IstakClientBuilder<Url, Store> {
    url: Url,
    session_store: Store,
    api_prefix: String,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl IstakClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            session_store: Missing,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }
}

impl Default for IstakClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> IstakClientBuilder<Missing, S> {
    /// Sets the backend base URL.
    pub fn url(self, url: impl Into<String>) -> IstakClientBuilder<Set<String>, S> {
        IstakClientBuilder {
            url: Set(url.into()),
            session_store: self.session_store,
            api_prefix: self.api_prefix,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U> IstakClientBuilder<U, Missing> {
    /// Sets the session token storage.
    pub fn session_store(
        self,
        store: Arc<dyn SessionStore>,
    ) -> IstakClientBuilder<U, Set<Arc<dyn SessionStore>>> {
        IstakClientBuilder {
            url: self.url,
            session_store: Set(store),
            api_prefix: self.api_prefix,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U, S> IstakClientBuilder<U, S> {
    /// Sets the API path prefix.
    ///
    /// Defaults to `/api`.
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_matches('/');
        self.api_prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        };
        self
    }

    /// Sets the request timeout. Without one the transport default applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl IstakClientBuilder<Set<String>, Set<Arc<dyn SessionStore>>> {
    /// Builds the [`IstakClient`].
    ///
    /// Fails if the URL is not absolute or the HTTP client cannot be created.
    pub fn build(self) -> Result<IstakClient, Error> {
        let base_url = self.url.0;
        url::Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(ApiError::from)?
            }
        };

        Ok(IstakClient {
            inner: Arc::new(IstakClientInner {
                base_url,
                api_prefix: self.api_prefix,
                guard: SessionGuard::new(self.session_store.0),
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}
