//! Resource table controller
//!
//! One [`ResourceTable`] backs one table view. It owns the loaded records and
//! the view state, runs mutations through the gateway, and reloads
//! everything from the server after each successful mutation. There is no
//! incremental update path.

mod config;

pub use config::*;

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use chrono::Local;
use log::debug;
use log::info;
use log::warn;
use serde_json::Value as Json;
use tokio_util::sync::CancellationToken;

use crate::IstakClient;
use crate::api::Attachment;
use crate::api::DeleteReport;
use crate::api::MutationGateway;
use crate::api::MutationKind;
use crate::api::MutationOutcome;
use crate::api::MutationRequest;
use crate::api::ResourceApi;
use crate::api::classify;
use crate::auth::CurrentUser;
use crate::auth::SessionGuard;
use crate::error::Error;
use crate::model::CanonicalRecord;
use crate::model::RecordId;
use crate::model::Value;
use crate::normalize::normalize_all;
use crate::notify::NotificationSink;
use crate::view::CheckState;
use crate::view::ColumnFilter;
use crate::view::Projection;
use crate::view::ViewState;
use crate::view::project;

/// Loading state of a table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// Records reflect the last successful fetch.
    Ready,
    /// The last fetch failed; records are from the last successful one.
    Failed(String),
}

/// Controller behind one table view.
///
/// # Example
///
/// ```ignore
/// let mut table = ResourceTable::connect(TableConfig::items()?, &client, Arc::new(LogSink))?;
/// table.open().await?;
/// table.set_query("tripod");
/// for row in table.project().rows() {
///     println!("{} {}", row.id(), row.value_of("item_name"));
/// }
/// ```
pub struct ResourceTable {
    config: TableConfig,
    api: Arc<dyn ResourceApi>,
    gateway: MutationGateway,
    guard: SessionGuard,
    notifier: Arc<dyn NotificationSink>,
    records: Vec<CanonicalRecord>,
    state: ViewState,
    status: LoadStatus,
    user: Option<CurrentUser>,
    cancel: CancellationToken,
    reloads: u64,
}

impl ResourceTable {
    /// Creates a table over any [`ResourceApi`].
    pub fn new(
        config: TableConfig,
        api: Arc<dyn ResourceApi>,
        guard: SessionGuard,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let gateway = MutationGateway::new(api.clone(), guard.clone(), config.alias_table.clone());
        let state = ViewState::new(config.page_size, config.default_sort.clone());

        Ok(Self {
            config,
            api,
            gateway,
            guard,
            notifier,
            records: Vec::new(),
            state,
            status: LoadStatus::Idle,
            user: None,
            cancel: CancellationToken::new(),
            reloads: 0,
        })
    }

    /// Creates a table backed by an HTTP client.
    pub fn connect(
        config: TableConfig,
        client: &IstakClient,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self, Error> {
        let guard = client.guard().clone();
        Self::new(config, Arc::new(client.clone()), guard, notifier)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Initial load: fetches records and the current user concurrently.
    ///
    /// Without a session nothing is fetched and the auth error is returned
    /// for the caller to redirect to login. A rejected session on either
    /// request expires it the same way. Any other user lookup failure only
    /// disables edit actions.
    pub async fn open(&mut self) -> Result<(), Error> {
        let token = self.guard.require()?;
        let previous = std::mem::replace(&mut self.status, LoadStatus::Loading);
        self.reloads += 1;

        let api = self.api.clone();
        let kind = self.config.kind();
        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            joined = futures::future::join(api.list(kind, &token), api.current_user(&token)) => Some(joined),
        };
        let Some((list, user)) = fetched else {
            self.status = previous;
            return Err(Error::Cancelled);
        };

        match user.map_err(|e| classify(&self.guard, e, false)) {
            Ok(user) => self.user = Some(user),
            Err(e) if e.requires_login() => {
                self.user = None;
                self.status = LoadStatus::Failed(e.user_message());
                return Err(e);
            }
            Err(e) => {
                warn!("Current user lookup failed: {}", e);
                self.user = None;
            }
        }
        self.apply_load(list)
    }

    /// Reloads every record from the server.
    ///
    /// On failure the previous records and view state are kept and one
    /// error notice is sent. Returns [`Error::Cancelled`] without touching
    /// records or the loading state if the table is closed while the fetch
    /// is in flight.
    pub async fn reload(&mut self) -> Result<(), Error> {
        let token = self.guard.require()?;
        let previous = std::mem::replace(&mut self.status, LoadStatus::Loading);
        self.reloads += 1;

        let api = self.api.clone();
        let kind = self.config.kind();
        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            list = api.list(kind, &token) => Some(list),
        };
        let Some(list) = fetched else {
            self.status = previous;
            return Err(Error::Cancelled);
        };
        self.apply_load(list)
    }

    /// Reload issued after a successful mutation.
    pub async fn resync(&mut self) -> Result<(), Error> {
        debug!("Resyncing {} table", self.config.kind());
        self.reload().await
    }

    fn apply_load(&mut self, list: Result<Json, Error>) -> Result<(), Error> {
        let kind = self.config.kind();
        match list {
            Ok(payload) => {
                let mut records = normalize_all(&payload, &self.config.alias_table);
                let today = Local::now().date_naive();
                for record in &mut records {
                    for derive in &self.config.derivations {
                        derive(record, today);
                    }
                }
                self.records = records;

                let dropped = self
                    .state
                    .selection_mut()
                    .prune(self.records.iter().map(|r| r.id()));
                if !dropped.is_empty() {
                    debug!("Dropped {} stale selection(s)", dropped.len());
                }
                let row_count = self.project().row_count();
                self.state.clamp_page(row_count);

                self.status = LoadStatus::Ready;
                info!("Loaded {} {} record(s)", self.records.len(), kind);
                Ok(())
            }
            Err(e) => {
                let e = classify(&self.guard, e, false);
                self.status = LoadStatus::Failed(e.user_message());
                if !e.requires_login() {
                    self.notifier.error(
                        &format!("Failed to load {} records", kind.label().to_lowercase()),
                        Some(&e.user_message()),
                    );
                }
                Err(e)
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a record, then resyncs. Returns the new record's id.
    pub async fn create(
        &mut self,
        fields: BTreeMap<String, Value>,
        attachment: Option<Attachment>,
    ) -> Result<RecordId, Error> {
        self.ensure_open()?;
        let result = self.gateway.create(&fields, attachment.as_ref()).await;
        let id = self.report(MutationKind::Create, result)?;
        self.resync_after_mutation().await;
        Ok(id)
    }

    /// Updates a record, then resyncs.
    pub async fn update(
        &mut self,
        id: &RecordId,
        fields: BTreeMap<String, Value>,
        attachment: Option<Attachment>,
    ) -> Result<(), Error> {
        self.ensure_open()?;
        let result = self.gateway.update(id, &fields, attachment.as_ref()).await;
        self.report(MutationKind::Update, result)?;
        self.resync_after_mutation().await;
        Ok(())
    }

    /// Deletes one record, then resyncs.
    ///
    /// Rows refused by the delete guard are rejected without a request.
    pub async fn delete(&mut self, id: &RecordId) -> Result<(), Error> {
        self.ensure_open()?;
        let result = match self.refusal(id) {
            Some(reason) => Err(Error::Refused(reason)),
            None => self.gateway.delete_one(id).await,
        };
        self.report(MutationKind::Delete, result)?;
        self.resync_after_mutation().await;
        Ok(())
    }

    /// Executes a captured [`MutationRequest`].
    pub async fn submit(&mut self, request: MutationRequest) -> Result<MutationOutcome, Error> {
        let MutationRequest {
            kind,
            resource_id,
            fields,
            attachment,
        } = request;

        match (kind, resource_id) {
            (MutationKind::Create, _) => self.create(fields, attachment).await.map(MutationOutcome::Created),
            (MutationKind::Update, Some(id)) => {
                self.update(&id, fields, attachment).await?;
                Ok(MutationOutcome::Updated)
            }
            (MutationKind::Delete, Some(id)) => {
                self.delete(&id).await?;
                Ok(MutationOutcome::Deleted)
            }
            (kind, None) => self.report(
                kind,
                Err(Error::Refused("Mutation has no target record".to_string())),
            ),
        }
    }

    /// Deletes several records one by one.
    ///
    /// Failures do not stop the batch. Sends one notice summarizing the
    /// batch and resyncs if anything was deleted.
    ///
    /// If the session is rejected mid-batch the remaining ids are not sent
    /// and the auth error is returned instead of a report, with no notice,
    /// so the caller redirects to login.
    pub async fn delete_many(&mut self, ids: &[RecordId]) -> Result<DeleteReport, Error> {
        self.ensure_open()?;

        let mut seen = HashSet::new();
        let ids: Vec<RecordId> = ids.iter().filter(|id| seen.insert(*id)).cloned().collect();

        let mut failures: HashMap<RecordId, String> = HashMap::new();
        let mut allowed = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.refusal(id) {
                Some(reason) => {
                    failures.insert(id.clone(), reason);
                }
                None => allowed.push(id.clone()),
            }
        }

        let sent = self.gateway.delete_many(&allowed).await;
        if let Some(auth) = sent.auth_failure {
            warn!(
                "Session rejected during bulk delete, {} of {} {}(s) deleted",
                sent.succeeded.len(),
                ids.len(),
                self.config.kind()
            );
            return Err(Error::Auth(auth));
        }
        failures.extend(sent.failed);

        let mut report = DeleteReport::default();
        for id in ids {
            match failures.remove(&id) {
                Some(reason) => report.failed.push((id, reason)),
                None => report.succeeded.push(id),
            }
        }

        self.report_batch(&report);
        if report.any_succeeded() {
            self.resync_after_mutation().await;
        }
        Ok(report)
    }

    /// Deletes the selected records. An empty selection does nothing.
    pub async fn delete_selected(&mut self) -> Result<DeleteReport, Error> {
        let ids = self.state.selection().selected();
        if ids.is_empty() {
            return Ok(DeleteReport::default());
        }
        self.delete_many(&ids).await
    }

    fn refusal(&self, id: &RecordId) -> Option<String> {
        self.records
            .iter()
            .find(|r| r.id() == id)
            .and_then(|record| self.config.refuse_delete(record))
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    fn report<T>(&self, kind: MutationKind, result: Result<T, Error>) -> Result<T, Error> {
        let label = self.config.kind().label();
        let verb = match kind {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        };
        match &result {
            Ok(_) => self.notifier.success(&format!("{} {}d", label, verb), None),
            Err(e) => self.notifier.error(
                &format!("Failed to {} {}", verb, label.to_lowercase()),
                Some(&e.user_message()),
            ),
        }
        result
    }

    fn report_batch(&self, report: &DeleteReport) {
        let label = self.config.kind().label().to_lowercase();
        let total = report.succeeded.len() + report.failed.len();
        if report.is_complete() {
            self.notifier
                .success(&format!("Deleted {} {}(s)", total, label), None);
            return;
        }

        let detail = report
            .failed
            .iter()
            .map(|(id, reason)| format!("{}: {}", id, reason))
            .collect::<Vec<_>>()
            .join("\n");
        let title = if report.any_succeeded() {
            format!("Deleted {} of {} {}(s)", report.succeeded.len(), total, label)
        } else {
            format!("Failed to delete {}(s)", label)
        };
        self.notifier.error(&title, Some(&detail));
    }

    async fn resync_after_mutation(&mut self) {
        if let Err(e) = self.resync().await {
            debug!("Resync after mutation did not complete: {}", e);
        }
    }

    // =========================================================================
    // View state
    // =========================================================================

    /// Derives the rows currently shown.
    pub fn project(&self) -> Projection<'_> {
        project(
            &self.records,
            &self.state,
            &self.config.alias_table,
            &self.config.searchable,
        )
    }

    /// Returns the view state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Sets the free-text query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.set_query(query);
    }

    /// Sets or clears a column filter.
    pub fn set_filter(&mut self, field: impl Into<String>, filter: Option<ColumnFilter>) {
        self.state.set_filter(field, filter);
    }

    /// Sets a column filter from its header value.
    pub fn set_filter_value(&mut self, field: impl Into<String>, raw: &str) {
        self.state.set_filter_value(field, raw);
    }

    /// Removes every column filter.
    pub fn clear_filters(&mut self) {
        self.state.clear_filters();
    }

    /// Header click on `field`. Returns `false` if the field is not sortable.
    pub fn toggle_sort(&mut self, field: &str) -> bool {
        if !self.config.is_sortable(field) {
            return false;
        }
        self.state.toggle_sort(field);
        true
    }

    /// Moves to a page, clamped to the last page.
    pub fn set_page(&mut self, index: usize) {
        self.state.set_page(index);
        let row_count = self.project().row_count();
        self.state.clamp_page(row_count);
    }

    /// Moves to the next page, if any.
    pub fn next_page(&mut self) {
        let index = self.state.page().index();
        self.set_page(index + 1);
    }

    /// Moves to the previous page, if any.
    pub fn previous_page(&mut self) {
        let index = self.state.page().index();
        self.set_page(index.saturating_sub(1));
    }

    /// Changes the page size.
    pub fn set_page_size(&mut self, size: usize) {
        self.state.set_page_size(size);
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Toggles one row. Returns `true` if it is now selected.
    pub fn toggle_selected(&mut self, id: RecordId) -> bool {
        self.state.selection_mut().toggle(id)
    }

    /// Header checkbox for the current page.
    pub fn toggle_page_selection(&mut self) {
        let ids = self.project().ids();
        self.state.selection_mut().toggle_all(ids.iter());
    }

    /// Selects every loaded record, or clears them if all were selected.
    pub fn toggle_all_selection(&mut self) {
        self.state
            .selection_mut()
            .toggle_all(self.records.iter().map(|r| r.id()));
    }

    /// Header checkbox state for the current page.
    pub fn page_check_state(&self) -> CheckState {
        let ids = self.project().ids();
        self.state.selection().check_state(ids.iter())
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.state.selection_mut().clear();
    }

    // =========================================================================
    // Accessors and teardown
    // =========================================================================

    /// Returns the table configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Records from the last successful load, in server order.
    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    /// Returns the loading state.
    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// The signed-in user, if the lookup succeeded.
    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// Returns `true` if edit and delete actions should be shown.
    pub fn can_edit(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::can_edit)
    }

    /// Number of fetches issued so far.
    pub fn reload_count(&self) -> u64 {
        self.reloads
    }

    /// A handle that tears the table down from another task.
    pub fn teardown_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Tears the table down: in-flight fetches stop and later calls fail with [`Error::Cancelled`].
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once the table has been closed.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ResourceTable {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for ResourceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTable")
            .field("config", &self.config)
            .field("records", &self.records.len())
            .field("state", &self.state)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
