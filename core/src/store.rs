//! Client-side cache of alerts with filter and pagination state.
//!
//! All mutation goes through [`AlertState::apply`] so the reducer can be
//! exercised without any I/O. [`AlertStore`] wraps it with the async actions
//! that talk to an [`AlertApi`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::AlertApi;
use crate::error::{ApiError, ApiResult};
use crate::models::{Alert, AlertId, AlertQuery, AlertStatus, AlertType, AlertUpdate, NewAlert};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filters {
    pub alert_type: Option<AlertType>,
    pub status: AlertStatus,
}

/// Partial filter change, merged into the current [`Filters`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChange {
    /// `Some(None)` clears the type filter
    pub alert_type: Option<Option<AlertType>>,
    pub status: Option<AlertStatus>,
}

impl FilterChange {
    pub fn alert_type(alert_type: Option<AlertType>) -> Self {
        FilterChange {
            alert_type: Some(alert_type),
            status: None,
        }
    }

    pub fn status(status: AlertStatus) -> Self {
        FilterChange {
            alert_type: None,
            status: Some(status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    /// Heuristic: the last page came back full
    pub has_more: bool,
}

/// Per-type counts taken from the last unfiltered first page.
///
/// Only as fresh as that fetch; switching filters does not touch it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeCounts {
    pub total: usize,
    pub lost: usize,
    pub seen: usize,
}

impl TypeCounts {
    fn from_alerts(alerts: &[Alert]) -> Self {
        TypeCounts {
            total: alerts.len(),
            lost: alerts
                .iter()
                .filter(|a| a.alert_type == AlertType::Lost)
                .count(),
            seen: alerts
                .iter()
                .filter(|a| a.alert_type == AlertType::Seen)
                .count(),
        }
    }

    pub fn get(&self, alert_type: AlertType) -> usize {
        match alert_type {
            AlertType::Lost => self.lost,
            AlertType::Seen => self.seen,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertState {
    pub items: Vec<Alert>,
    pub current: Option<Alert>,
    pub filters: Filters,
    pub pagination: Pagination,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<String>,
    pub type_counts: TypeCounts,
}

/// Everything that can happen to the cache
#[derive(Debug, Clone, PartialEq)]
pub enum AlertEvent {
    LoadStarted { refresh: bool },
    NextPageRequested,
    PageLoaded { page: u32, alerts: Vec<Alert> },
    LoadFailed { page: u32, message: String },
    FiltersChanged(FilterChange),
    MutationStarted,
    AlertCreated(Alert),
    AlertUpdated(Alert),
    AlertRemoved(AlertId),
    CurrentLoaded(Alert),
    MutationFailed(String),
    ErrorCleared,
}

impl Default for AlertState {
    fn default() -> Self {
        AlertState::new(DEFAULT_PAGE_SIZE)
    }
}

impl AlertState {
    pub fn new(page_size: u32) -> Self {
        AlertState {
            items: vec![],
            current: None,
            filters: Filters::default(),
            pagination: Pagination {
                page: 0,
                page_size: page_size.max(1),
                has_more: true,
            },
            loading: false,
            refreshing: false,
            error: None,
            type_counts: TypeCounts::default(),
        }
    }

    pub fn apply(&mut self, event: AlertEvent) {
        match event {
            AlertEvent::LoadStarted { refresh: true } => {
                self.refreshing = true;
                self.pagination.page = 0;
                self.pagination.has_more = true;
            }
            AlertEvent::LoadStarted { refresh: false } => {
                self.loading = true;
            }
            AlertEvent::NextPageRequested => {
                self.pagination.page += 1;
            }
            AlertEvent::PageLoaded { page, alerts } => {
                self.pagination.has_more = alerts.len() == self.pagination.page_size as usize;
                if page == 0 {
                    if self.filters.alert_type.is_none() {
                        self.type_counts = TypeCounts::from_alerts(&alerts);
                    }
                    self.items = alerts;
                } else {
                    self.items.extend(alerts);
                }
                self.loading = false;
                self.refreshing = false;
                self.error = None;
            }
            AlertEvent::LoadFailed { page, message } => {
                // Roll back so the next "load more" asks for the same page again
                if page > 0 && self.pagination.page == page {
                    self.pagination.page -= 1;
                }
                self.set_error(message);
            }
            AlertEvent::FiltersChanged(change) => {
                if let Some(alert_type) = change.alert_type {
                    self.filters.alert_type = alert_type;
                }
                if let Some(status) = change.status {
                    self.filters.status = status;
                }
                self.items.clear();
                self.pagination.page = 0;
                self.pagination.has_more = true;
            }
            AlertEvent::MutationStarted => {
                self.loading = true;
            }
            AlertEvent::AlertCreated(alert) => {
                self.items.insert(0, alert);
                self.loading = false;
                self.error = None;
            }
            AlertEvent::AlertUpdated(alert) => {
                if let Some(item) = self.items.iter_mut().find(|a| a.id == alert.id) {
                    *item = alert.clone();
                }
                if self.current.as_ref().map(|c| c.id) == Some(alert.id) {
                    self.current = Some(alert);
                }
                self.loading = false;
                self.error = None;
            }
            AlertEvent::AlertRemoved(id) => {
                self.items.retain(|a| a.id != id);
                if self.current.as_ref().map(|c| c.id) == Some(id) {
                    self.current = None;
                }
                self.loading = false;
                self.error = None;
            }
            AlertEvent::CurrentLoaded(alert) => {
                self.current = Some(alert);
                self.loading = false;
            }
            AlertEvent::MutationFailed(message) => self.set_error(message),
            AlertEvent::ErrorCleared => self.error = None,
        }
    }

    fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
        self.refreshing = false;
    }

    /// List query for `page` under the current filters
    pub fn query(&self, page: u32) -> AlertQuery {
        AlertQuery {
            page,
            size: self.pagination.page_size,
            alert_type: self.filters.alert_type,
            status: Some(self.filters.status),
        }
    }

    /// Count shown on a type filter badge
    pub fn count_for(&self, alert_type: AlertType) -> usize {
        if self.filters.alert_type == Some(alert_type) {
            self.items.len()
        } else {
            self.type_counts.get(alert_type)
        }
    }

    pub fn filtered_count(&self) -> usize {
        if self.filters.alert_type.is_some() {
            self.items.len()
        } else {
            self.type_counts.total
        }
    }
}

/// Explicitly constructed alert cache backed by an [`AlertApi`].
///
/// Every list load takes a generation number; a response that arrives after
/// a newer load has started is dropped.
pub struct AlertStore<A> {
    api: A,
    state: Mutex<AlertState>,
    generation: AtomicU64,
}

impl<A: AlertApi> AlertStore<A> {
    pub fn new(api: A) -> Self {
        Self::with_page_size(api, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(api: A, page_size: u32) -> Self {
        AlertStore {
            api,
            state: Mutex::new(AlertState::new(page_size)),
            generation: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Copy of the current state for rendering
    pub fn snapshot(&self) -> AlertState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, AlertState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn dispatch(&self, event: AlertEvent) {
        self.lock().apply(event);
    }

    pub fn clear_error(&self) {
        self.dispatch(AlertEvent::ErrorCleared);
    }

    /// Loads the current page, or the first one again when `refresh` is set.
    ///
    /// Page 0 replaces the cached items, later pages are appended. A load of
    /// page 0 supersedes every request still in flight.
    pub async fn load_alerts(&self, refresh: bool) -> ApiResult<()> {
        let query = {
            let mut state = self.lock();
            state.apply(AlertEvent::LoadStarted { refresh });
            let page = if refresh { 0 } else { state.pagination.page };
            state.query(page)
        };

        let supersede = query.page == 0;
        self.fetch_page(query, supersede).await
    }

    pub async fn refresh_alerts(&self) -> ApiResult<()> {
        self.load_alerts(true).await
    }

    /// Fetches the next page. Returns `false` without a request when there is
    /// nothing more to load or a load or refresh is already running.
    ///
    /// The next page never supersedes a refresh or filter change; its own
    /// response is dropped if one of those starts while it is in flight.
    pub async fn load_more_alerts(&self) -> ApiResult<bool> {
        let query = {
            let mut state = self.lock();
            if !state.pagination.has_more || state.loading || state.refreshing {
                debug!(
                    has_more = state.pagination.has_more,
                    loading = state.loading,
                    refreshing = state.refreshing,
                    "Skipping load more"
                );
                return Ok(false);
            }
            state.apply(AlertEvent::NextPageRequested);
            state.apply(AlertEvent::LoadStarted { refresh: false });
            state.query(state.pagination.page)
        };

        self.fetch_page(query, false).await?;
        Ok(true)
    }

    async fn fetch_page(&self, query: AlertQuery, supersede: bool) -> ApiResult<()> {
        let generation = if supersede {
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.generation.load(Ordering::SeqCst)
        };
        debug!(page = query.page, size = query.size, generation, "Loading alerts");

        let result = self.api.list_alerts(&query).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(page = query.page, generation, "Discarding stale alert page");
            return Ok(());
        }

        match result {
            Ok(alerts) => {
                debug!(page = query.page, count = alerts.len(), "Alert page loaded");
                self.dispatch(AlertEvent::PageLoaded {
                    page: query.page,
                    alerts,
                });
                Ok(())
            }
            Err(e) => {
                warn!(page = query.page, error = %e, "Failed to load alerts");
                self.dispatch(AlertEvent::LoadFailed {
                    page: query.page,
                    message: e.user_message(),
                });
                Err(e)
            }
        }
    }

    /// Merges `change` into the filters, clears the cache and reloads from
    /// page 0.
    pub async fn set_filters(&self, change: FilterChange) -> ApiResult<()> {
        self.dispatch(AlertEvent::FiltersChanged(change));
        self.load_alerts(false).await
    }

    /// Selecting the active type again clears the type filter
    pub async fn filter_by_type(&self, alert_type: AlertType) -> ApiResult<()> {
        let current = self.lock().filters.alert_type;
        let next = if current == Some(alert_type) {
            None
        } else {
            Some(alert_type)
        };
        self.set_filters(FilterChange::alert_type(next)).await
    }

    pub async fn filter_by_status(&self, status: AlertStatus) -> ApiResult<()> {
        self.set_filters(FilterChange::status(status)).await
    }

    pub async fn clear_filters(&self) -> ApiResult<()> {
        self.set_filters(FilterChange {
            alert_type: Some(None),
            status: Some(AlertStatus::Active),
        })
        .await
    }

    /// Creates an alert and prepends the server's copy once it is confirmed
    pub async fn create_alert(&self, alert: NewAlert) -> ApiResult<Alert> {
        if alert.username.trim().is_empty() {
            return Err(self.record(ApiError::InvalidInput(
                "username is required to create an alert".to_string(),
            )));
        }

        self.dispatch(AlertEvent::MutationStarted);
        match self.api.create_alert(&alert).await {
            Ok(created) => {
                info!(id = created.id, "Alert created");
                self.dispatch(AlertEvent::AlertCreated(created.clone()));
                Ok(created)
            }
            Err(e) => Err(self.record(e)),
        }
    }

    pub async fn update_alert(&self, id: AlertId, update: AlertUpdate) -> ApiResult<Alert> {
        self.dispatch(AlertEvent::MutationStarted);
        match self.api.update_alert(id, &update).await {
            Ok(updated) => {
                info!(id, "Alert updated");
                self.dispatch(AlertEvent::AlertUpdated(updated.clone()));
                Ok(updated)
            }
            Err(e) => Err(self.record(e)),
        }
    }

    pub async fn resolve_alert(&self, id: AlertId) -> ApiResult<Alert> {
        self.update_alert(id, AlertUpdate::default().resolve()).await
    }

    /// Deletes on the server first; the cached item survives a failure
    pub async fn remove_alert(&self, id: AlertId) -> ApiResult<()> {
        self.dispatch(AlertEvent::MutationStarted);
        match self.api.delete_alert(id).await {
            Ok(()) => {
                info!(id, "Alert deleted");
                self.dispatch(AlertEvent::AlertRemoved(id));
                Ok(())
            }
            Err(e) => Err(self.record(e)),
        }
    }

    pub async fn load_alert_by_id(&self, id: AlertId) -> ApiResult<Alert> {
        self.dispatch(AlertEvent::MutationStarted);
        match self.api.get_alert(id).await {
            Ok(alert) => {
                self.dispatch(AlertEvent::CurrentLoaded(alert.clone()));
                Ok(alert)
            }
            Err(e) => Err(self.record(e)),
        }
    }

    /// Keeps the error in shared state and hands it back for the caller
    fn record(&self, error: ApiError) -> ApiError {
        warn!(error = %error, "Alert action failed");
        self.dispatch(AlertEvent::MutationFailed(error.user_message()));
        error
    }
}
