//! Orchestration of the search: restore, query, publish.
//!
//! Two triggers are kept apart. [`SearchController::edit`] replaces the
//! filter and queues it for saving but never queries.
//! [`SearchController::submit`] queries with the filter as it is at call time.
//! The saved filter can therefore be ahead of the displayed results.
//!
//! Every submit takes a ticket. A response is applied only while its ticket
//! is still the latest one; a slower response from an earlier submit is
//! dropped.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use api_types::item::ItemSummary;

use crate::{
    categories::{CategoryCatalog, CategoryMenu},
    client::Marketplace,
    error::ApiError,
    filter::{FilterEdit, FilterState},
    query::QuerySpec,
    store::{FilterStore, FilterWriter, SlotBackend},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// What happened to one submitted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The list was published; holds its length.
    Applied(usize),
    /// The query failed; the displayed list was left untouched.
    Failed,
    /// A later submit was issued before this response arrived.
    Stale,
}

/// Receiver of everything the controller publishes.
///
/// Search results and search errors are delivered while the controller state
/// is locked, so an implementation must not call back into the controller.
pub trait SearchView: Send + Sync {
    fn set_items(&self, items: Vec<ItemSummary>);
    fn set_categories(&self, menu: CategoryMenu);
    /// A user-visible error message.
    fn notify(&self, message: String);
}

/// Result of [`SearchController::start`].
#[derive(Debug)]
pub struct StartReport {
    pub categories: Result<usize, ApiError>,
    pub search: SearchOutcome,
}

#[derive(Debug)]
struct Inner {
    filter: FilterState,
    status: SearchStatus,
    latest_ticket: u64,
}

pub struct SearchController<M, B, V> {
    remote: Arc<M>,
    catalog: CategoryCatalog<M>,
    store: Arc<FilterStore<B>>,
    writer: FilterWriter,
    view: V,
    inner: Mutex<Inner>,
}

impl<M, B, V> SearchController<M, B, V>
where
    M: Marketplace,
    B: SlotBackend + 'static,
    V: SearchView,
{
    /// Must be called from within a Tokio runtime: it starts the task that
    /// saves edits.
    pub fn new(remote: Arc<M>, store: FilterStore<B>, view: V) -> Self {
        let store = Arc::new(store);
        Self {
            catalog: CategoryCatalog::new(remote.clone()),
            writer: FilterWriter::spawn(store.clone()),
            remote,
            store,
            view,
            inner: Mutex::new(Inner {
                filter: FilterState::default(),
                status: SearchStatus::Idle,
                latest_ticket: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn filter(&self) -> FilterState {
        self.lock().filter.clone()
    }

    pub fn status(&self) -> SearchStatus {
        self.lock().status
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn store(&self) -> &FilterStore<B> {
        &self.store
    }

    pub fn menu(&self) -> CategoryMenu {
        let selected = self.lock().filter.category;
        self.catalog.menu(selected)
    }

    /// Restores the saved filter, then loads categories and runs the first
    /// query concurrently. A failure of one does not affect the other.
    ///
    /// The filter is restored and the first ticket taken when this is called,
    /// so edits made while the returned future is pending are kept.
    pub fn start(&self) -> impl Future<Output = StartReport> + Send + '_ {
        let restored = self.store.load();
        tracing::info!(
            "starting search session (category={}, keyword={:?})",
            restored.category,
            restored.keyword
        );
        self.lock().filter = restored;

        let search = self.submit();
        async move {
            let (categories, search) = tokio::join!(self.refresh_categories(), search);
            StartReport { categories, search }
        }
    }

    /// Fetches categories and publishes the menu, with the current selection.
    ///
    /// The menu is published on failure too, holding whatever was cached.
    pub async fn refresh_categories(&self) -> Result<usize, ApiError> {
        let result = self.catalog.fetch().await;
        if let Err(err) = &result {
            self.view.notify(message_for_error(err));
        }
        self.view.set_categories(self.menu());
        result.map(|categories| categories.len())
    }

    /// Replaces one field of the filter and queues the whole filter for
    /// saving. Returns without waiting for the save and never queries.
    pub fn edit(&self, edit: FilterEdit) -> FilterState {
        let mut inner = self.lock();
        inner.filter = inner.filter.apply(edit);
        self.writer.queue(inner.filter.clone());
        inner.filter.clone()
    }

    /// Waits until every edit made so far has been saved (or has failed to).
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Issues a query for the current filter.
    ///
    /// The ticket and the query are taken when this is called, not when the
    /// returned future is first polled.
    pub fn submit(&self) -> impl Future<Output = SearchOutcome> + Send + '_ {
        let (ticket, query) = {
            let mut inner = self.lock();
            inner.latest_ticket += 1;
            inner.status = SearchStatus::Loading;
            (inner.latest_ticket, QuerySpec::build(&inner.filter))
        };
        tracing::debug!("search #{ticket}: {query}");
        self.run_query(ticket, query)
    }

    async fn run_query(&self, ticket: u64, query: QuerySpec) -> SearchOutcome {
        let result = self.remote.search(&query).await;

        let mut inner = self.lock();
        if inner.latest_ticket != ticket {
            match &result {
                Ok(_) => tracing::debug!("search #{ticket}: discarding stale response"),
                Err(err) => tracing::debug!("search #{ticket}: discarding stale error: {err}"),
            }
            return SearchOutcome::Stale;
        }

        match result {
            Ok(items) => {
                let count = items.len();
                inner.status = SearchStatus::Ready;
                self.view.set_items(items);
                SearchOutcome::Applied(count)
            }
            Err(err) => {
                tracing::warn!("search #{ticket} failed: {err}");
                inner.status = SearchStatus::Failed;
                self.view.notify(message_for_error(&err));
                SearchOutcome::Failed
            }
        }
    }
}

fn message_for_error(err: &ApiError) -> String {
    match err {
        ApiError::Network(err) if err.is_timeout() => "Server did not answer in time.".to_string(),
        ApiError::Network(err) => format!("Server unreachable: {err}"),
        ApiError::Server { message, .. } => message.clone(),
        ApiError::InvalidUrl(message) | ApiError::InvalidHeader(message) => {
            format!("Bad configuration: {message}")
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn server_message_is_shown_as_is() {
        let err = ApiError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "db down".to_string(),
        };
        assert_eq!(message_for_error(&err), "db down");
    }

    #[test]
    fn configuration_errors_are_labelled() {
        assert_eq!(
            message_for_error(&ApiError::InvalidUrl("x: relative URL".to_string())),
            "Bad configuration: x: relative URL"
        );
        assert_eq!(
            message_for_error(&ApiError::InvalidHeader("bad byte".to_string())),
            "Bad configuration: bad byte"
        );
    }
}
