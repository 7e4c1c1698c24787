//! Catalog search for the marketplace storefront.
//!
//! The crate owns the search filter, keeps it in a persisted slot, turns it
//! into the parameters of the server's search endpoint and keeps the
//! displayed result list in step with the latest submit. Rendering is left to
//! a [`SearchView`].

pub use categories::{ALL_LABEL, CategoryCatalog, CategoryMenu, CategoryOption};
pub use client::{ApiClient, ApiClientBuilder, Marketplace};
pub use controller::{
    SearchController, SearchOutcome, SearchStatus, SearchView, StartReport,
};
pub use error::{ApiError, StoreError};
pub use filter::{CategorySelector, DEFAULT_PRICE_MAX, DEFAULT_PRICE_MIN, FilterEdit, FilterState};
pub use query::QuerySpec;
pub use store::{FILTER_SLOT, FileSlots, FilterStore, FilterWriter, MemorySlots, SlotBackend};

mod categories;
mod client;
mod controller;
mod error;
mod filter;
pub mod query;
mod store;
