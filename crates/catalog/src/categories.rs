//! Selectable categories.
//!
//! The list comes from the server once per session. The "All" option is not
//! part of it: it is synthesized here and always comes first.

use std::sync::{Arc, Mutex, PoisonError};

use api_types::category::Category;

use crate::{client::Marketplace, error::ApiError, filter::CategorySelector};

pub const ALL_LABEL: &str = "All";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryOption {
    pub selector: CategorySelector,
    pub name: String,
}

/// Options to show in the category picker, with the current selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryMenu {
    pub options: Vec<CategoryOption>,
    pub selected: CategorySelector,
}

impl CategoryMenu {
    /// Whether the selection is one of the options. A restored id the server
    /// no longer lists is kept as selected but is not found here.
    pub fn selected_known(&self) -> bool {
        self.options.iter().any(|o| o.selector == self.selected)
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.selector == self.selected)
            .map(|o| o.name.as_str())
    }
}

#[derive(Debug)]
pub struct CategoryCatalog<M> {
    remote: Arc<M>,
    cached: Mutex<Vec<Category>>,
}

impl<M: Marketplace> CategoryCatalog<M> {
    pub fn new(remote: Arc<M>) -> Self {
        Self {
            remote,
            cached: Mutex::new(Vec::new()),
        }
    }

    /// Fetches the categories and replaces the cached list.
    ///
    /// On failure the error is returned and the previous list is kept, so the
    /// menu degrades to whatever was known (only "All" on a first fetch).
    pub async fn fetch(&self) -> Result<Vec<Category>, ApiError> {
        match self.remote.categories().await {
            Ok(categories) => {
                tracing::debug!("fetched {} categories", categories.len());
                *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = categories.clone();
                Ok(categories)
            }
            Err(err) => {
                tracing::warn!("category fetch failed: {err}");
                Err(err)
            }
        }
    }

    pub fn menu(&self, selected: CategorySelector) -> CategoryMenu {
        let cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        let mut options = Vec::with_capacity(cached.len() + 1);
        options.push(CategoryOption {
            selector: CategorySelector::All,
            name: ALL_LABEL.to_string(),
        });
        // Ids the selector cannot represent are not selectable.
        options.extend(cached.iter().filter_map(|c| {
            CategorySelector::try_from(c.id)
                .ok()
                .filter(|s| !s.is_all())
                .map(|selector| CategoryOption {
                    selector,
                    name: c.name.clone(),
                })
        }));
        CategoryMenu { options, selected }
    }
}

#[cfg(test)]
mod tests {
    use api_types::item::ItemSummary;
    use reqwest::StatusCode;

    use super::*;
    use crate::query::QuerySpec;

    struct Fixed(Option<Vec<Category>>);

    impl Marketplace for Fixed {
        async fn categories(&self) -> Result<Vec<Category>, ApiError> {
            self.0.clone().ok_or(ApiError::Server {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "down".to_string(),
            })
        }

        async fn search(&self, _query: &QuerySpec) -> Result<Vec<ItemSummary>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn cat(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn all_comes_first_then_server_order() {
        let catalog = CategoryCatalog::new(Arc::new(Fixed(Some(vec![
            cat(2, "books"),
            cat(1, "fashion"),
        ]))));
        catalog.fetch().await.unwrap();

        let menu = catalog.menu(CategorySelector::Id(1));
        let names: Vec<&str> = menu.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["All", "books", "fashion"]);
        assert_eq!(menu.selected_name(), Some("fashion"));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_only_all() {
        let catalog = CategoryCatalog::new(Arc::new(Fixed(None)));
        assert!(catalog.fetch().await.is_err());

        let menu = catalog.menu(CategorySelector::Id(3));
        assert_eq!(menu.options.len(), 1);
        assert_eq!(menu.options[0].selector, CategorySelector::All);
        assert_eq!(menu.selected, CategorySelector::Id(3));
        assert!(!menu.selected_known());
    }
}
