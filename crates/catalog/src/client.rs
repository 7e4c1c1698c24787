//! HTTP access to the marketplace server.

use std::{future::Future, time::Duration};

use api_types::{category::Category, error::ErrorBody, item::ItemSummary};
use reqwest::{
    Response, StatusCode, Url,
    header::{self, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;

use crate::{error::ApiError, query::QuerySpec};

const CATEGORIES_PATH: &str = "items/categories";
const SEARCH_PATH: &str = "search-detail";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The two remote calls the catalog needs.
pub trait Marketplace: Send + Sync {
    /// `GET /items/categories`.
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;

    /// `GET /search-detail` with the given parameters.
    fn search(
        &self,
        query: &QuerySpec,
    ) -> impl Future<Output = Result<Vec<ItemSummary>, ApiError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))
    }

    async fn get(&self, url: Url) -> Result<Response, ApiError> {
        Ok(self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?)
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => "server error".to_string(),
        };
        Err(ApiError::Server { status, message })
    }
}

impl Marketplace for ApiClient {
    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = self.endpoint(CATEGORIES_PATH)?;
        let resp = self.get(url).await?;
        let categories = Self::read_json::<Option<Vec<Category>>>(resp).await?;
        Ok(categories.unwrap_or_default())
    }

    async fn search(&self, query: &QuerySpec) -> Result<Vec<ItemSummary>, ApiError> {
        let mut url = self.endpoint(SEARCH_PATH)?;
        query.append_to(&mut url);

        let resp = self.get(url).await?;
        if resp.status() != StatusCode::NOT_FOUND {
            let items = Self::read_json::<Option<Vec<ItemSummary>>>(resp).await?;
            return Ok(items.unwrap_or_default());
        }

        // The search handler answers 404 with an error body when nothing
        // matches. A bare 404 means the route itself is missing.
        match resp.json::<ErrorBody>().await {
            Ok(body) => {
                tracing::debug!("search matched nothing: {}", body.message);
                Ok(Vec::new())
            }
            Err(_) => Err(ApiError::Server {
                status: StatusCode::NOT_FOUND,
                message: "search endpoint not found".to_string(),
            }),
        }
    }
}

#[derive(Default, Debug)]
pub struct ApiClientBuilder {
    base_url: String,
    timeout: Option<Duration>,
    token: Option<String>,
}

impl ApiClientBuilder {
    pub fn base_url(mut self, base_url: &str) -> ApiClientBuilder {
        self.base_url = base_url.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> ApiClientBuilder {
        self.timeout = Some(timeout);
        self
    }

    /// Bearer token of the logged-in user, if any.
    pub fn token(mut self, token: Option<&str>) -> ApiClientBuilder {
        self.token = token.filter(|t| !t.is_empty()).map(str::to_string);
        self
    }

    pub fn build(self) -> Result<ApiClient, ApiError> {
        // `Url::join` replaces the last segment unless the path ends with '/'.
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url =
            Url::parse(&raw).map_err(|err| ApiError::InvalidUrl(format!("{raw}: {err}")))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = self.token {
            let mut auth = HeaderValue::try_from(format!("Bearer {token}"))
                .map_err(|err| ApiError::InvalidHeader(err.to_string()))?;
            auth.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, auth);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        Ok(ApiClient { base_url, http })
    }
}
