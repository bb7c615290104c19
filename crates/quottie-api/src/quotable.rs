use async_trait::async_trait;
use tracing::debug;

use crate::{build_http_client, execute, RawResponse, TransportError};

const QUOTABLE_API_BASE: &str = "https://api.quotable.io";

/// Sorting, scope and paging parameters shared by list and search calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub sort_by: String,
    pub order: String,
    /// Author slugs to restrict results to; empty means no restriction
    pub slugs: Vec<String>,
    pub page_size: u32,
    pub page: u32,
}

/// Calls against the quote backend
///
/// Implementations return the response untouched. Status codes and payload
/// parsing are someone else's problem.
#[async_trait]
pub trait QuotesDataSource: Send + Sync {
    async fn get_quotes(&self, params: &ListParams) -> Result<RawResponse, TransportError>;

    async fn search_quotes(
        &self,
        query: &str,
        params: &ListParams,
    ) -> Result<RawResponse, TransportError>;

    async fn get_authors(&self, params: &ListParams) -> Result<RawResponse, TransportError>;

    async fn search_authors(
        &self,
        query: &str,
        params: &ListParams,
    ) -> Result<RawResponse, TransportError>;

    async fn get_quote_detail(&self, quote_id: &str) -> Result<RawResponse, TransportError>;

    async fn get_author_detail(&self, author_id: &str) -> Result<RawResponse, TransportError>;

    async fn get_random_quotes(&self, limit: u32) -> Result<RawResponse, TransportError>;
}

pub struct QuotableClient {
    client: reqwest::Client,
    base_url: String,
}

impl QuotableClient {
    pub fn new() -> Self {
        Self::with_base_url(QUOTABLE_API_BASE.to_string())
    }

    /// For mirrors of the backend or local test servers
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: build_http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a list/search request. `scope_param` is the name the endpoint
    /// expects for the comma-joined slug list.
    fn list_request(
        &self,
        path: &str,
        scope_param: &str,
        query: Option<&str>,
        params: &ListParams,
    ) -> reqwest::RequestBuilder {
        let mut pairs: Vec<(&str, String)> = Vec::with_capacity(6);
        if let Some(query) = query {
            pairs.push(("query", query.to_string()));
        }
        pairs.push(("sortBy", params.sort_by.clone()));
        pairs.push(("order", params.order.clone()));
        if !params.slugs.is_empty() {
            pairs.push((scope_param, params.slugs.join(",")));
        }
        pairs.push(("limit", params.page_size.to_string()));
        pairs.push(("page", params.page.to_string()));

        let url = format!("{}{}", self.base_url, path);
        debug!(%url, page = params.page, "Building list request");
        self.client.get(url).query(&pairs)
    }

    /// `/{collection}/{id}` with the id path-encoded
    fn detail_request(&self, collection: &str, id: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, collection, urlencoding::encode(id));
        self.client.get(url)
    }

    fn random_quotes_request(&self, limit: u32) -> reqwest::RequestBuilder {
        let url = format!("{}/quotes/random", self.base_url);
        self.client.get(url).query(&[("limit", limit.to_string())])
    }
}

impl Default for QuotableClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuotesDataSource for QuotableClient {
    async fn get_quotes(&self, params: &ListParams) -> Result<RawResponse, TransportError> {
        execute(self.list_request("/quotes", "author", None, params)).await
    }

    async fn search_quotes(
        &self,
        query: &str,
        params: &ListParams,
    ) -> Result<RawResponse, TransportError> {
        execute(self.list_request("/search/quotes", "slug", Some(query), params)).await
    }

    async fn get_authors(&self, params: &ListParams) -> Result<RawResponse, TransportError> {
        execute(self.list_request("/authors", "slug", None, params)).await
    }

    async fn search_authors(
        &self,
        query: &str,
        params: &ListParams,
    ) -> Result<RawResponse, TransportError> {
        execute(self.list_request("/search/authors", "slug", Some(query), params)).await
    }

    async fn get_quote_detail(&self, quote_id: &str) -> Result<RawResponse, TransportError> {
        execute(self.detail_request("quotes", quote_id)).await
    }

    async fn get_author_detail(&self, author_id: &str) -> Result<RawResponse, TransportError> {
        execute(self.detail_request("authors", author_id)).await
    }

    async fn get_random_quotes(&self, limit: u32) -> Result<RawResponse, TransportError> {
        execute(self.random_quotes_request(limit)).await
    }
}
