// Remote data sources: the quote backend, the wiki metadata lookup and the
// developer's GitHub profile.
// Responses come back unparsed; classification happens in quottie-core.
pub mod error;
pub mod github;
pub mod models;
pub mod quotable;
pub mod wikipedia;

pub use error::{RawResponse, TransportError};
pub use github::{GithubClient, GithubDataSource};
pub use models::{
    NetworkAuthor, NetworkGithubUser, NetworkNormalized, NetworkQuote, NetworkResponse,
    NetworkThumbnail, NetworkWiki, NetworkWikiPage, NetworkWikiQuery,
};
pub use quotable::{ListParams, QuotableClient, QuotesDataSource};
pub use wikipedia::{WikiDataSource, WikipediaClient};

/// User agent sent with every request
pub(crate) const USER_AGENT: &str = concat!("Quottie/", env!("CARGO_PKG_VERSION"));

/// Build the shared reqwest client. Timeouts stay at reqwest's defaults.
pub(crate) fn build_http_client() -> reqwest::Client {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(USER_AGENT),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .expect("Failed to build HTTP client")
}

/// Send a request and hand back status + body without interpreting either
pub(crate) async fn execute(
    request: reqwest::RequestBuilder,
) -> Result<RawResponse, TransportError> {
    let response = request.send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    tracing::debug!(status, bytes = body.len(), "Received response");
    Ok(RawResponse { status, body })
}
