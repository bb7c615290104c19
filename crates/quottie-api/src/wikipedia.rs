use async_trait::async_trait;

use crate::{build_http_client, execute, RawResponse, TransportError};

const WIKIPEDIA_API_BASE: &str = "https://en.wikipedia.org";
const DEFAULT_THUMBNAIL_SIZE: u32 = 500;

/// Page-image lookup against a MediaWiki instance
#[async_trait]
pub trait WikiDataSource: Send + Sync {
    /// `titles` is a pipe-separated list of page titles
    async fn get_page_images(&self, titles: &str) -> Result<RawResponse, TransportError>;
}

pub struct WikipediaClient {
    client: reqwest::Client,
    base_url: String,
    thumbnail_size: u32,
}

impl WikipediaClient {
    pub fn new() -> Self {
        Self::with_base_url(WIKIPEDIA_API_BASE.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: build_http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }

    pub fn with_thumbnail_size(mut self, size: u32) -> Self {
        self.thumbnail_size = size;
        self
    }

    fn page_images_request(&self, titles: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/w/api.php", self.base_url);
        let size = self.thumbnail_size.to_string();
        self.client.get(url).query(&[
            ("action", "query"),
            ("format", "json"),
            ("prop", "pageimages"),
            ("piprop", "thumbnail|name"),
            ("pithumbsize", size.as_str()),
            ("titles", titles),
        ])
    }
}

impl Default for WikipediaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WikiDataSource for WikipediaClient {
    async fn get_page_images(&self, titles: &str) -> Result<RawResponse, TransportError> {
        execute(self.page_images_request(titles)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_images_request() {
        let client = WikipediaClient::with_base_url("https://wiki.test".to_string())
            .with_thumbnail_size(320);
        let request = client
            .page_images_request("Albert_Einstein|Mark_Twain")
            .build()
            .unwrap();

        let url = request.url();
        assert_eq!(url.path(), "/w/api.php");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("pithumbsize".to_string(), "320".to_string())));
        assert!(pairs.contains(&(
            "titles".to_string(),
            "Albert_Einstein|Mark_Twain".to_string()
        )));
    }
}
