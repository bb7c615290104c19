use async_trait::async_trait;

use crate::{build_http_client, execute, RawResponse, TransportError};

const GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_LOGIN: &str = "ngapp-dev";

/// Profile lookup for the app's developer account
#[async_trait]
pub trait GithubDataSource: Send + Sync {
    async fn get_github_user(&self) -> Result<RawResponse, TransportError>;
}

pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
    login: String,
}

impl GithubClient {
    pub fn new() -> Self {
        Self::with_base_url(GITHUB_API_BASE.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: build_http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            login: DEFAULT_LOGIN.to_string(),
        }
    }

    pub fn with_login(mut self, login: String) -> Self {
        self.login = login;
        self
    }

    fn user_request(&self) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/users/{}",
            self.base_url,
            urlencoding::encode(&self.login)
        );
        self.client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GithubDataSource for GithubClient {
    async fn get_github_user(&self) -> Result<RawResponse, TransportError> {
        execute(self.user_request()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_request_path() {
        let client = GithubClient::with_base_url("https://gh.test/".to_string());
        let request = client.user_request().build().unwrap();
        assert_eq!(request.url().as_str(), "https://gh.test/users/ngapp-dev");
    }

    #[test]
    fn test_login_is_configurable() {
        let client = GithubClient::new().with_login("octocat".to_string());
        let request = client.user_request().build().unwrap();
        assert_eq!(request.url().as_str(), "https://api.github.com/users/octocat");
        assert_eq!(
            request.headers()[reqwest::header::ACCEPT],
            "application/vnd.github+json"
        );
    }
}
