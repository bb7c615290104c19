use quottie_api::{GithubDataSource, NetworkGithubUser};
use std::sync::Arc;
use tracing::debug;

use crate::classify::fetch_json;
use crate::models::GithubUser;
use crate::Result;

/// The developer's GitHub profile, fetched fresh on every call
#[derive(Clone)]
pub struct GithubUserRepository {
    network: Arc<dyn GithubDataSource>,
}

impl GithubUserRepository {
    pub fn new(network: Arc<dyn GithubDataSource>) -> Self {
        Self { network }
    }

    pub async fn get_github_user(&self) -> Result<GithubUser> {
        let user: NetworkGithubUser = fetch_json(self.network.get_github_user()).await?;
        debug!(login = %user.login, "Fetched GitHub profile");
        Ok(user.into())
    }
}
