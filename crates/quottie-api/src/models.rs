// Wire models for the quote backend and the wiki metadata API
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Paged envelope returned by the list and search endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResponse<T> {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub last_item_index: Option<u32>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkQuote {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub author_slug: String,
    #[serde(default)]
    pub length: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub date_modified: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAuthor {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub quote_count: u32,
}

/// `action=query&prop=pageimages` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkWiki {
    #[serde(default, rename = "batchcomplete")]
    pub batch_complete: String,
    pub query: NetworkWikiQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkWikiQuery {
    #[serde(default)]
    pub normalized: Vec<NetworkNormalized>,
    #[serde(default)]
    pub pages: HashMap<String, NetworkWikiPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkWikiPage {
    #[serde(default, rename = "pageid")]
    pub page_id: i64,
    #[serde(default)]
    pub ns: i32,
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<NetworkThumbnail>,
    #[serde(default, rename = "pageimage")]
    pub page_image: Option<String>,
}

/// Title rewrite applied by the wiki (e.g. underscores to spaces)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkNormalized {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkThumbnail {
    pub source: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// `GET /users/{login}` response; only the fields the about screen shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkGithubUser {
    pub login: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub bio: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quote_envelope() {
        let body = r#"{
            "count": 1, "totalCount": 2127, "page": 1, "totalPages": 2127, "lastItemIndex": 1,
            "results": [{
                "_id": "abc", "content": "Stay hungry.", "author": "Steve Jobs",
                "authorSlug": "steve-jobs", "length": 12, "tags": ["Famous Quotes"],
                "dateAdded": "2023-04-14", "dateModified": "2023-04-14"
            }]
        }"#;

        let parsed: NetworkResponse<NetworkQuote> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.total_count, 2127);
        assert_eq!(parsed.results[0].id, "abc");
        assert_eq!(parsed.results[0].author_slug, "steve-jobs");
    }

    #[test]
    fn test_parse_wiki_pages() {
        let body = r#"{
            "batchcomplete": "",
            "query": {
                "normalized": [{"from": "Albert_Einstein", "to": "Albert Einstein"}],
                "pages": {
                    "736": {
                        "pageid": 736, "ns": 0, "title": "Albert Einstein",
                        "thumbnail": {"source": "https://upload.example/einstein.jpg", "width": 500, "height": 600},
                        "pageimage": "Einstein.jpg"
                    }
                }
            }
        }"#;

        let wiki: NetworkWiki = serde_json::from_str(body).unwrap();
        assert_eq!(wiki.query.normalized[0].to, "Albert Einstein");
        let page = &wiki.query.pages["736"];
        assert_eq!(
            page.thumbnail.as_ref().map(|t| t.source.as_str()),
            Some("https://upload.example/einstein.jpg")
        );
    }

    #[test]
    fn test_wiki_without_normalized_section() {
        let body = r#"{"query": {"pages": {"-1": {"ns": 0, "title": "Nobody", "missing": ""}}}}"#;
        let wiki: NetworkWiki = serde_json::from_str(body).unwrap();
        assert!(wiki.query.normalized.is_empty());
        assert!(wiki.query.pages["-1"].thumbnail.is_none());
    }

    #[test]
    fn test_parse_github_user_with_null_name() {
        let body = r#"{
            "login": "octocat", "id": 583231, "name": null, "bio": null,
            "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
            "html_url": "https://github.com/octocat", "public_repos": 8
        }"#;

        let parsed: NetworkGithubUser = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.login, "octocat");
        assert!(parsed.name.is_none());
        assert_eq!(parsed.html_url, "https://github.com/octocat");
    }
}
