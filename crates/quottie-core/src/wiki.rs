// Author portraits come from the wiki's page-image lookup. One request per
// batch of authors: titles are pipe-joined, and the response maps each
// requested title (possibly normalized) to a page with an optional thumbnail.
use quottie_api::{NetworkNormalized, NetworkThumbnail, NetworkWiki, NetworkWikiPage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::Author;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiResource {
    pub batch_complete: String,
    pub query: WikiQueryResource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiQueryResource {
    pub normalized: Vec<NormalizedResource>,
    pub pages: HashMap<String, WikiPageResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiPageResource {
    pub page_id: i64,
    pub ns: i32,
    pub title: String,
    pub thumbnail: Option<ThumbnailResource>,
    pub page_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResource {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailResource {
    pub source: String,
    pub width: u32,
    pub height: u32,
}

impl From<NetworkWiki> for WikiResource {
    fn from(wiki: NetworkWiki) -> Self {
        Self {
            batch_complete: wiki.batch_complete,
            query: WikiQueryResource {
                normalized: wiki.query.normalized.into_iter().map(Into::into).collect(),
                pages: wiki
                    .query
                    .pages
                    .into_iter()
                    .map(|(id, page)| (id, page.into()))
                    .collect(),
            },
        }
    }
}

impl From<NetworkNormalized> for NormalizedResource {
    fn from(n: NetworkNormalized) -> Self {
        Self { from: n.from, to: n.to }
    }
}

impl From<NetworkWikiPage> for WikiPageResource {
    fn from(page: NetworkWikiPage) -> Self {
        Self {
            page_id: page.page_id,
            ns: page.ns,
            title: page.title,
            thumbnail: page.thumbnail.map(Into::into),
            page_image: page.page_image,
        }
    }
}

impl From<NetworkThumbnail> for ThumbnailResource {
    fn from(t: NetworkThumbnail) -> Self {
        Self {
            source: t.source,
            width: t.width,
            height: t.height,
        }
    }
}

impl WikiResource {
    /// Thumbnail URL for `author`, or empty if the wiki has none
    ///
    /// The requested title is looked up in the normalization table first;
    /// without an entry the author's display name is used as the page title.
    pub fn image_for(&self, author: &Author) -> String {
        let requested = wiki_title(&author.link);
        let title = self
            .query
            .normalized
            .iter()
            .find(|n| n.from == requested)
            .map(|n| n.to.as_str())
            .unwrap_or(author.name.as_str());

        self.query
            .pages
            .values()
            .find(|page| page.title == title)
            .and_then(|page| page.thumbnail.as_ref())
            .map(|thumb| thumb.source.clone())
            .unwrap_or_default()
    }
}

/// Wiki page title from an author link: whatever follows the last `/wiki/`,
/// or the whole link if it has none
pub fn wiki_title(link: &str) -> &str {
    match link.rfind("/wiki/") {
        Some(index) => &link[index + "/wiki/".len()..],
        None => link,
    }
}

pub fn join_wiki_titles(authors: &[Author]) -> String {
    authors
        .iter()
        .map(|author| wiki_title(&author.link))
        .collect::<Vec<_>>()
        .join("|")
}

pub fn apply_wiki_images(authors: Vec<Author>, wiki: &WikiResource) -> Vec<Author> {
    authors
        .into_iter()
        .map(|author| Author {
            image: wiki.image_for(&author),
            ..author
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(name: &str, link: &str) -> Author {
        Author {
            id: name.to_lowercase(),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            bio: String::new(),
            description: String::new(),
            link: link.to_string(),
            quote_count: 1,
            image: String::new(),
            is_bookmarked: false,
        }
    }

    fn page(title: &str, source: Option<&str>) -> WikiPageResource {
        WikiPageResource {
            page_id: 1,
            ns: 0,
            title: title.to_string(),
            thumbnail: source.map(|s| ThumbnailResource {
                source: s.to_string(),
                width: 500,
                height: 500,
            }),
            page_image: None,
        }
    }

    fn wiki(normalized: &[(&str, &str)], pages: Vec<WikiPageResource>) -> WikiResource {
        WikiResource {
            batch_complete: String::new(),
            query: WikiQueryResource {
                normalized: normalized
                    .iter()
                    .map(|(from, to)| NormalizedResource {
                        from: from.to_string(),
                        to: to.to_string(),
                    })
                    .collect(),
                pages: pages
                    .into_iter()
                    .enumerate()
                    .map(|(i, p)| (i.to_string(), p))
                    .collect(),
            },
        }
    }

    #[test]
    fn test_wiki_title_extraction() {
        assert_eq!(wiki_title("https://en.wikipedia.org/wiki/Mark_Twain"), "Mark_Twain");
        assert_eq!(wiki_title("https://x/wiki/a/wiki/B"), "B");
        assert_eq!(wiki_title("Mark_Twain"), "Mark_Twain");
    }

    #[test]
    fn test_titles_are_pipe_joined() {
        let authors = vec![
            author("Mark Twain", "https://en.wikipedia.org/wiki/Mark_Twain"),
            author("Oscar Wilde", "https://en.wikipedia.org/wiki/Oscar_Wilde"),
        ];
        assert_eq!(join_wiki_titles(&authors), "Mark_Twain|Oscar_Wilde");
    }

    #[test]
    fn test_image_via_normalized_title() {
        let twain = author("Samuel Clemens", "https://en.wikipedia.org/wiki/Mark_Twain");
        let resource = wiki(
            &[("Mark_Twain", "Mark Twain")],
            vec![page("Mark Twain", Some("https://img/twain.jpg"))],
        );
        assert_eq!(resource.image_for(&twain), "https://img/twain.jpg");
    }

    #[test]
    fn test_image_falls_back_to_author_name() {
        let wilde = author("Oscar Wilde", "https://en.wikipedia.org/wiki/Oscar_Wilde");
        let resource = wiki(&[], vec![page("Oscar Wilde", Some("https://img/wilde.jpg"))]);
        assert_eq!(resource.image_for(&wilde), "https://img/wilde.jpg");
    }

    #[test]
    fn test_missing_page_or_thumbnail_is_blank() {
        let nobody = author("Nobody", "https://en.wikipedia.org/wiki/Nobody");
        assert_eq!(wiki(&[], vec![]).image_for(&nobody), "");
        assert_eq!(wiki(&[], vec![page("Nobody", None)]).image_for(&nobody), "");
    }

    #[test]
    fn test_apply_sets_each_image() {
        let authors = vec![
            author("Mark Twain", "https://en.wikipedia.org/wiki/Mark_Twain"),
            author("Nobody", "https://en.wikipedia.org/wiki/Nobody"),
        ];
        let resource = wiki(
            &[("Mark_Twain", "Mark Twain")],
            vec![page("Mark Twain", Some("https://img/twain.jpg"))],
        );

        let enriched = apply_wiki_images(authors, &resource);
        assert_eq!(enriched[0].image, "https://img/twain.jpg");
        assert_eq!(enriched[1].image, "");
    }
}
