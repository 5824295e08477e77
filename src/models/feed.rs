//! Decoded arXiv Atom feed: the feed envelope and the papers it carries.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Root of an arXiv API response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub title: String,
    pub id: String,
    pub updated: String,
    pub links: Vec<Link>,
    pub entries: Vec<Entry>,

    /// `opensearch:totalResults`
    pub total_results: i64,

    /// `opensearch:startIndex`
    pub start_index: i64,

    /// `opensearch:itemsPerPage`
    pub items_per_page: i64,
}

impl Feed {
    /// Whether the server reports more matches past this page.
    pub fn has_more(&self) -> bool {
        let shown = i64::try_from(self.entries.len()).unwrap_or(i64::MAX);
        self.start_index.saturating_add(shown) < self.total_results
    }
}

/// A single paper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Abstract page URI, e.g. `http://arxiv.org/abs/2301.12345v1`
    pub id: String,
    pub published: String,
    pub updated: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<Author>,
    pub links: Vec<Link>,
    pub primary_category: Category,
    pub categories: Vec<Category>,

    /// `arxiv:comment`, empty when absent
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,

    /// `arxiv:journal_ref`, empty when absent
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub journal_ref: String,

    /// `arxiv:doi`, empty when absent
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doi: String,
}

impl Entry {
    /// Identifier portion of the abstract URI, version suffix included.
    ///
    /// Handles both `2301.12345v2` and old-style `math.GT/0104020v1` ids.
    pub fn arxiv_id(&self) -> &str {
        match self.id.find("/abs/") {
            Some(pos) => &self.id[pos + 5..],
            None => &self.id,
        }
    }

    /// [`Entry::arxiv_id`] without the trailing `vN`
    pub fn base_id(&self) -> &str {
        let id = self.arxiv_id();
        match id.rfind('v') {
            Some(pos)
                if pos + 1 < id.len() && id[pos + 1..].bytes().all(|b| b.is_ascii_digit()) =>
            {
                &id[..pos]
            }
            _ => id,
        }
    }

    /// PDF link, if the feed carried one
    pub fn pdf_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.title == "pdf" || l.media_type == "application/pdf")
            .map(|l| l.href.as_str())
    }

    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.published.trim()).ok()
    }

    pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.updated.trim()).ok()
    }

    /// Author names joined with `sep`
    pub fn authors_joined(&self, sep: &str) -> String {
        self.authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(sep)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,

    /// `arxiv:affiliation`, empty when absent
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub affiliation: String,
}

/// Subject classification, e.g. `hep-th` in the arXiv taxonomy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub term: String,
    pub scheme: String,
}

/// Related resource: abstract page, PDF, DOI landing page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub title: String,
}
