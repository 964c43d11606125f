//! Top-level lookups: by arXiv id, by Semantic Scholar id, or by search.

use crate::browser::HeadlessBrowser;
use crate::config::Config;
use crate::fetcher::MetadataFetcher;
use crate::identifier::PaperIdentifier;
use crate::search::SearchAgent;
use crate::{PaperRecord, Result};

/// Resolves queries to full [`PaperRecord`]s.
///
/// Every lookup returns `Ok(Some(record))`, `Ok(None)` when the paper can't
/// be found, or `Err` for operational failures (network, HTTP status,
/// malformed payloads, browser driver errors).
pub struct PaperResolver {
    search: SearchAgent,
    fetcher: MetadataFetcher,
}

impl PaperResolver {
    pub fn new(config: &Config, browser: Box<dyn HeadlessBrowser>) -> Result<Self> {
        Ok(Self {
            search: SearchAgent::new(browser, config),
            fetcher: MetadataFetcher::new(config)?,
        })
    }

    /// Assemble a resolver from already-built components.
    pub fn from_parts(search: SearchAgent, fetcher: MetadataFetcher) -> Self {
        Self { search, fetcher }
    }

    /// Look up by arXiv id. A version suffix (`v2`) is ignored.
    pub fn fetch_from_arxiv_id(&self, arxiv_id: &str) -> Result<Option<PaperRecord>> {
        self.fetcher
            .fetch_with_retry(&PaperIdentifier::arxiv(arxiv_id))
    }

    /// Look up by Semantic Scholar paper id.
    pub fn fetch_from_s2_id(&self, s2_id: &str) -> Result<Option<PaperRecord>> {
        self.fetcher
            .fetch_with_retry(&PaperIdentifier::semantic_scholar(s2_id))
    }

    /// Search by title and first author, accepting only a result whose title
    /// and first author both match.
    pub fn search_exact(&mut self, title: &str, first_author: &str) -> Result<Option<PaperRecord>> {
        match self.search.search_exact(title, first_author)? {
            Some(s2_id) => self.fetch_from_s2_id(&s2_id),
            None => Ok(None),
        }
    }

    /// Search by title (and author, if given) and take the top-ranked result.
    pub fn search_best(
        &mut self,
        title: &str,
        first_author: Option<&str>,
    ) -> Result<Option<PaperRecord>> {
        match self.search.search_best(title, first_author)? {
            Some(s2_id) => self.fetch_from_s2_id(&s2_id),
            None => Ok(None),
        }
    }
}
