use crate::browser::FragmentBrowser;
use crate::error::Result;

use super::{FindMatch, Finder, SubstringFinder};

struct Previous {
    query: String,
    found: FindMatch,
}

/// Finder for search-as-you-type.
///
/// When the query grows by appending characters, the longer query is looked
/// for again from where the previous match started, so the user keeps seeing
/// the same occurrence while typing. The same query moves on to the next
/// occurrence. Any other edit starts over from the top of the document.
pub struct ReuseFinder<B> {
    inner: SubstringFinder<B>,
    previous: Option<Previous>,
}

impl<B: FragmentBrowser> ReuseFinder<B> {
    pub fn new(browser: B) -> Self {
        Self {
            inner: SubstringFinder::new(browser),
            previous: None,
        }
    }

    pub fn browser(&self) -> &B {
        self.inner.browser()
    }

    /// A miss keeps the last match, so the next extension still rewinds to it.
    fn remember(&mut self, query: &str, found: Option<FindMatch>) -> Option<FindMatch> {
        if let Some(found) = &found {
            self.previous = Some(Previous {
                query: query.to_string(),
                found: found.clone(),
            });
        }
        found
    }
}

impl<B: FragmentBrowser> Finder for ReuseFinder<B> {
    fn find_first(&mut self, query: &str) -> Result<Option<FindMatch>> {
        let found = self.inner.find_first(query)?;
        Ok(self.remember(query, found))
    }

    fn find_next(&mut self, query: &str) -> Result<Option<FindMatch>> {
        match &self.previous {
            Some(prev) if query.len() > prev.query.len() && query.starts_with(&prev.query) => {
                self.inner
                    .restart_at(prev.found.start().clone(), prev.found.start_offset());
            }
            Some(prev) if prev.query == query => {}
            _ => self.inner.restart(),
        }
        let mut found = self.inner.find_next(query)?;
        if found.is_none() && self.previous.is_some() {
            // The local match no longer holds; there may still be one earlier
            // in the document.
            self.inner.restart();
            found = self.inner.find_next(query)?;
        }
        Ok(self.remember(query, found))
    }
}
