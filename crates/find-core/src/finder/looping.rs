use crate::error::Result;

use super::{FindMatch, Finder};

/// Wraps around: once the inner finder runs off the end of the document, the
/// same call starts over from the first fragment.
pub struct LoopingFinder<F> {
    inner: F,
    first: bool,
    /// Query known to have no occurrence at all.
    exhausted: Option<String>,
}

impl<F: Finder> LoopingFinder<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            first: true,
            exhausted: None,
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn into_inner(self) -> F {
        self.inner
    }

    fn from_start(&mut self, query: &str) -> Result<Option<FindMatch>> {
        let found = self.inner.find_first(query)?;
        match found {
            Some(_) => self.first = false,
            None => self.exhausted = Some(query.to_string()),
        }
        Ok(found)
    }
}

impl<F: Finder> Finder for LoopingFinder<F> {
    fn find_first(&mut self, query: &str) -> Result<Option<FindMatch>> {
        self.first = false;
        self.exhausted = None;
        self.from_start(query)
    }

    fn find_next(&mut self, query: &str) -> Result<Option<FindMatch>> {
        if self.exhausted.as_deref() == Some(query) {
            return Ok(None);
        }
        self.exhausted = None;
        if self.first {
            return self.from_start(query);
        }
        match self.inner.find_next(query)? {
            Some(found) => Ok(Some(found)),
            None => self.from_start(query),
        }
    }
}
