use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::Result;

use super::{FindMatch, Finder};

/// Reports how long each search took.
pub struct TimedFinder<F> {
    inner: F,
}

impl<F: Finder> TimedFinder<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> F {
        self.inner
    }

    fn timed(&mut self, query: &str, from_start: bool) -> Result<Option<FindMatch>> {
        let started = Instant::now();
        let outcome = if from_start {
            self.inner.find_first(query)
        } else {
            self.inner.find_next(query)
        };
        let elapsed = started.elapsed();
        match &outcome {
            Ok(Some(found)) => {
                debug!(query, from_start, ?elapsed, start = %found.start().text(), "match found")
            }
            Ok(None) => debug!(query, from_start, ?elapsed, "no match found"),
            Err(err) => debug!(query, from_start, ?elapsed, error = %err, "search failed"),
        }
        outcome
    }
}

impl<F: Finder> Finder for TimedFinder<F> {
    fn find_first(&mut self, query: &str) -> Result<Option<FindMatch>> {
        self.timed(query, true)
    }

    fn find_next(&mut self, query: &str) -> Result<Option<FindMatch>> {
        self.timed(query, false)
    }
}

/// Logs the outcome of every search.
pub struct LoggingFinder<F> {
    inner: F,
}

impl<F: Finder> LoggingFinder<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> F {
        self.inner
    }

    fn log(query: &str, outcome: &Result<Option<FindMatch>>) {
        match outcome {
            Ok(Some(found)) => info!(
                query,
                start = %found.start().text(),
                start_offset = found.start_offset(),
                end_offset = found.end_offset(),
                fragments = found.fragment_count(),
                "match found"
            ),
            Ok(None) => info!(query, "no match found"),
            Err(err) => warn!(query, error = %err, "search failed"),
        }
    }
}

impl<F: Finder> Finder for LoggingFinder<F> {
    fn find_first(&mut self, query: &str) -> Result<Option<FindMatch>> {
        let outcome = self.inner.find_first(query);
        Self::log(query, &outcome);
        outcome
    }

    fn find_next(&mut self, query: &str) -> Result<Option<FindMatch>> {
        let outcome = self.inner.find_next(query);
        Self::log(query, &outcome);
        outcome
    }
}
