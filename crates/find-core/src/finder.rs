mod instrument;
mod looping;
mod reuse;
mod substring;

use kuchiki::NodeRef;

use crate::browser::DfsFragmentBrowser;
use crate::config::FindConfig;
use crate::error::Result;
use crate::fragment::Fragment;

pub use instrument::{LoggingFinder, TimedFinder};
pub use looping::LoopingFinder;
pub use reuse::ReuseFinder;
pub use substring::SubstringFinder;

/// Stateful, case-insensitive search over the text of a tree.
///
/// Implementations remember where the previous match ended, so repeated
/// `find_next` calls walk through successive occurrences. `Ok(None)` means
/// the end of the document was reached without a match.
pub trait Finder {
    /// Searches from the first fragment of the document.
    fn find_first(&mut self, query: &str) -> Result<Option<FindMatch>>;

    /// Searches from where the previous call stopped, or from the first
    /// fragment when there was no previous call.
    fn find_next(&mut self, query: &str) -> Result<Option<FindMatch>>;
}

impl<F: Finder + ?Sized> Finder for Box<F> {
    fn find_first(&mut self, query: &str) -> Result<Option<FindMatch>> {
        (**self).find_first(query)
    }

    fn find_next(&mut self, query: &str) -> Result<Option<FindMatch>> {
        (**self).find_next(query)
    }
}

/// A match spanning one or more fragments.
///
/// The text of a match is `start[start_offset..]`, then every intermediate
/// fragment in full, then `end[..end_offset]`. When start and end are the
/// same fragment there are no intermediates and the text is
/// `start[start_offset..end_offset]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FindMatch {
    start: Fragment,
    start_offset: usize,
    end: Fragment,
    end_offset: usize,
    intermediates: Vec<Fragment>,
}

impl FindMatch {
    pub fn new(
        start: Fragment,
        start_offset: usize,
        end: Fragment,
        end_offset: usize,
        intermediates: Vec<Fragment>,
    ) -> Self {
        debug_assert!(start != end || (intermediates.is_empty() && start_offset < end_offset));
        Self {
            start,
            start_offset,
            end,
            end_offset,
            intermediates,
        }
    }

    pub fn single(fragment: Fragment, start_offset: usize, end_offset: usize) -> Self {
        Self::new(fragment.clone(), start_offset, fragment, end_offset, Vec::new())
    }

    pub fn start(&self) -> &Fragment {
        &self.start
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn end(&self) -> &Fragment {
        &self.end
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    pub fn intermediates(&self) -> &[Fragment] {
        &self.intermediates
    }

    pub fn is_single_fragment(&self) -> bool {
        self.start == self.end
    }

    pub fn fragment_count(&self) -> usize {
        if self.is_single_fragment() {
            1
        } else {
            self.intermediates.len() + 2
        }
    }

    /// The matched text, read back from the fragments.
    pub fn text(&self) -> String {
        let start = self.start.chars();
        if self.is_single_fragment() {
            let end = self.end_offset.min(start.len());
            return start[self.start_offset.min(end)..end].iter().collect();
        }
        let mut out: String = start[self.start_offset.min(start.len())..].iter().collect();
        for fragment in &self.intermediates {
            out.push_str(&fragment.text());
        }
        let end = self.end.chars();
        out.extend(&end[..self.end_offset.min(end.len())]);
        out
    }
}

/// The plain chain: browser, substring finder, optional instrumentation,
/// wrap-around.
pub fn basic_chain(root: &NodeRef, config: &FindConfig) -> Box<dyn Finder> {
    let browser = DfsFragmentBrowser::with_excluded(root.clone(), &config.excluded_tags);
    let finder = instrument(Box::new(SubstringFinder::new(browser)), config);
    Box::new(LoopingFinder::new(finder))
}

/// Like [`basic_chain`], but a query that extends the previous one is
/// searched again from the previous match instead of after it.
pub fn incremental_chain(root: &NodeRef, config: &FindConfig) -> Box<dyn Finder> {
    let browser = DfsFragmentBrowser::with_excluded(root.clone(), &config.excluded_tags);
    let finder = instrument(Box::new(ReuseFinder::new(browser)), config);
    Box::new(LoopingFinder::new(finder))
}

fn instrument(finder: Box<dyn Finder>, config: &FindConfig) -> Box<dyn Finder> {
    if config.instrumentation {
        Box::new(LoggingFinder::new(TimedFinder::new(finder)))
    } else {
        finder
    }
}

/// Case-insensitive comparison of two chars. Each side is lower-cased in full
/// so a char whose lower case has several code points still compares as one.
pub(crate) fn chars_match(query: char, text: char) -> bool {
    query == text || query.to_lowercase().eq(text.to_lowercase())
}
