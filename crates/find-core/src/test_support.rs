use std::collections::VecDeque;

use kuchiki::NodeRef;

use crate::browser::FragmentBrowser;
use crate::error::{FindError, Result};
use crate::finder::{FindMatch, Finder};
use crate::fragment::Fragment;

/// Browser over free-standing fragments, in the given order.
pub(crate) struct ListBrowser {
    fragments: Vec<Fragment>,
    pub(crate) resumed: Vec<usize>,
}

impl ListBrowser {
    pub(crate) fn new(fragments: &[Fragment]) -> Self {
        Self {
            fragments: fragments.to_vec(),
            resumed: Vec::new(),
        }
    }

    fn index_of(&self, fragment: &Fragment) -> Option<usize> {
        self.fragments.iter().position(|f| f == fragment)
    }
}

impl FragmentBrowser for ListBrowser {
    fn first(&mut self) -> Option<Fragment> {
        self.fragments.first().cloned()
    }

    fn next(&mut self, fragment: &Fragment) -> Result<Option<Fragment>> {
        let idx = self.index_of(fragment).ok_or_else(|| fragment.detached())?;
        Ok(self.fragments.get(idx + 1).cloned())
    }

    fn resume_from(&mut self, fragment: &Fragment) -> Result<()> {
        let idx = self.index_of(fragment).ok_or_else(|| fragment.detached())?;
        self.resumed.push(idx);
        Ok(())
    }
}

pub(crate) fn fragments(texts: &[&str]) -> Vec<Fragment> {
    texts
        .iter()
        .map(|t| Fragment::new(NodeRef::new_text(*t)).unwrap())
        .collect()
}

/// Finder replaying canned answers and recording every call it receives.
#[derive(Default)]
pub(crate) struct ScriptedFinder {
    pub(crate) firsts: VecDeque<Option<FindMatch>>,
    pub(crate) nexts: VecDeque<Option<FindMatch>>,
    pub(crate) fail_next: bool,
    pub(crate) calls: Vec<(&'static str, String)>,
}

impl ScriptedFinder {
    pub(crate) fn count(&self, method: &str) -> usize {
        self.calls.iter().filter(|(m, _)| *m == method).count()
    }
}

impl Finder for ScriptedFinder {
    fn find_first(&mut self, query: &str) -> Result<Option<FindMatch>> {
        self.calls.push(("find_first", query.to_string()));
        Ok(self.firsts.pop_front().flatten())
    }

    fn find_next(&mut self, query: &str) -> Result<Option<FindMatch>> {
        self.calls.push(("find_next", query.to_string()));
        if self.fail_next {
            return Err(FindError::Detached {
                content: query.to_string(),
            });
        }
        Ok(self.nexts.pop_front().flatten())
    }
}
