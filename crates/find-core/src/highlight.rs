//! Marks matches in the tree and takes the marks out again.
//!
//! The finder keeps a reference to the text node its last match ended in.
//! Highlighting splits that node, so before the finder is queried again
//! every split has to be undone: markers are unwrapped and the text around
//! them merged back into the original node. `Highlighter` does this itself
//! before each search, and [`Highlight`] does it when dropped. The tree has
//! to go through [`prepare`] before the first search for the merge to
//! restore it exactly; [`Highlighter::from_root`] takes care of that.
//!
//! Any `<mark class="page_find">` in the page, including ones the page
//! authored itself, is treated as a marker. [`prepare`] takes those out up
//! front: unwrapping one later would merge text nodes the browser has
//! already counted.

use kuchiki::NodeRef;
use tracing::{trace, warn};

use crate::config::FindConfig;
use crate::error::Result;
use crate::finder::{basic_chain, FindMatch, Finder};
use crate::fragment::Fragment;
use crate::tree;

pub const MARKER_TAG: &str = "mark";
pub const MARKER_CLASS: &str = "page_find";

pub struct Highlighter<F = Box<dyn Finder>> {
    finder: F,
    /// Markers inserted by the last highlight, in document order.
    applied: Vec<NodeRef>,
    last_match: Option<FindMatch>,
}

/// Readies `root` for searching: removes every marker already in it, then
/// merges adjacent text nodes.
pub fn prepare(root: &NodeRef) -> Result<()> {
    let removed = remove_markers(root)?;
    tree::normalize(root);
    trace!(removed, "prepared tree");
    Ok(())
}

fn remove_markers(root: &NodeRef) -> Result<usize> {
    let mut removed = 0;
    for marker in tree::elements_by_tag(root, MARKER_TAG).iter().rev() {
        if !tree::has_class(marker, MARKER_CLASS) {
            continue;
        }
        let parent = tree::unwrap(marker)?;
        tree::normalize_children(&parent);
        removed += 1;
    }
    Ok(removed)
}

impl Highlighter<Box<dyn Finder>> {
    /// Prepares `root` and searches it with the default chain.
    pub fn from_root(root: &NodeRef, config: &FindConfig) -> Result<Self> {
        prepare(root)?;
        Ok(Self::new(basic_chain(root, config)))
    }
}

impl<F: Finder> Highlighter<F> {
    /// `finder` must browse a tree that went through [`prepare`].
    pub fn new(finder: F) -> Self {
        Self {
            finder,
            applied: Vec::new(),
            last_match: None,
        }
    }

    pub fn finder(&self) -> &F {
        &self.finder
    }

    /// Number of markers currently applied by this highlighter.
    pub fn applied(&self) -> usize {
        self.applied.len()
    }

    /// The match highlighted last, while its markers are in place.
    pub fn last_match(&self) -> Option<&FindMatch> {
        self.last_match.as_ref()
    }

    /// Highlights the next occurrence of `query`. Markers from the previous
    /// call are removed first. Returns `false` when there is no occurrence.
    pub fn highlight_next(&mut self, query: &str) -> Result<bool> {
        if query.is_empty() {
            return Ok(false);
        }
        self.release()?;
        match self.finder.find_next(query)? {
            Some(found) => {
                self.apply(&found)?;
                self.last_match = Some(found);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Like [`Self::highlight_next`], but the markers only live as long as
    /// the returned guard.
    pub fn highlight(&mut self, query: &str) -> Result<Option<Highlight<'_, F>>> {
        if self.highlight_next(query)? {
            Ok(Some(Highlight { highlighter: self }))
        } else {
            Ok(None)
        }
    }

    /// Removes every marker below `root`, whoever applied it.
    pub fn clear(&mut self, root: &NodeRef) -> Result<()> {
        let removed = remove_markers(root)?;
        trace!(removed, "cleared highlights");
        self.applied.clear();
        self.last_match = None;
        Ok(())
    }

    fn apply(&mut self, found: &FindMatch) -> Result<()> {
        // Decide before splitting: splitting changes what `end` refers to.
        let distinct_end = !found.is_single_fragment();
        tree::split_text(found.end(), found.end_offset())?;
        let matched = tree::split_text(found.start(), found.start_offset())?;

        self.wrap(&matched)?;
        for fragment in found.intermediates() {
            self.wrap(fragment)?;
        }
        if distinct_end {
            self.wrap(found.end())?;
        }
        trace!(markers = self.applied.len(), "applied highlight");
        Ok(())
    }

    fn wrap(&mut self, fragment: &Fragment) -> Result<()> {
        let marker = tree::new_element(MARKER_TAG, &[("class", MARKER_CLASS)]);
        tree::wrap(fragment, &marker)?;
        self.applied.push(marker);
        Ok(())
    }

    /// Unwraps the markers of the last highlight and merges the text they
    /// split.
    fn release(&mut self) -> Result<()> {
        self.last_match = None;
        while let Some(marker) = self.applied.pop() {
            if marker.parent().is_none() {
                continue;
            }
            let parent = tree::unwrap(&marker)?;
            tree::normalize_children(&parent);
        }
        Ok(())
    }
}

/// Markers of one highlight; removed when this guard goes out of scope.
pub struct Highlight<'a, F: Finder> {
    highlighter: &'a mut Highlighter<F>,
}

impl<F: Finder> Highlight<'_, F> {
    pub fn found(&self) -> Option<&FindMatch> {
        self.highlighter.last_match()
    }

    pub fn markers(&self) -> &[NodeRef] {
        &self.highlighter.applied
    }

    /// Removes the markers now, reporting failures that `Drop` can only log.
    pub fn release(self) -> Result<()> {
        self.highlighter.release()
    }
}

impl<F: Finder> Drop for Highlight<'_, F> {
    fn drop(&mut self) {
        if let Err(err) = self.highlighter.release() {
            warn!(error = %err, "failed to remove highlight");
        }
    }
}
