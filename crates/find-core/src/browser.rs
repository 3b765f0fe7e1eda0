use std::collections::BTreeSet;

use kuchiki::NodeRef;

use crate::error::Result;
use crate::fragment::Fragment;

pub const DEFAULT_EXCLUDED_TAGS: [&str; 3] = ["script", "form", "style"];

/// Forward-only walk over the text nodes of a tree.
///
/// Fragments come back in pre-order, one per call, so a caller never pays
/// for more of the tree than it actually reads. The browser does not remember
/// the current fragment itself: callers hand it back to `next`.
pub trait FragmentBrowser {
    /// Starts a new traversal and returns the first fragment below the root.
    fn first(&mut self) -> Option<Fragment>;

    /// Returns the fragment following `fragment`, `None` once the tree is
    /// exhausted. Fails when `fragment` has been removed from the tree.
    fn next(&mut self, fragment: &Fragment) -> Result<Option<Fragment>>;

    /// Positions the traversal right after `fragment`, so the next call to
    /// `next(fragment)` continues from there.
    fn resume_from(&mut self, fragment: &Fragment) -> Result<()>;
}

/// Iterative depth-first browser keeping, per depth, the next sibling still
/// to be visited.
pub struct DfsFragmentBrowser {
    root: NodeRef,
    excluded: BTreeSet<String>,
    pending: Vec<Option<NodeRef>>,
}

impl DfsFragmentBrowser {
    pub fn new(root: NodeRef) -> Self {
        Self::with_excluded(root, std::iter::empty::<&str>())
    }

    /// Subtrees rooted at an element whose tag is in `tags` are skipped.
    pub fn with_excluded<I, S>(root: NodeRef, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            root,
            excluded: tags
                .into_iter()
                .map(|tag| tag.as_ref().to_lowercase())
                .collect(),
            pending: Vec::new(),
        }
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    fn is_excluded(&self, node: &NodeRef) -> bool {
        node.as_element()
            .is_some_and(|el| self.excluded.contains(&(*el.name.local).to_lowercase()))
    }

    fn advance(&mut self) -> Option<Fragment> {
        while let Some(top) = self.pending.last_mut() {
            let Some(node) = top.take() else {
                self.pending.pop();
                continue;
            };
            *top = node.next_sibling();
            if node.as_text().is_some() {
                return Some(Fragment::from_text_node(node));
            }
            if !self.is_excluded(&node) {
                self.pending.push(node.first_child());
            }
        }
        None
    }
}

impl FragmentBrowser for DfsFragmentBrowser {
    fn first(&mut self) -> Option<Fragment> {
        self.pending.clear();
        self.pending.push(self.root.first_child());
        self.advance()
    }

    fn next(&mut self, fragment: &Fragment) -> Result<Option<Fragment>> {
        if fragment.parent().is_none() {
            return Err(fragment.detached());
        }
        Ok(self.advance())
    }

    fn resume_from(&mut self, fragment: &Fragment) -> Result<()> {
        let mut pending = Vec::new();
        let mut node = fragment.node().clone();
        loop {
            let parent = node.parent().ok_or_else(|| fragment.detached())?;
            pending.push(node.next_sibling());
            if parent == self.root {
                break;
            }
            node = parent;
        }
        pending.reverse();
        self.pending = pending;
        Ok(())
    }
}
