use std::fmt;

use kuchiki::NodeRef;

use crate::error::{FindError, Result};

/// A text node of the tree.
///
/// Two fragments are equal when they refer to the same node, not when their
/// text happens to be equal. Offsets into a fragment count `char`s.
#[derive(Clone)]
pub struct Fragment {
    node: NodeRef,
}

impl Fragment {
    pub fn new(node: NodeRef) -> Result<Self> {
        if node.as_text().is_none() {
            return Err(FindError::NotText);
        }
        Ok(Self { node })
    }

    /// Caller guarantees `node` is a text node.
    pub(crate) fn from_text_node(node: NodeRef) -> Self {
        debug_assert!(node.as_text().is_some());
        Self { node }
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.node.parent()
    }

    pub fn text(&self) -> String {
        self.node
            .as_text()
            .map(|text| text.borrow().clone())
            .unwrap_or_default()
    }

    pub fn chars(&self) -> Vec<char> {
        self.node
            .as_text()
            .map(|text| text.borrow().chars().collect())
            .unwrap_or_default()
    }

    pub fn char_len(&self) -> usize {
        self.node
            .as_text()
            .map(|text| text.borrow().chars().count())
            .unwrap_or(0)
    }

    /// Length of the text in bytes; cheap, unlike [`Self::char_len`].
    pub fn byte_len(&self) -> usize {
        self.node
            .as_text()
            .map(|text| text.borrow().len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.node
            .as_text()
            .map(|text| text.borrow().is_empty())
            .unwrap_or(true)
    }

    pub(crate) fn detached(&self) -> FindError {
        FindError::Detached {
            content: self.text(),
        }
    }
}

impl PartialEq for Fragment {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for Fragment {}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fragment").field(&self.text()).finish()
    }
}
