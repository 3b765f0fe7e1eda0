use kuchiki::NodeRef;
use tracing::debug;

use crate::config::FindConfig;
use crate::error::Result;
use crate::finder::{incremental_chain, FindMatch};
use crate::highlight::{self, Highlighter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOutcome {
    Found,
    /// No occurrence anywhere; "next" should be disabled.
    NotFound,
    /// The query is empty.
    Disabled,
}

impl FindOutcome {
    pub fn is_found(self) -> bool {
        matches!(self, FindOutcome::Found)
    }
}

/// Find-as-you-type over one document.
///
/// Typing more characters keeps the highlight on the current occurrence
/// when it still matches; any other edit searches from the top again.
pub struct FindSession {
    root: NodeRef,
    config: FindConfig,
    highlighter: Option<Highlighter>,
    query: String,
}

impl FindSession {
    pub fn new(root: NodeRef, config: FindConfig) -> Self {
        Self {
            root,
            config,
            highlighter: None,
            query: String::new(),
        }
    }

    /// Searches the `<body>` of `document`, or the whole document when it has
    /// none.
    pub fn for_document(document: &NodeRef, config: FindConfig) -> Self {
        let root = document
            .select_first("body")
            .map(|body| body.as_node().clone())
            .unwrap_or_else(|_| document.clone());
        Self::new(root, config)
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn current_match(&self) -> Option<&FindMatch> {
        self.highlighter.as_ref().and_then(Highlighter::last_match)
    }

    pub fn set_query(&mut self, text: &str) -> Result<FindOutcome> {
        if text.is_empty() {
            self.clear()?;
            self.query.clear();
            return Ok(FindOutcome::Disabled);
        }
        let extends = !self.query.is_empty() && text.starts_with(self.query.as_str());
        if !extends {
            self.clear()?;
            self.highlighter = None;
        }
        self.query = text.to_string();
        self.find_next()
    }

    pub fn find_next(&mut self) -> Result<FindOutcome> {
        if self.query.is_empty() {
            return Ok(FindOutcome::Disabled);
        }
        if let Some(highlighter) = &mut self.highlighter {
            highlighter.clear(&self.root)?;
        } else {
            debug!(query = %self.query, "starting a new search");
            highlight::prepare(&self.root)?;
        }
        let (root, config) = (&self.root, &self.config);
        let highlighter = self
            .highlighter
            .get_or_insert_with(|| Highlighter::new(incremental_chain(root, config)));
        if highlighter.highlight_next(&self.query)? {
            Ok(FindOutcome::Found)
        } else {
            Ok(FindOutcome::NotFound)
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        if let Some(highlighter) = &mut self.highlighter {
            highlighter.clear(&self.root)?;
        }
        Ok(())
    }
}
