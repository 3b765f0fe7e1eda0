pub mod browser;
pub mod config;
pub mod error;
pub mod finder;
pub mod fragment;
pub mod highlight;
pub mod session;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use browser::{DfsFragmentBrowser, FragmentBrowser};
pub use config::FindConfig;
pub use error::{FindError, Result};
pub use finder::{FindMatch, Finder};
pub use fragment::Fragment;
pub use highlight::{Highlight, Highlighter};
pub use session::{FindOutcome, FindSession};
