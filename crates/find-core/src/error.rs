use thiserror::Error;

#[derive(Debug, Error)]
pub enum FindError {
    #[error("Fragment {content:?} is no longer attached to the tree")]
    Detached { content: String },
    #[error("Node is not a text node")]
    NotText,
    #[error("Cannot split fragment {content:?} of length {len} at offset {offset}")]
    SplitOutOfBounds {
        offset: usize,
        len: usize,
        content: String,
    },
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FindError>;
