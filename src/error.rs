use thiserror::Error;

/// Reasons a mapping set is rejected at compile time.
///
/// Once a [`Replacer`](crate::Replacer) exists, nothing it does can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("mapping set must contain at least one mapping")]
    EmptyMappingSet,

    /// `index` is the position of the offending mapping in the input order.
    #[error("mapping #{index} has an empty search key")]
    EmptyKey { index: usize },

    #[error("search key {key:?} is mapped more than once")]
    DuplicateKey { key: String },
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;
