use thiserror::Error;

/// Reasons an Item or Container could not be hydrated.
///
/// These never escape the engine: the offending Item is skipped and its
/// siblings are hydrated normally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HydrateError {
    #[error("item `{item_id}` has no toggle control")]
    MissingToggle { item_id: String },
    #[error("item `{item_id}` has no content panel")]
    MissingPanel { item_id: String },
}

/// Errors produced while validating an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config field `{0}` must not be empty")]
    EmptyName(&'static str),
}

/// A timing function outside the supported CSS keywords and `cubic-bezier`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported easing `{0}`")]
pub struct ParseEasingError(pub String);
