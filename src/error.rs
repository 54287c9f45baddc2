//! Error types shared across the engine.

use thiserror::Error;

/// A malformed method signature pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("Method pattern is empty")]
    Empty,

    #[error("Method pattern `{0}` needs a type, a name and a parenthesized parameter list")]
    Malformed(String),

    #[error("Invalid type pattern `{0}`")]
    InvalidType(String),

    #[error("Invalid method name pattern `{0}`")]
    InvalidName(String),

    #[error("Invalid parameter pattern `{0}`")]
    InvalidParameter(String),

    /// `..` (or `Type..`) followed by more parameters.
    #[error("Trailing wildcard `{0}` must be the last parameter")]
    MisplacedWildcard(String),
}

/// One problem with a recipe's configured options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{recipe}: option `{option}` {message}")]
pub struct ValidationError {
    pub recipe: String,
    pub option: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(recipe: impl Into<String>, option: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError { recipe: recipe.into(), option: option.into(), message: message.into() }
    }

    pub fn required(recipe: impl Into<String>, option: impl Into<String>) -> Self {
        ValidationError::new(recipe, option, "is required")
    }

    pub fn pattern(recipe: impl Into<String>, option: impl Into<String>, error: &PatternError) -> Self {
        ValidationError::new(recipe, option, format!("is invalid: {}", error))
    }
}

/// Failure of a whole recipe run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Nothing was visited; every option problem is listed.
    #[error("Recipe validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("Recipe run was cancelled")]
    Cancelled,

    #[error("Recipe `{0}` is part of a dependency cycle")]
    Cycle(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid recipe options: {0}")]
    Options(#[from] serde_json::Error),
}
