use crate::parser::Rule;
use thiserror::Error;

/// Pattern parsing errors. No partial result is ever returned.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The text does not follow the pattern grammar.
    #[error("Invalid pattern: {0}")]
    Syntax(#[from] pest::error::Error<Rule>),

    /// The text parses but describes something that cannot be selected.
    #[error("Invalid pattern '{pattern}': {reason}")]
    Semantic { pattern: String, reason: String },
}

impl ParseError {
    pub(crate) fn semantic(pattern: &str, reason: impl Into<String>) -> Self {
        Self::Semantic {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
