use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// A revision payload that cannot be turned into a [`crate::Revision`]
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Revision payload is not an object")]
    NotAnObject,

    #[error("Revision payload is missing '{field}'")]
    MissingField { field: &'static str },

    #[error("Revision field '{field}' is invalid: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Revision payload at position {index} is unusable: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<ParseError>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParseError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn invalid(field: &'static str, expected: &'static str) -> Self {
        Self::InvalidField { field, expected }
    }

    pub fn at_index(index: usize, source: ParseError) -> Self {
        Self::AtIndex {
            index,
            source: Box::new(source),
        }
    }
}

/// Why a single change record was dropped.
///
/// Never escapes the parser; dropped changes are only logged.
#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum ChangeError {
    #[error("change is not an object")]
    NotAnObject,

    #[error("change has no type code")]
    MissingType,

    #[error("unknown type code '{0}'")]
    UnknownType(String),

    #[error("'{code}' change is missing '{field}'")]
    MissingField {
        code: &'static str,
        field: &'static str,
    },

    #[error("'{code}' change has invalid '{field}'")]
    InvalidField {
        code: &'static str,
        field: &'static str,
    },
}
