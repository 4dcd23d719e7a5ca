use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal problems found while bringing a case base into its ready state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Corpus is empty")]
    EmptyCorpus,

    #[error("Corpus is missing declared column: {0}")]
    MissingColumn(String),

    #[error("Schema declares no feature attributes")]
    EmptySchema,

    #[error("Schema contains an empty attribute name")]
    EmptyAttributeName,

    #[error("Attribute declared more than once: {0}")]
    DuplicateAttribute(String),

    #[error("Target attribute '{0}' is also declared as a feature")]
    TargetIsFeature(String),

    #[error("Filter attribute '{0}' is not a declared categorical attribute")]
    UnknownFilterAttribute(String),

    #[error("Case {case} carries {found} values for {expected} declared attributes")]
    UnexpectedWidth { case: usize, expected: usize, found: usize },

    #[error("Corpus is unreadable: {0}")]
    Unreadable(String),
}

/// Per-request problems with a query record. Never affects shared state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("Attribute '{attribute}' is not numeric: {value}")]
    NotNumeric { attribute: String, value: String },

    #[error("Attribute '{attribute}' is not a categorical value")]
    NotCategorical { attribute: String },

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::NotNumeric {
            attribute: "Mileage".to_string(),
            value: "\"lots\"".to_string(),
        };
        assert_eq!(err.to_string(), "Attribute 'Mileage' is not numeric: \"lots\"");

        let err: Error = ConfigError::MissingColumn("Price".to_string()).into();
        assert_eq!(err.to_string(), "Corpus is missing declared column: Price");
    }
}
