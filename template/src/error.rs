pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A template entity was wired up incorrectly
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("invalid logical id {0:?}, must be non-empty and alphanumeric")]
    InvalidLogicalId(String),

    #[error("logical id {0:?} is declared more than once")]
    DuplicateLogicalId(String),

    #[error("{referrer} references {target}, which has not been added to the template")]
    DanglingReference { referrer: String, target: String },

    #[error("{referrer} reads attribute {attribute} of {target}, which is not a resource")]
    AttributeOfNonResource {
        referrer: String,
        target: String,
        attribute: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("failed to serialize template as {format}: {message}")]
    Serialization {
        format: &'static str,
        message: String,
    },
}
