use stackgen_template::ConstructionError;

/// Display global error message in unified format
#[derive(Debug)]
pub struct Error(String, Option<String>);

impl Error {
    pub fn new(message: &str, details: Option<&str>) -> Self {
        Error(message.to_string(), details.map(|d| d.to_string()))
    }
}

/// Display the message and details, as sort of a hint
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}\n\n{}",
            self.0,
            console::style(self.1.clone().unwrap_or("".into())).dim()
        )
    }
}

impl std::error::Error for Error {}

/// Automatically convert all eyre error reports
impl From<eyre::ErrReport> for Error {
    fn from(error: eyre::ErrReport) -> Self {
        error
            .downcast::<Error>()
            .unwrap_or_else(|err| Error::new(&format!("{err:#}"), None))
    }
}

/// Failures of a single generation run, none of them is retried
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("public address lookup via {url} failed: {reason}")]
    NetworkUnavailable { url: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Template(#[from] stackgen_template::Error),
}

impl From<ConstructionError> for GenerateError {
    fn from(error: ConstructionError) -> Self {
        GenerateError::Template(error.into())
    }
}
