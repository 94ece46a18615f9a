use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Login rejected. Please check your credentials.")]
    InvalidCredentials,

    #[error("This operation requires an authenticated session")]
    NotAuthenticated,

    #[error("Malformed schedule code: {0}")]
    MalformedSchedule(String),

    #[error("Class table has no column named {0:?}")]
    MissingColumn(String),

    #[error("Malformed student profile: {0}")]
    MalformedProfile(String),

    #[error("Cannot build a subject from an empty class list")]
    EmptyClassList,

    #[error("Class rows disagree on {field}: expected {expected:?}, found {found:?}")]
    InconsistentSubject {
        field: &'static str,
        expected: String,
        found: String,
    },

    #[error("Invalid semester code: {0:?}")]
    InvalidSemester(String),

    #[error("Failed to parse HTML: {0}")]
    ParsingError(String),

    #[error("Could not find required element on the page: {0}")]
    ElementNotFound(String),
}

impl ScraperError {
    /// Returns true for transport failures, which the caller may choose to retry.
    pub fn is_network(&self) -> bool {
        matches!(self, ScraperError::Network(_))
    }

    /// Returns true if a new login is needed before retrying.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            ScraperError::NotAuthenticated | ScraperError::InvalidCredentials
        )
    }
}

impl From<reqwest::Error> for ScraperError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScraperError::Network(format!("request timed out: {}", err))
        } else {
            ScraperError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
