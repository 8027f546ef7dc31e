use crate::locale::Locale;
use thiserror::Error;

/// Client-side input problems caught before any request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no search query")]
    MissingSearchText,
    #[error("no technology specified")]
    MissingTechnology,
    #[error("count may not exceed 100")]
    CountOutOfRange,
}

/// A request that could not complete or produced an unusable body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything that can end a single dispatch action.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<FetchError> for DispatchError {
    fn from(e: FetchError) -> Self {
        DispatchError::Transport(e.to_string())
    }
}

impl DispatchError {
    /// The bare message or detail, without the display prefix.
    pub fn message(&self, locale: Locale) -> String {
        match self {
            DispatchError::Validation(v) => locale.validation_message(*v).to_string(),
            DispatchError::Backend(message) => message.clone(),
            DispatchError::Transport(detail) => detail.clone(),
        }
    }

    /// Text painted into the results area for this error.
    pub fn display_message(&self, locale: Locale) -> String {
        match self {
            DispatchError::Validation(_) => self.message(locale),
            DispatchError::Backend(message) => format!("Error: {message}"),
            DispatchError::Transport(detail) => format!("Error fetching vacancies: {detail}"),
        }
    }

    /// Backend errors wipe the stats area too; the others leave it alone.
    pub fn clears_stats(&self) -> bool {
        matches!(self, DispatchError::Backend(_))
    }
}
