use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned status {status} from {url}")]
    UnexpectedStatus {
        provider: &'static str,
        status: u16,
        url: String,
    },

    #[error("{provider} returned {got} results for {expected} inputs")]
    ShapeMismatch {
        provider: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{provider} response error: {reason}")]
    Response {
        provider: &'static str,
        reason: String,
    },

    #[error("invalid provider configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Lexicon(#[from] terrace_core::ConfigError),
}
