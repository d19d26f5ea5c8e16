use thiserror::Error;

/// The only message a user ever sees when a fetch goes wrong.
pub const FETCH_FAILURE_MESSAGE: &str = "Failed to fetch weather data";

/// Why a provider could not produce a record.
///
/// The variants keep the cause for logs; the view always shows
/// [`FETCH_FAILURE_MESSAGE`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("provider has no records to choose from")]
    NoRecords,

    #[error("simulated fetch failure")]
    Simulated,

    #[error("weather provider panicked")]
    Panicked,

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode weather payload")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        FETCH_FAILURE_MESSAGE
    }
}
