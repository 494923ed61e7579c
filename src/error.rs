use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    /// The request never produced a response body.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The body was not JSON at all.
    #[error("response from {endpoint} is not valid JSON: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The body was JSON but did not match the expected payload.
    #[error("response from {endpoint} has an unexpected shape: {detail}")]
    Shape {
        endpoint: &'static str,
        detail: String,
    },

    /// The server answered with `success = false`.
    #[error("{endpoint} reported a failure: {}", message.as_deref().unwrap_or("no message"))]
    Reported {
        endpoint: &'static str,
        message: Option<String>,
    },
}

/// How a failure is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server parsed the request and declined it.
    Reported,
    /// Anything that kept a usable response from arriving.
    Connection,
}

impl ReportError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Reported { .. } => FailureKind::Reported,
            _ => FailureKind::Connection,
        }
    }

    /// Server-supplied message, when the failure was reported with one.
    #[must_use]
    pub fn reported_message(&self) -> Option<&str> {
        match self {
            Self::Reported { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the server answered with a JSON body, successful or not.
    #[must_use]
    pub fn has_json_body(&self) -> bool {
        matches!(self, Self::Shape { .. } | Self::Reported { .. })
    }

    #[must_use]
    pub fn shape(endpoint: &'static str, detail: impl Into<String>) -> Self {
        Self::Shape {
            endpoint,
            detail: detail.into(),
        }
    }
}
