//! Error types and handling for the CEP temperature pipeline

use http::StatusCode;
use thiserror::Error;

/// Main error type for the temperature pipeline
///
/// Every variant carries the `origin` of the call site that produced it, and
/// each layer wraps what it receives with [`TemperatureError::context`], so the
/// rendered message reads as a breadcrumb trail from the outermost layer down
/// to the failing dependency.
#[derive(Error, Debug)]
pub enum TemperatureError {
    /// Postal code failed syntax validation
    #[error("invalid zipcode")]
    InvalidInput,

    /// The location provider has no record for the postal code
    #[error("{origin}: cep not found")]
    LocationNotFound { origin: &'static str },

    /// The postal code (or its city) has no known mapping
    #[error("{origin}: not found{}", original_suffix(.source))]
    NotFound {
        origin: &'static str,
        #[source]
        source: Option<Box<TemperatureError>>,
    },

    /// A dependency answered with a non-success status
    #[error("{origin}: upstream status not ok; code: {status}")]
    UpstreamStatus { origin: &'static str, status: u16 },

    /// A dependency could not be reached
    #[error("{origin}: {source}")]
    Transport {
        origin: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// A dependency's response body did not have the expected shape
    #[error("{origin}: {source}")]
    Decode {
        origin: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Service B answered with a status service A does not recognize
    #[error("{origin}: unexpected response; status code {status}")]
    UnexpectedResponse { origin: &'static str, status: u16 },

    /// Call-site breadcrumb around an inner error
    #[error("{origin}: {source}")]
    Context {
        origin: &'static str,
        #[source]
        source: Box<TemperatureError>,
    },
}

/// Classification of a [`TemperatureError`], independent of its wrappers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    LocationNotFound,
    NotFound,
    UpstreamStatus,
    Transport,
    Decode,
    UnexpectedResponse,
}

fn original_suffix(source: &Option<Box<TemperatureError>>) -> String {
    source
        .as_ref()
        .map(|original| format!("; original: {original}"))
        .unwrap_or_default()
}

impl TemperatureError {
    /// Create a location-not-found error
    pub fn location_not_found(origin: &'static str) -> Self {
        Self::LocationNotFound { origin }
    }

    /// Create a not-found error without an underlying cause
    pub fn not_found(origin: &'static str) -> Self {
        Self::NotFound {
            origin,
            source: None,
        }
    }

    /// Re-classify `original` as a generic not-found, keeping it as the cause
    pub fn not_found_from(origin: &'static str, original: TemperatureError) -> Self {
        Self::NotFound {
            origin,
            source: Some(Box::new(original)),
        }
    }

    /// Create an upstream status error
    pub fn upstream_status(origin: &'static str, status: u16) -> Self {
        Self::UpstreamStatus { origin, status }
    }

    /// Create a transport error
    pub fn transport(origin: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { origin, source }
    }

    /// Create a decode error
    pub fn decode(origin: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { origin, source }
    }

    /// Create an unexpected-response error
    pub fn unexpected_response(origin: &'static str, status: u16) -> Self {
        Self::UnexpectedResponse { origin, status }
    }

    /// Wrap this error with the name of the calling site
    #[must_use]
    pub fn context(self, origin: &'static str) -> Self {
        Self::Context {
            origin,
            source: Box::new(self),
        }
    }

    /// The innermost error, with all breadcrumb wrappers removed
    #[must_use]
    pub fn root(&self) -> &TemperatureError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Classify this error, looking through breadcrumb wrappers
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Context { source, .. } => source.kind(),
            Self::InvalidInput => ErrorKind::InvalidInput,
            Self::LocationNotFound { .. } => ErrorKind::LocationNotFound,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::UpstreamStatus { .. } => ErrorKind::UpstreamStatus,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::UnexpectedResponse { .. } => ErrorKind::UnexpectedResponse,
        }
    }

    /// Whether this error means the postal code has no known mapping
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound | ErrorKind::LocationNotFound)
    }

    /// HTTP status this error maps to at the handler boundary
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::NotFound | ErrorKind::LocationNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body text sent to the client
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::InvalidInput => "invalid zipcode".to_string(),
            ErrorKind::NotFound | ErrorKind::LocationNotFound => {
                "can not find zipcode".to_string()
            }
            _ => self.to_string(),
        }
    }
}
