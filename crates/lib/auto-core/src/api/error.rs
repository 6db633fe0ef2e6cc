use std::{error::Error, fmt};

/// Classification of an upstream HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    RateLimited,
    Server,
    Unavailable,
    OtherStatus,
}

impl ApiErrorKind {
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            422 => Self::Validation,
            429 => Self::RateLimited,
            500 => Self::Server,
            503 => Self::Unavailable,
            _ => Self::OtherStatus,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::RateLimited => "rate_limited",
            Self::Server => "server",
            Self::Unavailable => "unavailable",
            Self::OtherStatus => "other_status",
        }
    }
}

/// Failure talking to the Admin Auto REST backend.
///
/// `Display` renders the operator-facing message; callers surface it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Status { status: u16, message: String },
    Timeout,
    Unreachable { base_url: String },
    Network { base_url: String },
    Decode(String),
    Unexpected(String),
}

impl ApiError {
    /// A 422-equivalent failure raised before any request leaves the process.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Status {
            status: 422,
            message: message.into(),
        }
    }

    /// Status classification, `None` for transport-level failures.
    #[must_use]
    pub const fn kind(&self) -> Option<ApiErrorKind> {
        match self {
            Self::Status { status, .. } => Some(ApiErrorKind::from_status(*status)),
            _ => None,
        }
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Status { status, .. } => ApiErrorKind::from_status(*status).as_str(),
            Self::Timeout => "timeout",
            Self::Unreachable { .. } => "unreachable",
            Self::Network { .. } => "network",
            Self::Decode(_) => "decode",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, message } => match ApiErrorKind::from_status(*status) {
                ApiErrorKind::BadRequest => {
                    write!(f, "Bad Request: {message}. Please check your input parameters.")
                }
                ApiErrorKind::Unauthorized => write!(
                    f,
                    "Authentication failed: {message}. Please check your username and password."
                ),
                ApiErrorKind::Forbidden => write!(
                    f,
                    "Permission denied: {message}. You don't have access to this resource."
                ),
                ApiErrorKind::NotFound => {
                    write!(f, "Resource not found: {message}. Please check the ID is correct.")
                }
                ApiErrorKind::Conflict => {
                    write!(f, "Conflict: {message}. The resource may already exist.")
                }
                ApiErrorKind::Validation => {
                    write!(f, "Validation error: {message}. Please check your input data.")
                }
                ApiErrorKind::RateLimited => write!(
                    f,
                    "Rate limit exceeded: {message}. Please wait before making more requests."
                ),
                ApiErrorKind::Server => write!(
                    f,
                    "Server error: {message}. Please try again later or contact support."
                ),
                ApiErrorKind::Unavailable => write!(
                    f,
                    "Service unavailable: {message}. The server may be temporarily down."
                ),
                ApiErrorKind::OtherStatus => {
                    write!(f, "API request failed ({status}): {message}")
                }
            },
            Self::Timeout => f.write_str(
                "Request timed out. Please try again or check your connection.",
            ),
            Self::Unreachable { base_url } => write!(
                f,
                "Cannot connect to Admin Auto instance at {base_url}. Please check the URL and your network connection."
            ),
            Self::Network { base_url } => write!(
                f,
                "Network error: Cannot reach {base_url}. Please check your connection."
            ),
            Self::Decode(message) => write!(f, "Unexpected error: invalid response body: {message}"),
            Self::Unexpected(message) => write!(f, "Unexpected error: {message}"),
        }
    }
}

impl Error for ApiError {}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(400, "Bad Request: bad. Please check your input parameters.")]
    #[case(401, "Authentication failed: bad. Please check your username and password.")]
    #[case(403, "Permission denied: bad. You don't have access to this resource.")]
    #[case(404, "Resource not found: bad. Please check the ID is correct.")]
    #[case(409, "Conflict: bad. The resource may already exist.")]
    #[case(422, "Validation error: bad. Please check your input data.")]
    #[case(429, "Rate limit exceeded: bad. Please wait before making more requests.")]
    #[case(500, "Server error: bad. Please try again later or contact support.")]
    #[case(503, "Service unavailable: bad. The server may be temporarily down.")]
    #[case(418, "API request failed (418): bad")]
    fn status_errors_use_fixed_templates(#[case] status: u16, #[case] expected: &str) {
        let err = ApiError::Status {
            status,
            message: "bad".to_string(),
        };
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn transport_errors_name_the_instance() {
        let unreachable = ApiError::Unreachable {
            base_url: "http://auto.local".to_string(),
        };
        assert_eq!(
            unreachable.to_string(),
            "Cannot connect to Admin Auto instance at http://auto.local. Please check the URL and your network connection."
        );
        assert_eq!(unreachable.kind(), None);
        assert_eq!(
            ApiError::Timeout.to_string(),
            "Request timed out. Please try again or check your connection."
        );
    }

    #[test]
    fn validation_helper_maps_to_422() {
        let err = ApiError::validation("name is required");
        assert_eq!(err.kind(), Some(ApiErrorKind::Validation));
        assert_eq!(err.label(), "validation");
    }
}
