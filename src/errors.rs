use crate::view::ViewError;
use axum::http::StatusCode;
use std::fmt;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<ViewError> for AppError {
    fn from(err: ViewError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[derive(Debug)]
pub enum FetchError {
    Client(reqwest::Error),
    Transport(reqwest::Error),
    Status(reqwest::StatusCode),
    Decode(reqwest::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Client(err) => write!(f, "failed to build http client: {err}"),
            FetchError::Transport(err) => write!(f, "leads request failed: {err}"),
            FetchError::Status(status) => write!(f, "leads endpoint returned {status}"),
            FetchError::Decode(err) => write!(f, "failed to decode leads: {err}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Client(err) | FetchError::Transport(err) | FetchError::Decode(err) => {
                Some(err)
            }
            FetchError::Status(_) => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBaseUrl(String),
    InvalidPort(String),
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBaseUrl(url) => {
                write!(f, "LEADS_API_BASE must start with http:// or https://, got '{url}'")
            }
            ConfigError::InvalidPort(port) => {
                write!(f, "PORT must be a number between 1 and 65535, got '{port}'")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
