// SPDX-License-Identifier: GPL-3.0-or-later

use crate::models::Status;
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EchoNestError>;

/// Application-level error codes reported in the `status` block of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Unknown,
    Success,
    InvalidKey,
    KeyNotAllowed,
    RateLimit,
    MissingArgs,
    BadArgs,
}

impl ErrorCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ErrorCode::Success,
            1 => ErrorCode::InvalidKey,
            2 => ErrorCode::KeyNotAllowed,
            3 => ErrorCode::RateLimit,
            4 => ErrorCode::MissingArgs,
            5 => ErrorCode::BadArgs,
            _ => ErrorCode::Unknown,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ErrorCode::Unknown => -1,
            ErrorCode::Success => 0,
            ErrorCode::InvalidKey => 1,
            ErrorCode::KeyNotAllowed => 2,
            ErrorCode::RateLimit => 3,
            ErrorCode::MissingArgs => 4,
            ErrorCode::BadArgs => 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum EchoNestError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-200 HTTP response. `status` holds the API status block when the body carried one.
    #[error("{}", describe_status(*http_status, status.as_ref()))]
    Status {
        http_status: u16,
        status: Option<Status>,
    },

    /// HTTP 200 with a non-zero application status code.
    #[error("{}", .0.message)]
    Api(Status),

    #[error("Invalid response from Echo Nest API: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to read upload: {0}")]
    Upload(#[from] std::io::Error),
}

impl EchoNestError {
    /// API error code carried by this error, if any.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            EchoNestError::Api(status) => Some(status.error_code()),
            EchoNestError::Status {
                status: Some(status),
                ..
            } => Some(status.error_code()),
            _ => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            EchoNestError::Status { http_status, .. } => Some(*http_status),
            EchoNestError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn describe_status(http_status: u16, status: Option<&Status>) -> String {
    if let Some(status) = status {
        return status.message.clone();
    }
    match StatusCode::from_u16(http_status) {
        Ok(code) => format!(
            "{} {}",
            http_status,
            code.canonical_reason().unwrap_or("Unknown status")
        ),
        Err(_) => format!("{} Unknown status", http_status),
    }
}
