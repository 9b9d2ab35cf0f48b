// SPDX-License-Identifier: GPL-3.0-or-later

//! Echo Nest API client.
//!
//! This crate provides a thin client for the Echo Nest v4 web API: GET and
//! multipart POST calls with the API key and JSON format filled in, helpers
//! for decoding and navigating responses, and a rate-limit tracker that reads
//! the `X-RateLimit-*` headers of every response and can hold back calls
//! whose quota is exhausted until the window resets.

pub mod args;
pub mod client;
pub mod constants;
pub mod error;
pub mod json;
pub mod models;
pub mod rate_limit;
pub mod upload;

pub use args::Args;
pub use client::{EchoNestClient, EchoNestClientBuilder, API_KEY_ENV};
pub use error::{EchoNestError, ErrorCode, Result};
pub use json::{custom_unmarshal, dig, generic_unmarshal, Step};
pub use models::{
    Analysis, Artist, AudioSummary, ResponseEnvelope, Song, Status, TrackProfile,
};
pub use rate_limit::{MinuteAligned, RateLimitInfo, RateLimitTracker, ResetWindow};
pub use upload::UploadFile;
