// SPDX-License-Identifier: GPL-3.0-or-later

//! Serde mirrors of the Echo Nest JSON schema.
//!
//! Every field defaults when absent: which fields appear depends on the
//! `bucket` parameters of the call.

use crate::error::{EchoNestError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The `status` block present in every API response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Status {
    pub version: String,
    pub code: i32,
    pub message: String,
}

impl Status {
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::from_code(self.code)
    }

    /// `Err` when the call failed at the application level (non-zero code).
    pub fn as_error(&self) -> Result<(), EchoNestError> {
        if self.code != 0 {
            return Err(EchoNestError::Api(self.clone()));
        }
        Ok(())
    }
}

/// Top-level `{"response": ...}` wrapper.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope<T> {
    pub response: T,
}

/// Minimal body used to pull the status out of any response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StatusOnly {
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Genre {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Term {
    pub name: String,
    pub frequency: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct License {
    #[serde(rename = "type")]
    pub license_type: String,
    pub attribution: String,
    pub url: String,
    pub version: String,
    #[serde(rename = "attribution-url")]
    pub attribution_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Biography {
    pub text: String,
    pub site: String,
    pub url: String,
    pub license: License,
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Blog {
    pub id: String,
    pub name: String,
    pub url: String,
    pub summary: String,
    pub date_posted: String,
    pub date_found: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Review {
    pub id: String,
    pub name: String,
    pub url: String,
    pub summary: String,
    pub image_url: String,
    pub release: String,
    pub date_reviewed: String,
    pub date_found: String,
}

/// Active period; an open `end` means the artist is still active.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct YearsActive {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub url: String,
    pub site: String,
    pub image_url: String,
    pub date_found: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Image {
    pub url: String,
    pub license: License,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct News {
    pub id: String,
    pub name: String,
    pub url: String,
    pub summary: String,
    pub date_found: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Location {
    pub city: String,
    pub region: String,
    pub location: String,
    pub country: String,
}

/// Identifier of an entity in a Rosetta ID space (e.g. `spotify:artist:...`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForeignId {
    pub catalog: String,
    pub foreign_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Track {
    pub id: String,
    pub catalog: String,
    pub foreign_id: String,
    pub foreign_release_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub genres: Vec<Genre>,
    pub terms: Vec<Term>,
    pub biographies: Vec<Biography>,
    pub blogs: Vec<Blog>,
    pub familiarity: f64,
    pub hotttnesss: f64,
    pub reviews: Vec<Review>,
    pub years_active: Vec<YearsActive>,
    pub video: Vec<Video>,
    pub urls: HashMap<String, String>,
    pub images: Vec<Image>,
    pub news: Vec<News>,
    pub doc_counts: HashMap<String, u32>,
    pub artist_location: Location,
    pub songs: Vec<Song>,
    pub foreign_ids: Vec<ForeignId>,
    pub twitter: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist_id: String,
    pub artist_name: String,
    pub artist_hotttnesss: f64,
    pub artist_familiarity: f64,
    pub song_hotttnesss: f64,
    pub song_type: Vec<String>,
    pub tracks: Vec<Track>,
    pub artist_location: Location,
    pub audio_summary: AudioSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSummary {
    pub key: i32,
    pub mode: i32,
    pub time_signature: i32,
    pub analysis_url: String,
    pub audio_md5: String,
    pub energy: f64,
    pub liveness: f64,
    pub tempo: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub duration: f64,
    pub loudness: f64,
    pub valence: f64,
    pub danceability: f64,
}

/// Track as returned by `track/upload` and `track/profile`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackProfile {
    pub id: String,
    pub md5: String,
    /// `pending`, `complete`, `error` or `unavailable`.
    pub status: String,
    pub artist: String,
    pub title: String,
    pub release: String,
    pub audio_md5: String,
    pub bitrate: u32,
    pub samplerate: u32,
    pub analyzer_version: String,
    pub audio_summary: AudioSummary,
}

impl TrackProfile {
    pub fn is_pending(&self) -> bool {
        self.status == "pending"
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeRange {
    pub start: f64,
    pub duration: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Section {
    #[serde(flatten)]
    pub range: TimeRange,
    pub loudness: f64,
    pub tempo: f64,
    pub tempo_confidence: f64,
    pub key: i32,
    pub key_confidence: f64,
    pub mode: i32,
    pub mode_confidence: f64,
    pub time_signature: i32,
    pub time_signature_confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Segment {
    #[serde(flatten)]
    pub range: TimeRange,
    pub loudness_start: f64,
    pub loudness_max: f64,
    pub loudness_max_time: f64,
    pub pitches: Vec<f64>,
    pub timbre: Vec<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisMeta {
    pub analyzer_version: String,
    pub platform: String,
    pub detailed_status: String,
    pub filename: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub genre: String,
    pub bitrate: u32,
    pub sample_rate: u32,
    pub seconds: u32,
    pub status_code: i32,
    pub timestamp: i64,
    pub analysis_time: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisTrack {
    pub num_samples: u64,
    pub duration: f64,
    pub sample_md5: String,
    pub decoder: String,
    pub decoder_version: String,
    pub offset_seconds: f64,
    pub window_seconds: f64,
    pub analysis_sample_rate: u32,
    pub analysis_channels: u32,
    pub end_of_fade_in: f64,
    pub start_of_fade_out: f64,
    pub codestring: String,
    pub code_version: String,
    pub echoprintstring: String,
    pub echoprint_version: String,
    pub synchstring: String,
    pub synch_version: String,
    pub rhythmstring: String,
    pub rhythm_version: String,
    pub loudness: f64,
    pub tempo: f64,
    pub tempo_confidence: f64,
    pub key: i32,
    pub key_confidence: f64,
    pub mode: i32,
    pub mode_confidence: f64,
    pub time_signature: i32,
    pub time_signature_confidence: f64,
}

/// Detailed analysis document linked from [`AudioSummary::analysis_url`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Analysis {
    pub meta: AnalysisMeta,
    pub track: AnalysisTrack,
    pub bars: Vec<TimeRange>,
    pub beats: Vec<TimeRange>,
    pub tatums: Vec<TimeRange>,
    pub sections: Vec<Section>,
    pub segments: Vec<Segment>,
}
