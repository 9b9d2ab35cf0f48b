// SPDX-License-Identifier: GPL-3.0-or-later

//! Parameter vocabulary of the Echo Nest API.
//!
//! Not every value is valid for every call; see the API documentation for
//! which calls accept which buckets and sort keys.

/// License options for `artist/biographies`, `artist/images`, etc.
pub mod license {
    pub const ECHO_SOURCE: &str = "echo-source";
    pub const ALL_RIGHTS_RESERVED: &str = "all-rights-reserved";
    pub const CC_BY_SA: &str = "cc-by-sa";
    pub const CC_BY_NC: &str = "cc-by-nc";
    pub const CC_BY_NC_ND: &str = "cc-by-nc-nd";
    pub const CC_BY_NC_DA: &str = "cc-by-nc-da";
    pub const CC_BY_ND: &str = "cc-by-nd";
    pub const CC_BY: &str = "cc-by";
    pub const PUBLIC_DOMAIN: &str = "public-domain";
    pub const UNKNOWN: &str = "unknown";
}

pub mod hotttnesss {
    pub const OVERALL: &str = "overall";
    pub const SOCIAL: &str = "social";
    pub const MAINSTREAM: &str = "mainstream";
    pub const REVIEWS: &str = "reviews";
}

pub mod terms {
    pub const STYLE: &str = "style";
    pub const MOOD: &str = "mood";
}

/// Values for the `bucket` parameter (response detail selectors, unrelated
/// to rate-limit buckets).
pub mod bucket {
    pub const BIOGRAPHIES: &str = "biographies";
    pub const BLOGS: &str = "blogs";
    pub const DOC_COUNTS: &str = "doc_counts";
    pub const FAMILIARITY: &str = "familiarity";
    pub const ARTIST_FAMILIARITY: &str = "artist_familiarity";
    pub const HOTTTNESSS: &str = "hotttnesss";
    pub const SONG_HOTTTNESSS: &str = "song_hotttnesss";
    pub const ARTIST_HOTTTNESSS: &str = "artist_hotttnesss";
    pub const SONG_TYPE: &str = "song_type";
    pub const TRACKS: &str = "tracks";
    pub const IMAGES: &str = "images";
    pub const ARTIST_LOCATION: &str = "artist_location";
    pub const NEWS: &str = "news";
    pub const REVIEWS: &str = "reviews";
    pub const SONGS: &str = "songs";
    pub const TERMS: &str = "terms";
    pub const URLS: &str = "urls";
    pub const VIDEO: &str = "video";
    pub const YEARS_ACTIVE: &str = "years_active";
    pub const AUDIO_SUMMARY: &str = "audio_summary";
    pub const GENRE: &str = "genre";
}

/// Location specifiers for calls like `artist/search`.
pub mod location {
    pub const CITY: &str = "city";
    pub const COUNTRY: &str = "country";
    pub const REGION: &str = "region";
}

pub mod ranking {
    pub const FAMILIARITY: &str = "familiarity";
    pub const RELEVANCE: &str = "relevance";
}

pub mod sort {
    pub const FAMILIARITY: &str = "familiarity";
    pub const HOTTTNESSS: &str = "hotttnesss";
    pub const ARTIST_START_YEAR: &str = "artist_start_year";
    pub const ARTIST_END_YEAR: &str = "artist_end_year";
    pub const TEMPO: &str = "tempo";
    pub const DURATION: &str = "duration";
    pub const LOUDNESS: &str = "loudness";
    pub const SPEECHINESS: &str = "speechiness";
    pub const ACOUSTICNESS: &str = "acousticness";
    pub const LIVENESS: &str = "liveness";
    pub const ARTIST_FAMILIARITY: &str = "artist_familiarity";
    pub const ARTIST_HOTTTNESSS: &str = "artist_hotttnesss";
    pub const SONG_HOTTTNESSS: &str = "song_hotttnesss";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const MODE: &str = "mode";
    pub const KEY: &str = "key";
    pub const ENERGY: &str = "energy";
    pub const DANCEABILITY: &str = "danceability";
    pub const WEIGHT: &str = "weight";
    pub const FREQUENCY: &str = "frequency";
}

/// Values of the `mode` audio attribute.
pub mod mode {
    pub const MINOR: i32 = 0;
    pub const MAJOR: i32 = 1;
}

/// Values of the `key` audio attribute (pitch class, C = 0).
pub mod key {
    pub const C: i32 = 0;
    pub const C_SHARP: i32 = 1;
    pub const D: i32 = 2;
    pub const E_FLAT: i32 = 3;
    pub const E: i32 = 4;
    pub const F: i32 = 5;
    pub const F_SHARP: i32 = 6;
    pub const G: i32 = 7;
    pub const A_FLAT: i32 = 8;
    pub const A: i32 = 9;
    pub const B_FLAT: i32 = 10;
    pub const B: i32 = 11;
}

pub mod song_type {
    pub const CHRISTMAS: &str = "christmas";
    pub const LIVE: &str = "live";
    pub const STUDIO: &str = "studio";
    pub const ACOUSTIC: &str = "acoustic";
    pub const ELECTRIC: &str = "electric";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Format a sort argument, e.g. `tempo-asc`.
pub fn sort_order(attribute: &str, direction: SortDirection) -> String {
    match direction {
        SortDirection::Asc => format!("{attribute}-asc"),
        SortDirection::Desc => format!("{attribute}-desc"),
    }
}

/// Song-type filter for `song/search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongTypeState {
    True,
    False,
    Any,
}

pub fn song_type_state(song_type: &str, state: SongTypeState) -> String {
    match state {
        SongTypeState::True => song_type.to_string(),
        SongTypeState::False => format!("{song_type}:false"),
        SongTypeState::Any => format!("{song_type}:any"),
    }
}

/// Boosted search term, e.g. `rock^2.000000`.
pub fn search_term_boost(term: &str, boost: f64) -> String {
    format!("{term}^{boost:.6}")
}

/// Search term the results must not match.
pub fn search_term_ban(term: &str) -> String {
    format!("-{term}")
}

/// Search term the results must match.
pub fn search_term_require(term: &str) -> String {
    format!("^{term}")
}

/// Entity types and regions available in a Rosetta ID space.
///
/// When `regions` is non-empty a region must be appended to the catalog
/// identifier, e.g. `rdio-NL:track:t10231`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosettaInfo {
    pub id_space: &'static str,
    pub entity_types: &'static [&'static str],
    pub regions: &'static [&'static str],
}

impl RosettaInfo {
    pub fn supports(&self, entity_type: &str) -> bool {
        self.entity_types.contains(&entity_type)
    }

    /// Catalog prefix for `region`, e.g. `spotify-WW`; `None` if the region
    /// is not offered. Spaces without regions only accept `None`.
    pub fn catalog(&self, region: Option<&str>) -> Option<String> {
        match region {
            None if self.regions.is_empty() => Some(self.id_space.to_string()),
            Some(region) if self.regions.contains(&region) => {
                Some(format!("{}-{}", self.id_space, region))
            }
            _ => None,
        }
    }
}

const NO_REGIONS: &[&str] = &[];

pub const ROSETTA: &[RosettaInfo] = &[
    RosettaInfo { id_space: "deezer", entity_types: &["artist", "track", "release"], regions: NO_REGIONS },
    RosettaInfo { id_space: "discogs", entity_types: &["artist"], regions: NO_REGIONS },
    RosettaInfo { id_space: "fma", entity_types: &["artist", "track", "release"], regions: NO_REGIONS },
    RosettaInfo { id_space: "jambase", entity_types: &["artist"], regions: NO_REGIONS },
    RosettaInfo { id_space: "lyricfind", entity_types: &["song"], regions: NO_REGIONS },
    RosettaInfo { id_space: "musicbrainz", entity_types: &["artist"], regions: NO_REGIONS },
    RosettaInfo { id_space: "musixmatch", entity_types: &["song"], regions: &["WW"] },
    RosettaInfo { id_space: "rhapsody", entity_types: &["artist", "track"], regions: &["US"] },
    RosettaInfo {
        id_space: "rdio",
        entity_types: &["artist", "song", "track"],
        regions: &[
            "AT", "AU", "BR", "CA", "CH", "DE", "DK", "ES", "FI", "FR", "IE", "IT", "NL", "NO",
            "NZ", "PT", "SE", "UK", "US",
        ],
    },
    RosettaInfo { id_space: "seatgeek", entity_types: &["artist"], regions: NO_REGIONS },
    RosettaInfo { id_space: "seatwave", entity_types: &["artist"], regions: NO_REGIONS },
    RosettaInfo { id_space: "songkick", entity_types: &["artist"], regions: NO_REGIONS },
    RosettaInfo { id_space: "songmeanings", entity_types: &["artist", "song"], regions: NO_REGIONS },
    RosettaInfo { id_space: "spotify", entity_types: &["artist", "song", "track"], regions: &["US", "WW"] },
    RosettaInfo { id_space: "whosampled", entity_types: &["artist"], regions: NO_REGIONS },
    RosettaInfo { id_space: "7digital", entity_types: &["artist", "track"], regions: &["US", "UK"] },
];

pub fn rosetta(id_space: &str) -> Option<&'static RosettaInfo> {
    ROSETTA.iter().find(|info| info.id_space == id_space)
}
