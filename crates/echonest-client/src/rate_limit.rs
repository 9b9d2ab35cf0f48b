// SPDX-License-Identifier: GPL-3.0-or-later

//! Header-driven rate-limit tracking.
//!
//! Every Echo Nest response carries `X-RateLimit-Limit`, `X-RateLimit-Used`
//! and `X-RateLimit-Remaining`, optionally an `X-RateLimit-Bucket`, and the
//! server's `Date`. The tracker remembers the newest observation per bucket
//! and which bucket each call last reported, so a call about to hit an
//! exhausted bucket can wait for the quota window to roll over.
//!
//! The reset timing is a heuristic: the service replenishes quotas on
//! wall-clock minute boundaries, which [`MinuteAligned`] models. Supply a
//! different [`ResetWindow`] if a bucket behaves otherwise.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use reqwest::header::{HeaderMap, DATE};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, trace};

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const USED_HEADER: &str = "x-ratelimit-used";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const BUCKET_HEADER: &str = "x-ratelimit-bucket";

/// Last observed quota state of one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Bucket name; empty for the default bucket.
    pub bucket: String,
    pub limit: u32,
    pub used: u32,
    pub remaining: u32,
    /// Server time of the response (`Date` header). Unix epoch when unparsable.
    pub last_call: DateTime<Utc>,
    /// Local receipt time minus server time.
    pub drift: TimeDelta,
}

impl RateLimitInfo {
    /// Build a snapshot from response headers received locally at `received_at`.
    ///
    /// Missing or malformed headers leave the matching field at zero.
    pub fn from_headers(headers: &HeaderMap, received_at: DateTime<Utc>) -> Self {
        let (last_call, drift) = match header_str(headers, DATE.as_str()).and_then(parse_http_date)
        {
            Some(date) => (date, received_at - date),
            None => {
                debug!(
                    target: "rate_limit",
                    value = header_str(headers, DATE.as_str()).unwrap_or(""),
                    "failed to parse date header"
                );
                (DateTime::<Utc>::default(), TimeDelta::zero())
            }
        };

        Self {
            bucket: header_str(headers, BUCKET_HEADER)
                .unwrap_or_default()
                .trim()
                .to_string(),
            limit: parse_count(headers, LIMIT_HEADER),
            used: parse_count(headers, USED_HEADER),
            remaining: parse_count(headers, REMAINING_HEADER),
            last_call,
            drift,
        }
    }
}

/// Policy deciding when an exhausted quota is replenished.
pub trait ResetWindow: fmt::Debug + Send + Sync {
    /// Server-clock instant at which the window containing `last_call` ends.
    fn next_reset(&self, last_call: DateTime<Utc>) -> DateTime<Utc>;

    /// Longest possible wait; delays are clamped to this.
    fn length(&self) -> Duration;
}

/// Fixed-length window aligned to wall-clock boundaries (the top of the
/// minute for the default 60 seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteAligned {
    window: Duration,
}

impl MinuteAligned {
    /// Longest accepted window.
    pub const MAX_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

    /// Windows are clamped to between one second and [`MinuteAligned::MAX_WINDOW`].
    pub fn new(window: Duration) -> Self {
        Self {
            window: window.clamp(Duration::from_secs(1), Self::MAX_WINDOW),
        }
    }
}

impl Default for MinuteAligned {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl ResetWindow for MinuteAligned {
    fn next_reset(&self, last_call: DateTime<Utc>) -> DateTime<Utc> {
        let secs = self.window.as_secs() as i64;
        let ts = last_call.timestamp();
        let window_start = ts - ts.rem_euclid(secs);
        DateTime::from_timestamp(window_start + secs, 0).unwrap_or(last_call)
    }

    fn length(&self) -> Duration {
        self.window
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    buckets: HashMap<String, RateLimitInfo>,
    calls: HashMap<String, String>,
}

/// Concurrency-safe cache of per-bucket rate-limit state.
///
/// Shared by every clone of the client that created it. Reads take a shared
/// lock, [`RateLimitTracker::update`] takes the exclusive one, and no lock is
/// held while [`RateLimitTracker::delay_if_needed`] sleeps.
#[derive(Debug)]
pub struct RateLimitTracker {
    state: RwLock<TrackerState>,
    window: Arc<dyn ResetWindow>,
}

impl Default for RateLimitTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitTracker {
    /// Tracker using the 60-second [`MinuteAligned`] window.
    pub fn new() -> Self {
        Self::with_window(Arc::new(MinuteAligned::default()))
    }

    pub fn with_window(window: Arc<dyn ResetWindow>) -> Self {
        Self {
            state: RwLock::new(TrackerState::default()),
            window,
        }
    }

    pub fn window(&self) -> &Arc<dyn ResetWindow> {
        &self.window
    }

    /// Record the rate-limit headers of a response to `call` received now.
    pub async fn update(&self, call: &str, headers: &HeaderMap) {
        self.update_at(call, headers, Utc::now()).await;
    }

    /// Record the rate-limit headers of a response to `call` received at `received_at`.
    ///
    /// The snapshot is stored only when the bucket has none yet or the stored
    /// one is strictly older, so late responses never regress the state.
    pub async fn update_at(&self, call: &str, headers: &HeaderMap, received_at: DateTime<Utc>) {
        let info = RateLimitInfo::from_headers(headers, received_at);

        let mut state = self.state.write().await;
        let newer = state
            .buckets
            .get(&info.bucket)
            .map_or(true, |current| current.last_call < info.last_call);

        if !newer {
            trace!(
                target: "rate_limit",
                call,
                bucket = %info.bucket,
                "ignoring stale rate limit observation"
            );
            return;
        }

        trace!(
            target: "rate_limit",
            call,
            bucket = %info.bucket,
            limit = info.limit,
            used = info.used,
            remaining = info.remaining,
            "recorded rate limit"
        );
        state.calls.insert(call.to_string(), info.bucket.clone());
        state.buckets.insert(info.bucket.clone(), info);
    }

    /// How long `call` should wait before being issued now, if at all.
    pub async fn pending_delay(&self, call: &str) -> Option<Duration> {
        self.pending_delay_at(call, Utc::now()).await
    }

    /// How long `call` should wait if issued at local time `now`.
    ///
    /// Only an exhausted bucket (`remaining == 0`) whose reset, translated to
    /// local time through the tracked drift, still lies ahead yields a delay.
    pub async fn pending_delay_at(&self, call: &str, now: DateTime<Utc>) -> Option<Duration> {
        let state = self.state.read().await;
        let bucket = state.calls.get(call)?;
        let info = state.buckets.get(bucket)?;
        if info.remaining > 0 {
            return None;
        }

        let reset = self.window.next_reset(info.last_call);
        let server_now = now - info.drift;
        if server_now >= reset {
            return None;
        }

        let wait = (reset - server_now).to_std().ok()?;
        Some(wait.min(self.window.length()))
    }

    /// Sleep until the window of `call`'s bucket resets if it is exhausted.
    ///
    /// Returns the time slept. The decision is taken under the read lock and
    /// the lock is released before sleeping.
    pub async fn delay_if_needed(&self, call: &str) -> Option<Duration> {
        let wait = self.pending_delay(call).await?;
        debug!(target: "rate_limit", call, ?wait, "rate limit exhausted, waiting for reset");
        tokio::time::sleep(wait).await;
        Some(wait)
    }

    /// Owned copy of every tracked bucket, keyed by bucket name.
    pub async fn snapshot(&self) -> HashMap<String, RateLimitInfo> {
        self.state.read().await.buckets.clone()
    }

    /// Bucket `call` last reported, or an empty string if it was never seen.
    pub async fn call_bucket(&self, call: &str) -> String {
        self.state
            .read()
            .await
            .calls
            .get(call)
            .cloned()
            .unwrap_or_default()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn parse_count(headers: &HeaderMap, name: &str) -> u32 {
    let raw = header_str(headers, name).unwrap_or("");
    match raw.trim().parse::<u32>() {
        Ok(value) => value,
        Err(error) => {
            debug!(target: "rate_limit", header = name, value = raw, %error, "failed to parse rate limit header");
            0
        }
    }
}

/// Parse an HTTP-date in IMF-fixdate, RFC 850 or asctime form.
pub fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(raw, "%A, %d-%b-%y %H:%M:%S GMT") {
        return Some(date.and_utc());
    }
    // asctime pads single-digit days with a space
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&collapsed, "%a %b %d %H:%M:%S %Y")
        .ok()
        .map(|date| date.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn http_date(date: DateTime<Utc>) -> String {
        date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    fn headers(
        limit: &str,
        used: &str,
        remaining: &str,
        bucket: Option<&str>,
        date: DateTime<Utc>,
    ) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("X-RateLimit-Limit", limit.parse().unwrap());
        h.insert("X-RateLimit-Used", used.parse().unwrap());
        h.insert("X-RateLimit-Remaining", remaining.parse().unwrap());
        if let Some(bucket) = bucket {
            h.insert("X-RateLimit-Bucket", bucket.parse().unwrap());
        }
        h.insert(DATE, http_date(date).parse().unwrap());
        h
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 6, 4, h, m, s).unwrap()
    }

    #[tokio::test]
    async fn test_newer_observations_replace_snapshot() {
        let tracker = RateLimitTracker::new();
        for (i, second) in [5, 6, 9].into_iter().enumerate() {
            let t = at(12, 0, second);
            let used = (i + 1).to_string();
            let remaining = (399 - i).to_string();
            tracker
                .update_at("artist/profile", &headers("400", &used, &remaining, None, t), t)
                .await;
        }

        let snapshot = tracker.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        let info = &snapshot[""];
        assert_eq!(info.used, 3);
        assert_eq!(info.remaining, 397);
        assert_eq!(info.last_call, at(12, 0, 9));
    }

    #[tokio::test]
    async fn test_stale_observation_is_ignored() {
        let tracker = RateLimitTracker::new();
        let t = at(12, 0, 30);
        tracker
            .update_at("song/search", &headers("400", "10", "390", None, t), t)
            .await;

        let earlier = at(12, 0, 20);
        tracker
            .update_at("song/search", &headers("400", "5", "395", None, earlier), t)
            .await;
        // Same timestamp does not replace either.
        tracker
            .update_at("song/search", &headers("400", "11", "389", None, t), t)
            .await;

        let info = &tracker.snapshot().await[""];
        assert_eq!(info.used, 10);
        assert_eq!(info.remaining, 390);
    }

    #[tokio::test]
    async fn test_exhausted_bucket_delays_until_minute_boundary() {
        let tracker = RateLimitTracker::new();
        let t = at(12, 0, 17);
        tracker
            .update_at("track/profile", &headers("400", "400", "0", None, t), t)
            .await;

        let delay = tracker.pending_delay_at("track/profile", t).await;
        assert_eq!(delay, Some(Duration::from_secs(60 - t.second() as u64)));

        let later = tracker
            .pending_delay_at("track/profile", at(12, 0, 50))
            .await;
        assert_eq!(later, Some(Duration::from_secs(10)));

        assert_eq!(tracker.pending_delay_at("track/profile", at(12, 1, 0)).await, None);
        assert_eq!(tracker.pending_delay_at("track/profile", at(12, 3, 12)).await, None);
    }

    #[tokio::test]
    async fn test_remaining_quota_never_delays() {
        let tracker = RateLimitTracker::new();
        let t = at(12, 0, 1);
        tracker
            .update_at("artist/profile", &headers("400", "400", "1", None, t), t)
            .await;
        assert_eq!(tracker.pending_delay_at("artist/profile", t).await, None);
    }

    #[tokio::test]
    async fn test_unknown_call_has_no_bucket_and_no_delay() {
        let tracker = RateLimitTracker::new();
        let t = at(12, 0, 1);
        tracker
            .update_at("artist/profile", &headers("400", "400", "0", None, t), t)
            .await;

        assert_eq!(tracker.call_bucket("never/called").await, "");
        assert_eq!(tracker.pending_delay_at("never/called", t).await, None);
    }

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        let tracker = RateLimitTracker::new();
        let t = at(12, 0, 1);
        tracker
            .update_at("artist/profile", &headers("400", "1", "399", None, t), t)
            .await;
        let before = tracker.snapshot().await;

        let t2 = at(12, 0, 2);
        tracker
            .update_at("artist/profile", &headers("400", "2", "398", None, t2), t2)
            .await;

        let info = &before[""];
        assert_eq!(info.used, 1);
        assert_eq!(info.remaining, 399);
        assert_eq!(info.used + info.remaining, info.limit);
        assert_eq!(tracker.snapshot().await[""].used, 2);
    }

    #[tokio::test]
    async fn test_fresh_response_clears_delay() {
        let tracker = RateLimitTracker::new();
        let t = at(9, 41, 22);
        tracker
            .update_at("track/profile", &headers("400", "400", "0", None, t), t)
            .await;
        assert_eq!(
            tracker.pending_delay_at("track/profile", t).await,
            Some(Duration::from_secs(38))
        );

        let after_reset = at(9, 42, 0);
        tracker
            .update_at(
                "track/profile",
                &headers("400", "1", "399", None, after_reset),
                after_reset,
            )
            .await;
        assert_eq!(
            tracker.pending_delay_at("track/profile", after_reset).await,
            None
        );
    }

    #[tokio::test]
    async fn test_drift_shifts_reset_into_local_time() {
        let tracker = RateLimitTracker::new();
        let server = at(12, 0, 40);
        // Local clock runs 15 seconds ahead of the server.
        let local = server + TimeDelta::seconds(15);
        tracker
            .update_at("track/profile", &headers("400", "400", "0", None, server), local)
            .await;

        let info = &tracker.snapshot().await[""];
        assert_eq!(info.drift, TimeDelta::seconds(15));
        assert_eq!(
            tracker.pending_delay_at("track/profile", local).await,
            Some(Duration::from_secs(20))
        );
        // Local 12:01:05 is server 12:00:50.
        assert_eq!(
            tracker
                .pending_delay_at("track/profile", at(12, 1, 5))
                .await,
            Some(Duration::from_secs(10))
        );
        assert_eq!(
            tracker
                .pending_delay_at("track/profile", at(12, 1, 15))
                .await,
            None
        );
    }

    #[tokio::test]
    async fn test_buckets_are_tracked_separately() {
        let tracker = RateLimitTracker::new();
        let t = at(12, 0, 1);
        tracker
            .update_at("artist/profile", &headers("400", "400", "0", None, t), t)
            .await;
        tracker
            .update_at(
                "track/upload",
                &headers("100", "3", "97", Some("upload"), t),
                t,
            )
            .await;

        assert_eq!(tracker.call_bucket("artist/profile").await, "");
        assert_eq!(tracker.call_bucket("track/upload").await, "upload");

        let snapshot = tracker.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["upload"].bucket, "upload");
        assert_eq!(snapshot["upload"].limit, 100);
        assert!(tracker.pending_delay_at("artist/profile", t).await.is_some());
        assert!(tracker.pending_delay_at("track/upload", t).await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_headers_degrade_to_zero() {
        let tracker = RateLimitTracker::new();
        let mut h = HeaderMap::new();
        h.insert("X-RateLimit-Limit", "lots".parse().unwrap());
        h.insert("X-RateLimit-Used", "-4".parse().unwrap());
        h.insert("Date", "yesterday".parse().unwrap());
        tracker.update_at("artist/news", &h, at(12, 0, 0)).await;

        let info = &tracker.snapshot().await[""];
        assert_eq!(info.limit, 0);
        assert_eq!(info.used, 0);
        assert_eq!(info.remaining, 0);
        assert_eq!(info.last_call, DateTime::<Utc>::default());
        assert_eq!(info.drift, TimeDelta::zero());
        // An epoch-dated exhausted bucket reset long ago.
        assert_eq!(tracker.pending_delay_at("artist/news", at(12, 0, 0)).await, None);
    }

    #[tokio::test]
    async fn test_custom_window() {
        let tracker =
            RateLimitTracker::with_window(Arc::new(MinuteAligned::new(Duration::from_secs(10))));
        let t = at(12, 0, 23);
        tracker
            .update_at("song/profile", &headers("20", "20", "0", None, t), t)
            .await;
        assert_eq!(
            tracker.pending_delay_at("song/profile", t).await,
            Some(Duration::from_secs(7))
        );
        assert_eq!(tracker.window().length(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_concurrent_updates_keep_newest() {
        let tracker = Arc::new(RateLimitTracker::new());
        let mut handles = Vec::new();
        for second in 0..30u32 {
            let tracker = Arc::clone(&tracker);
            handles.push(tokio::spawn(async move {
                let t = at(12, 0, second);
                let remaining = (400 - second).to_string();
                tracker
                    .update_at("artist/profile", &headers("400", "0", &remaining, None, t), t)
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let info = &tracker.snapshot().await[""];
        assert_eq!(info.last_call, at(12, 0, 29));
        assert_eq!(info.remaining, 371);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_if_needed_sleeps_for_pending_delay() {
        let tracker = RateLimitTracker::new();
        let now = Utc::now();
        tracker
            .update_at("track/profile", &headers("400", "400", "0", None, now), now)
            .await;

        let start = tokio::time::Instant::now();
        let slept = tracker.delay_if_needed("track/profile").await;
        let slept = slept.expect("exhausted bucket should delay");
        assert!(slept > Duration::ZERO);
        assert!(slept <= Duration::from_secs(60));
        assert!(start.elapsed() >= slept);
    }

    #[test]
    fn test_parse_http_date_forms() {
        let expected = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(
            parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT"),
            Some(expected)
        );
        assert_eq!(
            parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT"),
            Some(expected)
        );
        assert_eq!(parse_http_date("Sun Nov  6 08:49:37 1994"), Some(expected));
        assert_eq!(
            parse_http_date("Wed Nov 16 08:49:37 1994"),
            Some(Utc.with_ymd_and_hms(1994, 11, 16, 8, 49, 37).unwrap())
        );
        assert_eq!(parse_http_date("not a date"), None);
        assert_eq!(parse_http_date(""), None);
    }

    #[tokio::test]
    async fn test_oversized_window_is_clamped() {
        let window = MinuteAligned::new(Duration::from_secs(u64::MAX));
        assert_eq!(window.length(), MinuteAligned::MAX_WINDOW);
        assert_eq!(
            MinuteAligned::new(Duration::from_secs(1 << 40)).length(),
            MinuteAligned::MAX_WINDOW
        );
        assert_eq!(MinuteAligned::new(Duration::ZERO).length(), Duration::from_secs(1));

        let tracker = RateLimitTracker::with_window(Arc::new(window));
        let last_call = at(12, 0, 17);
        tracker
            .update_at("song/search", &headers("120", "120", "0", None, last_call), last_call)
            .await;

        let delay = tracker
            .pending_delay_at("song/search", last_call + TimeDelta::seconds(1))
            .await
            .expect("exhausted bucket should delay");
        assert!(delay <= MinuteAligned::MAX_WINDOW);
    }

    #[test]
    fn test_minute_aligned_reset() {
        let window = MinuteAligned::default();
        assert_eq!(window.next_reset(at(12, 0, 17)), at(12, 1, 0));
        assert_eq!(window.next_reset(at(12, 0, 0)), at(12, 1, 0));
        assert_eq!(window.next_reset(at(23, 59, 59)), at(23, 59, 59) + TimeDelta::seconds(1));
    }
}
