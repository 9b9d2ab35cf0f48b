// SPDX-License-Identifier: GPL-3.0-or-later

use crate::args::Args;
use crate::error::{EchoNestError, Result};
use crate::json::{api_status, custom_unmarshal};
use crate::models::Analysis;
use crate::rate_limit::{MinuteAligned, RateLimitInfo, RateLimitTracker, ResetWindow};
use crate::upload::UploadFile;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

pub const DEFAULT_HOSTNAME: &str = "developer.echonest.com";
pub const DEFAULT_BASE_PATH: &str = "/api/v4/";
pub const DEFAULT_SCHEME: &str = "http";
/// Environment variable read for the API key when none is configured.
pub const API_KEY_ENV: &str = "ECHO_NEST_API_KEY";

const USER_AGENT: &str = concat!("echonest-client/", env!("CARGO_PKG_VERSION"));

/// Echo Nest API client with header-driven throttling.
///
/// Clones share the same connection pool and [`RateLimitTracker`].
#[derive(Debug, Clone)]
pub struct EchoNestClient {
    client: Client,
    base_url: Url,
    api_key: String,
    throttle: bool,
    tracker: Arc<RateLimitTracker>,
}

impl EchoNestClient {
    /// Client for `developer.echonest.com` using the key from `ECHO_NEST_API_KEY`.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> EchoNestClientBuilder {
        EchoNestClientBuilder::default()
    }

    /// Issue `call` with the GET method and return the raw response.
    ///
    /// `api_key` and `format=json` are added to `args`. Any status other than
    /// 200 is returned as [`EchoNestError::Status`].
    ///
    /// # Example
    /// ```no_run
    /// # use echonest_client::{Args, EchoNestClient};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = EchoNestClient::builder().throttle(true).build()?;
    /// let args = Args::from([("name", "Radiohead"), ("bucket", "hotttnesss")]);
    /// let response = client.get_call("artist/profile", &args).await?;
    /// let profile = echonest_client::generic_unmarshal(response).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_call(&self, call: &str, args: &Args) -> Result<Response> {
        let mut url = self.call_url(call)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in self.request_args(args).iter() {
                query.append_pair(key, value);
            }
        }

        trace!(target: "echonest", call, "GET {}", url.path());
        let request = self.client.get(url);
        self.send(call, request).await
    }

    /// Issue `call` with the POST method as a `multipart/form-data` body.
    ///
    /// Every argument becomes a text field and every file a file part named
    /// after its field.
    pub async fn post_call(
        &self,
        call: &str,
        args: &Args,
        files: Vec<(String, UploadFile)>,
    ) -> Result<Response> {
        let url = self.call_url(call)?;

        let mut form = Form::new();
        for (key, value) in self.request_args(args).iter() {
            form = form.text(key.to_string(), value.to_string());
        }
        for (field, file) in files {
            trace!(target: "echonest", call, field = %field, bytes = file.len(), "attaching upload");
            form = form.part(field, file.into_part());
        }

        trace!(target: "echonest", call, "POST {}", url.path());
        let request = self.client.post(url).multipart(form);
        self.send(call, request).await
    }

    /// GET `call` and decode the body into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, call: &str, args: &Args) -> Result<T> {
        let response = self.get_call(call, args).await?;
        custom_unmarshal(response).await
    }

    /// POST `call` and decode the body into `T`.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        call: &str,
        args: &Args,
        files: Vec<(String, UploadFile)>,
    ) -> Result<T> {
        let response = self.post_call(call, args, files).await?;
        custom_unmarshal(response).await
    }

    /// Fetch the detailed analysis document behind an `analysis_url`.
    ///
    /// This goes to the analysis host directly and is not throttled.
    pub async fn fetch_analysis(&self, analysis_url: &str) -> Result<Analysis> {
        let url = Url::parse(analysis_url)
            .map_err(|e| EchoNestError::InvalidUrl(format!("{}: {}", analysis_url, e)))?;
        let response = self.client.get(url).send().await?;
        debug!(target: "echonest", status = %response.status(), "analysis response");
        custom_unmarshal(response).await
    }

    /// Copy of the rate-limit state of every bucket seen so far.
    pub async fn rate_limits(&self) -> HashMap<String, RateLimitInfo> {
        self.tracker.snapshot().await
    }

    /// Rate-limit bucket `call` last reported; empty if it was never issued.
    pub async fn call_bucket(&self, call: &str) -> String {
        self.tracker.call_bucket(call).await
    }

    /// Delay the next `call` would incur if throttling were enabled.
    pub async fn pending_delay(&self, call: &str) -> Option<Duration> {
        self.tracker.pending_delay(call).await
    }

    pub fn tracker(&self) -> &Arc<RateLimitTracker> {
        &self.tracker
    }

    pub fn throttle(&self) -> bool {
        self.throttle
    }

    /// Root every call path is resolved against, e.g. `http://developer.echonest.com/api/v4/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn call_url(&self, call: &str) -> Result<Url> {
        self.base_url
            .join(call.trim_start_matches('/'))
            .map_err(|e| EchoNestError::InvalidUrl(format!("{}: {}", call, e)))
    }

    fn request_args(&self, args: &Args) -> Args {
        let mut args = args.clone();
        args.set("api_key", self.api_key.as_str());
        args.set("format", "json");
        args
    }

    async fn send(&self, call: &str, request: RequestBuilder) -> Result<Response> {
        if self.throttle {
            self.tracker.delay_if_needed(call).await;
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(target: "echonest", call, %status, "response status");

        self.tracker.update(call, response.headers()).await;

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            trace!(target: "echonest", call, "error body: {}", body);
            return Err(EchoNestError::Status {
                http_status: status.as_u16(),
                status: api_status(&body),
            });
        }

        Ok(response)
    }
}

/// Builder for configuring an Echo Nest client.
#[derive(Debug)]
pub struct EchoNestClientBuilder {
    scheme: String,
    hostname: String,
    base_path: String,
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
    throttle: bool,
    window: Arc<dyn ResetWindow>,
}

impl Default for EchoNestClientBuilder {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            hostname: DEFAULT_HOSTNAME.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            base_url: None,
            api_key: None,
            timeout: Duration::from_secs(30),
            throttle: false,
            window: Arc::new(MinuteAligned::default()),
        }
    }
}

impl EchoNestClientBuilder {
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Replace scheme, host and port at once (useful for testing with mock
    /// servers). The base path is still appended.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Defaults to the `ECHO_NEST_API_KEY` environment variable.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait for the quota window to reset before calls whose bucket is exhausted.
    pub fn throttle(mut self, throttle: bool) -> Self {
        self.throttle = throttle;
        self
    }

    /// Replace the quota reset heuristic.
    pub fn reset_window(mut self, window: Arc<dyn ResetWindow>) -> Self {
        self.window = window;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns an error if the scheme, hostname or base URL do not form a
    /// valid URL, or if the HTTP client cannot be created.
    pub fn build(self) -> Result<EchoNestClient> {
        let root = self
            .base_url
            .unwrap_or_else(|| format!("{}://{}", self.scheme, self.hostname));
        let mut base_url =
            Url::parse(&root).map_err(|e| EchoNestError::InvalidUrl(format!("{}: {}", root, e)))?;
        if base_url.cannot_be_a_base() || base_url.host_str().map_or(true, str::is_empty) {
            return Err(EchoNestError::InvalidUrl(format!("{}: missing host", root)));
        }

        let trimmed = self.base_path.trim_matches('/');
        if trimmed.is_empty() {
            base_url.set_path("/");
        } else {
            base_url.set_path(&format!("/{}/", trimmed));
        }

        let api_key = self
            .api_key
            .unwrap_or_else(|| env::var(API_KEY_ENV).unwrap_or_default());
        if api_key.is_empty() {
            debug!(target: "echonest", "no API key configured; set {}", API_KEY_ENV);
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(EchoNestClient {
            client,
            base_url,
            api_key,
            throttle: self.throttle,
            tracker: Arc::new(RateLimitTracker::with_window(self.window)),
        })
    }
}
