//! HTTP client for the FOSMIS student portal.
//!
//! Login is a three-step dance:
//! 1. GET `index.php` so the portal issues a fresh PHPSESSID
//! 2. POST the credentials to `login.php` (the portal 302s either way)
//! 3. Re-fetch `index.php` — if the login form is still served, the
//!    credentials were rejected
//!
//! Authenticated page fetches go through a session-scoped TTL cache; the
//! portal regenerates every page per hit and takes seconds to do it.

mod cache;
mod error;

pub use cache::{CacheStats, HtmlCache};
pub use error::FosmisError;

use rand::Rng;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{COOKIE, ORIGIN, REFERER};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Default portal root.
const FOSMIS_BASE_URL: &str = "https://paravi.ruh.ac.lk/fosmis2019";

/// The portal rejects unfamiliar user agents with an empty page.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the FOSMIS client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: FOSMIS_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

/// Client for authenticated FOSMIS page fetches.
pub struct FosmisClient {
    http: Client,
    base: Url,
    referer: String,
    config: ClientConfig,
    cache: Arc<HtmlCache>,
}

impl FosmisClient {
    /// Builds a client. Fails when the configured base URL does not parse
    /// or the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig, cache: Arc<HtmlCache>) -> Result<Self, FosmisError> {
        let base = Url::parse(&config.base_url)?;
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FosmisError::Network {
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        // The legacy /fosmis/ path is what the portal's own web UI sends
        let referer = format!("{}/fosmis/", base.origin().ascii_serialization());
        Ok(Self {
            http,
            base,
            referer,
            config,
            cache,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn cache(&self) -> &HtmlCache {
        &self.cache
    }

    /// Logs in and returns the portal session id.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, FosmisError> {
        let correlation_id = generate_correlation_id();
        info!(
            correlation_id = %correlation_id,
            username = %username,
            "Logging in to FOSMIS"
        );

        // A throwaway client with its own jar, so the issued PHPSESSID can
        // be read back out after the handshake
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .user_agent(&self.config.user_agent)
            .connect_timeout(self.config.connect_timeout)
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| FosmisError::Network {
                message: format!("Failed to build login client: {e}"),
            })?;

        // Step 1: index.php seeds the session cookie
        let index_url = self.page_url("index.php");
        client.get(&index_url).send().await?;

        let parsed_index = Url::parse(&index_url)?;
        let session_id = session_from_jar(jar.as_ref(), &parsed_index).ok_or_else(|| {
            FosmisError::UnexpectedResponse {
                message: "Portal did not issue a PHPSESSID cookie".to_string(),
            }
        })?;

        // Step 2: POST credentials; the portal redirects whether or not
        // they are right
        client
            .post(self.page_url("login.php"))
            .header(REFERER, &index_url)
            .header(ORIGIN, self.base.origin().ascii_serialization())
            .form(&[("uname", username), ("upwd", password)])
            .send()
            .await?;

        // Step 3: the login form still being served is the rejection tell
        let verify = client.get(&index_url).send().await?.text().await?;
        if verify.contains(r#"name="uname""#) || verify.contains("login.php") {
            warn!(correlation_id = %correlation_id, "Credentials rejected by FOSMIS");
            return Err(FosmisError::InvalidCredentials);
        }

        info!(correlation_id = %correlation_id, "Login succeeded");
        Ok(session_id)
    }

    /// Results table for one student and level.
    pub async fn fetch_results_html(
        &self,
        session: &str,
        stnum: &str,
        rlevel: &str,
    ) -> Result<String, FosmisError> {
        let path = format!("Ajax/result_filt.php?task=lvlfilt&stnum={stnum}&rlevel={rlevel}");
        self.fetch_cached(session, "results", &[stnum, rlevel], &path)
            .await
    }

    pub async fn fetch_course_registration_html(
        &self,
        session: &str,
    ) -> Result<String, FosmisError> {
        self.fetch_cached(session, "coursereg", &[], "forms/course_reg.php")
            .await
    }

    pub async fn fetch_notices_html(&self, session: &str) -> Result<String, FosmisError> {
        self.fetch_cached(session, "notices", &[], "forms/form_53_a.php")
            .await
    }

    pub async fn fetch_homepage_html(&self, session: &str) -> Result<String, FosmisError> {
        self.fetch_cached(session, "home", &[], "index.php").await
    }

    /// Fetches a notice file without buffering it; the caller streams the
    /// body through to its own client.
    pub async fn fetch_notice_file(
        &self,
        url: &str,
        session: Option<&str>,
    ) -> Result<reqwest::Response, FosmisError> {
        let mut request = self.http.get(url).header(REFERER, &self.referer);
        if let Some(session) = session {
            request = request.header(COOKIE, format!("PHPSESSID={session}"));
        }
        Ok(request.send().await?)
    }

    async fn fetch_cached(
        &self,
        session: &str,
        endpoint: &str,
        args: &[&str],
        path: &str,
    ) -> Result<String, FosmisError> {
        let key = HtmlCache::key(session, endpoint, args);
        if let Some(html) = self.cache.get(&key) {
            debug!(endpoint = endpoint, "Cache hit");
            return Ok(html);
        }

        let html = match self.fetch_page(session, path).await {
            Ok(html) => html,
            Err(err) => {
                warn!(
                    endpoint = endpoint,
                    retryable = err.is_retryable(),
                    "Portal fetch failed"
                );
                return Err(err);
            }
        };
        self.cache.insert(key, html.clone());
        Ok(html)
    }

    /// Raw authenticated GET against the portal.
    async fn fetch_page(&self, session: &str, path: &str) -> Result<String, FosmisError> {
        let url = self.page_url(path);
        debug!(url = %url, "Fetching portal page");
        let response = self
            .http
            .get(&url)
            .header(COOKIE, format!("PHPSESSID={session}"))
            .header(REFERER, &self.referer)
            .send()
            .await?;
        Ok(response.text().await?)
    }

    fn page_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base.as_str().trim_end_matches('/'))
    }
}

/// Reads the PHPSESSID value out of a login jar.
fn session_from_jar(jar: &Jar, url: &Url) -> Option<String> {
    let header = jar.cookies(url)?;
    let cookies = header.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("PHPSESSID=").map(str::to_string))
}

/// Correlation id tying the login steps together in the logs.
fn generate_correlation_id() -> String {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros())
        .unwrap_or(0);
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}
