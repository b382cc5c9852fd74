//! Jellyfin-compatible HTTP API client
//!
//! Wraps a `reqwest::Client` preconfigured with the server base URL, timeout and
//! authentication header, and resolves the user id that scopes library requests.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::debug;

use super::error::ApiError;
use crate::config::Config;

/// Header carrying the API token on every request
pub const AUTH_HEADER: &str = "X-Emby-Token";

/// Image variants a server can return for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageKind {
    #[default]
    Primary,
    Backdrop,
    Banner,
    Thumb,
}

impl ImageKind {
    /// Name the server uses for this image type in URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Primary => "Primary",
            ImageKind::Backdrop => "Backdrop",
            ImageKind::Banner => "Banner",
            ImageKind::Thumb => "Thumb",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call additions to a request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query string parameters, in order
    pub query: Vec<(String, String)>,
    /// JSON request body
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    /// Options with no query and no body
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Appends several query parameters
    pub fn with_query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the JSON body
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ApiError::Unknown {
            message: format!("Failed to encode request body: {}", e),
        })?);
        Ok(self)
    }
}

/// A user record from `GET /Users`; only the id is needed
#[derive(Debug, Deserialize)]
struct UserRecord {
    #[serde(rename = "Id")]
    id: String,
}

/// Client for a single media server
///
/// Base URL, timeout and token are fixed at construction. The user id is
/// resolved on first use and kept until [`ApiClient::reset_user_id`].
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    poster_bounds: (u32, u32),
    user_id: Mutex<Option<String>>,
}

impl ApiClient {
    /// Creates a client from configuration
    ///
    /// # Returns
    /// * `Err(ApiError::Unknown)` if the token is not a valid header value or
    ///   the HTTP client cannot be built
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut token = HeaderValue::from_str(&config.api_key).map_err(|e| ApiError::Unknown {
            message: format!("Invalid API key: {}", e),
        })?;
        token.set_sensitive(true);
        headers.insert(AUTH_HEADER, token);

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(ApiError::from_transport)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            poster_bounds: (config.poster_max_width, config.poster_max_height),
            user_id: Mutex::new(None),
        })
    }

    /// The server root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues a GET against `base_url + path`
    ///
    /// # Arguments
    /// * `path` - Path below the server root, starting with `/`
    /// * `options` - Query parameters and body for this call
    ///
    /// # Returns
    /// * `Ok(T)` - The decoded 2xx body
    /// * `Err(ApiError)` - The normalized failure
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, options).await
    }

    /// Issues a GET whose path is built from individually encoded segments
    ///
    /// Use this when a segment comes from data (an item or user id), so that
    /// characters like `/`, `?` or `#` stay inside their segment.
    pub async fn get_segments<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = self.segments_url(segments)?;
        self.send(Method::GET, url, options).await
    }

    /// Issues a POST, same contract as [`ApiClient::get`]
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, options).await
    }

    /// Issues a PUT, same contract as [`ApiClient::get`]
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, path, options).await
    }

    /// Issues a DELETE, same contract as [`ApiClient::get`]
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(Method::DELETE, path, options).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        self.send(method, url, options).await
    }

    /// Issues `method` against `url` and decodes a 2xx body
    ///
    /// An empty success body decodes as JSON `null`, so `()` and `Option<_>`
    /// work for endpoints that return nothing.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let path = url.path().to_string();
        debug!("API Request: {} {}", method, path);

        let mut builder = self.http.request(method, url);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        debug!("API Response: {} {}", status.as_u16(), path);

        if !status.is_success() {
            // A body that fails to arrive still leaves us with the status
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        let bytes = response.bytes().await.map_err(ApiError::from_transport)?;
        let payload: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        serde_json::from_slice(payload).map_err(ApiError::decode)
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ApiError::invalid_url(&raw, e))
    }

    /// Appends each segment, percent-encoded, to the base URL's path
    fn segments_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ApiError::invalid_url(&self.base_url, e))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::invalid_url(&self.base_url, "URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Returns the id of the user that scopes library requests
    ///
    /// The first call asks `GET /Users` and keeps the first user's id; later
    /// calls return it without a request. Two calls racing before the first
    /// completes may both hit the server and store the same id.
    pub async fn resolve_user_id(&self) -> Result<String, ApiError> {
        if let Some(id) = self.cached_user_id() {
            return Ok(id);
        }

        let users: Vec<UserRecord> = self.get("/Users", RequestOptions::new()).await?;
        let id = users
            .into_iter()
            .next()
            .map(|user| user.id)
            .ok_or_else(ApiError::no_user)?;

        debug!(user_id = %id, "resolved user id");
        *self.user_id.lock().unwrap_or_else(|e| e.into_inner()) = Some(id.clone());
        Ok(id)
    }

    /// The memoized user id, if one has been resolved
    pub fn cached_user_id(&self) -> Option<String> {
        self.user_id
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Forgets the memoized user id so the next call resolves it again
    pub fn reset_user_id(&self) {
        *self.user_id.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Builds an image URL, or an empty string when there is no image tag
    ///
    /// No request is made; an empty result means the item has no image of
    /// that kind.
    pub fn build_image_url(
        &self,
        item_id: &str,
        kind: ImageKind,
        tag: Option<&str>,
        max_width: Option<u32>,
        max_height: Option<u32>,
    ) -> String {
        let tag = match tag {
            Some(tag) if !tag.is_empty() => tag,
            _ => return String::new(),
        };

        let mut url = format!(
            "{}/Items/{}/Images/{}?tag={}",
            self.base_url, item_id, kind, tag
        );
        if let Some(width) = max_width {
            url.push_str(&format!("&maxWidth={}", width));
        }
        if let Some(height) = max_height {
            url.push_str(&format!("&maxHeight={}", height));
        }
        url
    }

    /// Image URL bounded to the configured poster size
    pub fn poster_url(&self, item_id: &str, kind: ImageKind, tag: Option<&str>) -> String {
        let (width, height) = self.poster_bounds;
        self.build_image_url(item_id, kind, tag, Some(width), Some(height))
    }

    /// Direct static stream URL for an item
    pub fn build_playback_url(&self, item_id: &str) -> String {
        format!("{}/Videos/{}/stream?static=true", self.base_url, item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client() -> ApiClient {
        ApiClient::new(&Config::new("http://media.lan:8096/", "secret")).unwrap()
    }

    #[test]
    fn test_image_url_without_tag_is_empty() {
        let client = create_test_client();

        assert_eq!(client.build_image_url("abc", ImageKind::Primary, None, None, None), "");
        assert_eq!(
            client.build_image_url("abc", ImageKind::Primary, Some(""), Some(300), None),
            ""
        );
    }

    #[test]
    fn test_image_url_with_bounds() {
        let client = create_test_client();
        let url = client.build_image_url("abc", ImageKind::Backdrop, Some("t1"), Some(300), Some(450));

        assert_eq!(
            url,
            "http://media.lan:8096/Items/abc/Images/Backdrop?tag=t1&maxWidth=300&maxHeight=450"
        );
    }

    #[test]
    fn test_image_url_with_partial_bounds() {
        let client = create_test_client();

        assert_eq!(
            client.build_image_url("abc", ImageKind::Thumb, Some("t"), None, Some(200)),
            "http://media.lan:8096/Items/abc/Images/Thumb?tag=t&maxHeight=200"
        );
        assert_eq!(
            client.build_image_url("abc", ImageKind::Primary, Some("t"), None, None),
            "http://media.lan:8096/Items/abc/Images/Primary?tag=t"
        );
    }

    #[test]
    fn test_poster_url_uses_configured_bounds() {
        let client = create_test_client();
        let url = client.poster_url("abc", ImageKind::Primary, Some("tag"));

        assert!(url.ends_with("?tag=tag&maxWidth=300&maxHeight=450"));
        assert_eq!(client.poster_url("abc", ImageKind::Primary, None), "");
    }

    #[test]
    fn test_playback_url() {
        let client = create_test_client();
        assert_eq!(
            client.build_playback_url("movie-1"),
            "http://media.lan:8096/Videos/movie-1/stream?static=true"
        );
    }

    #[test]
    fn test_invalid_api_key_header_is_rejected() {
        let result = ApiClient::new(&Config::new("http://media.lan", "bad\nkey"));
        assert!(matches!(result, Err(ApiError::Unknown { .. })));
    }

    #[test]
    fn test_request_options_builder() {
        let options = RequestOptions::new()
            .query("Limit", 20)
            .with_query([("SortBy", "Name")])
            .json(&serde_json::json!({"Played": true}))
            .unwrap();

        assert_eq!(
            options.query,
            vec![
                ("Limit".to_string(), "20".to_string()),
                ("SortBy".to_string(), "Name".to_string())
            ]
        );
        assert_eq!(options.body, Some(serde_json::json!({"Played": true})));
    }

    #[test]
    fn test_user_id_starts_unresolved_and_resets() {
        let client = create_test_client();
        assert!(client.cached_user_id().is_none());

        *client.user_id.lock().unwrap() = Some("u1".to_string());
        assert_eq!(client.cached_user_id().as_deref(), Some("u1"));

        client.reset_user_id();
        assert!(client.cached_user_id().is_none());
    }

    #[test]
    fn test_segments_are_percent_encoded() {
        let client = create_test_client();
        let url = client.segments_url(&["Users", "u1", "Items", "a/b?c#d"]).unwrap();

        assert_eq!(url.path(), "/Users/u1/Items/a%2Fb%3Fc%23d");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_segments_keep_base_path() {
        let client = ApiClient::new(&Config::new("http://media.lan/jellyfin/", "k")).unwrap();
        let url = client.segments_url(&["Users"]).unwrap();

        assert_eq!(url.as_str(), "http://media.lan/jellyfin/Users");
    }

    #[test]
    fn test_segments_with_invalid_base_are_unknown_errors() {
        let client = ApiClient::new(&Config::new("not a url", "k")).unwrap();
        let err = client.segments_url(&["Users"]).unwrap_err();

        assert!(matches!(err, ApiError::Unknown { .. }));
    }

    #[test]
    fn test_image_kind_names() {
        assert_eq!(ImageKind::default(), ImageKind::Primary);
        assert_eq!(ImageKind::Banner.to_string(), "Banner");
    }
}
