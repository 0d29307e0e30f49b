//! Content Service Client
//!
//! HTTP client for the headless CMS behind the streaming catalog. Endpoint
//! wrappers return flattened view models; the raw envelope shapes live in
//! `types` and the mapping functions in `normalize`.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};
use url::Url;

use super::normalize;
use super::types::{
    Data, Entity, Envelope, FavoriteAttributes, FavoritePayload, LoginRequest, ProgressAttributes,
    ProgressPayload, TitleAttributes,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    AuthUser, ContinueEntry, FavoriteItem, LoginResponse, RemoteProgress, SaveProgressRequest,
    TitleCard, TitleDetail, WatchTarget,
};
use crate::services::session::SessionStore;

/// Typed client for the content service.
///
/// Cheap to clone. The current-user cache is shared between clones and keyed
/// by the token it was filled under, so a token change invalidates it.
#[derive(Clone)]
pub struct CmsClient {
    http: Client,
    base_url: Url,
    session: SessionStore,
    user_cache: Arc<RwLock<Option<(String, AuthUser)>>>,
}

impl CmsClient {
    /// Create a client from validated configuration.
    ///
    /// The base address was already checked by [`Config`], so a client never
    /// exists without one.
    pub fn new(config: &Config, session: SessionStore) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            session,
            user_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Join the base address with a relative path and query parameters
    pub fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let clean = path.strip_prefix('/').unwrap_or(path);
        let mut url = self
            .base_url
            .join(clean)
            .map_err(|err| Error::Config(format!("invalid request path '{}': {}", path, err)))?;

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url)
    }

    /// Attach the bearer token to a request when a session is present
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut request = self.http.request(method, url);
        if let Some(token) = self.session.token() {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request
    }

    /// Send a request and parse the JSON body. A non-success status becomes a
    /// request error carrying the response body text.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(request_error(status, text));
        }

        serde_json::from_str(&text).map_err(|err| {
            error!("Failed to parse content service response: {}", err);
            let preview: String = text.chars().take(500).collect();
            debug!("Response text: {}", preview);
            err.into()
        })
    }

    /// GET a JSON document
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.build_url(path, params)?;
        debug!("Content service request: GET {}", path);
        self.send_json(self.request(Method::GET, url)).await
    }

    /// POST a JSON body
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path, &[])?;
        debug!("Content service request: POST {}", path);
        self.send_json(self.request(Method::POST, url).json(body)).await
    }

    /// PUT a JSON body
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path, &[])?;
        debug!("Content service request: PUT {}", path);
        self.send_json(self.request(Method::PUT, url).json(body)).await
    }

    /// DELETE a resource, ignoring any response body
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.build_url(path, &[])?;
        debug!("Content service request: DELETE {}", path);

        let response = self.request(Method::DELETE, url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(request_error(status, text));
        }
        Ok(())
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Exchange credentials for a bearer token and user profile.
    ///
    /// The token is returned, not stored; pair with
    /// [`SessionStore::set_token`] to authenticate subsequent calls.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse> {
        if identifier.is_empty() || password.is_empty() {
            return Err(Error::MissingCredentials);
        }

        let url = self.build_url("api/auth/local", &[])?;
        debug!("Content service request: POST api/auth/local");

        let response = self
            .http
            .post(url)
            .json(&LoginRequest { identifier, password })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = login_error_message(&text)
                .unwrap_or_else(|| format!("Request failed ({})", status.as_u16()));
            return Err(Error::Request {
                status: status.as_u16(),
                message,
            });
        }

        // A success body without the token is unusable
        serde_json::from_str(&text).map_err(|_| Error::InvalidResponse)
    }

    /// Fetch the authenticated user's profile, memoized per token.
    ///
    /// Fails with [`Error::AuthRequired`] before any network call when no
    /// session token is present. A cache filled under a previous token is
    /// discarded.
    pub async fn current_user(&self) -> Result<AuthUser> {
        let token = match self.session.token() {
            Some(token) => token,
            None => {
                *self.user_cache.write().unwrap() = None;
                return Err(Error::AuthRequired);
            }
        };

        {
            let mut cache = self.user_cache.write().unwrap();
            match cache.as_ref() {
                Some((cached_token, user)) if *cached_token == token => return Ok(user.clone()),
                Some(_) => *cache = None, // token changed since the profile was cached
                None => {}
            }
        }

        let user: AuthUser = self.fetch_json("api/users/me", &[]).await?;
        *self.user_cache.write().unwrap() = Some((token, user.clone()));
        Ok(user)
    }

    // ========================================================================
    // Titles
    // ========================================================================

    /// List catalog titles, most recently updated first
    pub async fn fetch_titles(&self) -> Result<Vec<TitleCard>> {
        self.fetch_title_cards(false).await
    }

    /// List only the titles flagged for the featured rail
    pub async fn fetch_featured_titles(&self) -> Result<Vec<TitleCard>> {
        self.fetch_title_cards(true).await
    }

    async fn fetch_title_cards(&self, featured: bool) -> Result<Vec<TitleCard>> {
        let mut params = vec![
            ("populate[poster]", "*"),
            ("populate[backdrop]", "*"),
            ("populate[genres]", "*"),
            ("sort", "updatedAt:desc"),
        ];
        if featured {
            params.push(("filters[isFeatured][$eq]", "true"));
        }

        let response: Envelope<Vec<Entity<TitleAttributes>>> =
            self.fetch_json("api/titles", &params).await?;

        Ok(response
            .data
            .iter()
            .map(|entity| normalize::map_title_card(&self.base_url, entity))
            .collect())
    }

    /// Fetch one title with seasons, episodes, genres and cast populated
    pub async fn fetch_title(&self, id: i64) -> Result<TitleDetail> {
        let params = [
            ("populate[poster]", "*"),
            ("populate[backdrop]", "*"),
            ("populate[video]", "*"),
            ("populate[genres]", "*"),
            ("populate[cast]", "*"),
            ("populate[seasons][populate][episodes][populate]", "*"),
        ];

        let response: Envelope<Entity<TitleAttributes>> = self
            .fetch_json(&format!("api/titles/{}", id), &params)
            .await?;

        Ok(normalize::map_title_detail(&self.base_url, &response.data))
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    /// List the user's favorites, dropping dangling entries whose title
    /// relation is gone
    pub async fn fetch_favorites(&self) -> Result<Vec<FavoriteItem>> {
        let user = self.current_user().await?;
        let user_id = user.id.to_string();
        let params = [
            ("filters[user][id][$eq]", user_id.as_str()),
            ("populate[title]", "*"),
            ("sort", "updatedAt:desc"),
        ];

        let response: Envelope<Vec<Entity<FavoriteAttributes>>> =
            self.fetch_json("api/favorites", &params).await?;

        Ok(response.data.iter().filter_map(normalize::map_favorite).collect())
    }

    /// Find the user's favorite for one title, if any
    pub async fn fetch_favorite_for_title(&self, title_id: i64) -> Result<Option<FavoriteItem>> {
        let user = self.current_user().await?;
        let user_id = user.id.to_string();
        let title_id = title_id.to_string();
        let params = [
            ("filters[user][id][$eq]", user_id.as_str()),
            ("filters[title][id][$eq]", title_id.as_str()),
            ("populate[title]", "*"),
        ];

        let response: Envelope<Vec<Entity<FavoriteAttributes>>> =
            self.fetch_json("api/favorites", &params).await?;

        Ok(response.data.first().and_then(normalize::map_favorite))
    }

    /// Save a title to the user's list
    pub async fn add_favorite(&self, title_id: i64) -> Result<FavoriteItem> {
        let user = self.current_user().await?;
        let payload = Data {
            data: FavoritePayload {
                title: title_id,
                user: user.id,
            },
        };

        let response: Envelope<Entity<FavoriteAttributes>> =
            self.post_json("api/favorites", &payload).await?;

        normalize::map_favorite(&response.data).ok_or(Error::InvalidResponse)
    }

    /// Remove a favorite by the favorite record's own identifier
    pub async fn remove_favorite(&self, favorite_id: i64) -> Result<()> {
        self.delete(&format!("api/favorites/{}", favorite_id)).await
    }

    // ========================================================================
    // Watch progress
    // ========================================================================

    /// Fetch the user's most recent progress record for one watch target
    pub async fn fetch_progress_entry(
        &self,
        target: WatchTarget,
    ) -> Result<Option<RemoteProgress>> {
        let user = self.current_user().await?;
        let user_id = user.id.to_string();
        let target_id = target.id().to_string();

        let target_filter = match target {
            WatchTarget::Title(_) => "filters[title][id][$eq]",
            WatchTarget::Episode(_) => "filters[episode][id][$eq]",
        };
        let params = [
            ("filters[user][id][$eq]", user_id.as_str()),
            (target_filter, target_id.as_str()),
            ("sort", "updatedAt:desc"),
        ];

        let response: Envelope<Vec<Entity<ProgressAttributes>>> =
            self.fetch_json("api/progresses", &params).await?;

        Ok(response.data.first().map(normalize::map_remote_progress))
    }

    /// List the user's unfinished progress entries for the continue-watching
    /// rail, most recently watched first
    pub async fn fetch_continue_watching(&self, limit: usize) -> Result<Vec<ContinueEntry>> {
        let user = self.current_user().await?;
        let user_id = user.id.to_string();
        let page_size = limit.to_string();
        let params = [
            ("filters[user][id][$eq]", user_id.as_str()),
            ("filters[completed][$eq]", "false"),
            ("sort", "lastWatchedAt:desc"),
            ("populate[title]", "*"),
            ("populate[episode][populate][season][populate][title]", "*"),
            ("pagination[pageSize]", page_size.as_str()),
        ];

        let response: Envelope<Vec<Entity<ProgressAttributes>>> =
            self.fetch_json("api/progresses", &params).await?;

        Ok(response
            .data
            .iter()
            .filter_map(normalize::map_continue_entry)
            .collect())
    }

    /// Create or update the server-side progress record for a watch target.
    ///
    /// A request carrying a record id updates that record in place; otherwise
    /// a new record is created.
    pub async fn save_progress(&self, request: SaveProgressRequest) -> Result<RemoteProgress> {
        let user = self.current_user().await?;

        let (title, episode) = match request.target {
            WatchTarget::Title(id) => (Some(id), None),
            WatchTarget::Episode(id) => (None, Some(id)),
        };
        let payload = Data {
            data: ProgressPayload {
                progress_seconds: request.progress_seconds,
                duration_seconds: request.duration_seconds,
                completed: request.completed,
                last_watched_at: Utc::now(),
                user: user.id,
                title,
                episode,
            },
        };

        let response: Envelope<Entity<ProgressAttributes>> = match request.progress_id {
            Some(id) => {
                self.put_json(&format!("api/progresses/{}", id), &payload)
                    .await?
            }
            None => self.post_json("api/progresses", &payload).await?,
        };

        Ok(normalize::map_remote_progress(&response.data))
    }
}

fn request_error(status: StatusCode, body: String) -> Error {
    let message = if body.is_empty() {
        format!("Request failed ({})", status.as_u16())
    } else {
        body
    };
    Error::Request {
        status: status.as_u16(),
        message,
    }
}

/// Mine the service's error envelope for a display message, preferring
/// `error.message` over a top-level `message`
fn login_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(serde_json::Value::as_str)
        .filter(|message| !message.is_empty())
        .or_else(|| {
            value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .filter(|message| !message.is_empty())
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStorage;

    fn client() -> CmsClient {
        let config = Config::new("http://cms.example.com").unwrap();
        let session = SessionStore::open(Arc::new(MemoryStorage::new()));
        CmsClient::new(&config, session).unwrap()
    }

    #[test]
    fn test_build_url_joins_path_under_base() {
        let client = client();
        let url = client.build_url("api/titles", &[]).unwrap();
        assert_eq!(url.as_str(), "http://cms.example.com/api/titles");
    }

    #[test]
    fn test_build_url_strips_leading_slash() {
        let client = client();
        let url = client.build_url("/api/titles", &[]).unwrap();
        assert_eq!(url.as_str(), "http://cms.example.com/api/titles");
    }

    #[test]
    fn test_build_url_encodes_query_params() {
        let client = client();
        let url = client
            .build_url(
                "api/titles",
                &[("populate[poster]", "*"), ("sort", "updatedAt:desc")],
            )
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://cms.example.com/api/titles?populate%5Bposter%5D=*&sort=updatedAt%3Adesc"
        );
    }

    #[tokio::test]
    async fn test_current_user_without_token_fails_before_any_request() {
        let client = client();
        let result = client.current_user().await;
        assert!(matches!(result, Err(Error::AuthRequired)));
    }

    #[tokio::test]
    async fn test_login_with_blank_credentials_fails_fast() {
        let client = client();
        assert!(matches!(
            client.login("", "secret").await,
            Err(Error::MissingCredentials)
        ));
        assert!(matches!(
            client.login("name@example.com", "").await,
            Err(Error::MissingCredentials)
        ));
    }

    #[test]
    fn test_login_error_message_prefers_error_envelope() {
        let body = r#"{ "error": { "status": 400, "message": "Invalid identifier or password" } }"#;
        assert_eq!(
            login_error_message(body).as_deref(),
            Some("Invalid identifier or password")
        );
    }

    #[test]
    fn test_login_error_message_falls_back_to_top_level() {
        let body = r#"{ "message": "Service indisponible" }"#;
        assert_eq!(login_error_message(body).as_deref(), Some("Service indisponible"));
    }

    #[test]
    fn test_login_error_message_none_for_garbage() {
        assert_eq!(login_error_message("<html>boom</html>"), None);
        assert_eq!(login_error_message(r#"{ "error": {} }"#), None);
    }

    #[test]
    fn test_request_error_uses_body_text() {
        let err = request_error(StatusCode::FORBIDDEN, "Forbidden by policy".to_string());
        match err {
            Error::Request { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Forbidden by policy");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_request_error_falls_back_to_generic_message() {
        let err = request_error(StatusCode::NOT_FOUND, String::new());
        match err {
            Error::Request { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Request failed (404)");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
