use crate::config::Configuration;
use crate::error::{ConsoleError, Result};
use crate::http::{server_message, HttpClient};
use reqwest::header::ACCEPT;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbEpisode {
    pub episode_number: i64,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub runtime: Option<i64>,
    pub still_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSeason {
    pub season_number: Option<i64>,
    pub name: Option<String>,
    pub episodes: Option<Vec<TmdbEpisode>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSeasonSummary {
    pub season_number: i64,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbShow {
    pub name: Option<String>,
    #[serde(default)]
    pub seasons: Vec<TmdbSeasonSummary>,
}

/// TMDB v3 client. Requests carry a v4 bearer token; a 401 is retried once
/// with the legacy `api_key` query parameter.
#[derive(Clone)]
pub struct TmdbClient {
    http: HttpClient,
    base_url: String,
    language: String,
    token: Option<String>,
    api_key: Option<String>,
}

impl TmdbClient {
    /// `token_override` (from the saved session) wins over `tmdb.token`.
    pub fn from_config(
        http: HttpClient,
        config: &Configuration,
        token_override: Option<String>,
    ) -> Result<Self> {
        let tmdb = config.tmdb.clone().unwrap_or_default();
        let token = token_override.or(tmdb.token).filter(|t| !t.trim().is_empty());
        let api_key = tmdb.api_key.filter(|k| !k.trim().is_empty());
        if token.is_none() && api_key.is_none() {
            return Err(ConsoleError::Config(
                "tmdb.token or tmdb.apiKey is required for imports".into(),
            ));
        }

        Ok(Self {
            http,
            base_url: config.tmdb_base_url()?,
            language: config.tmdb_language(),
            token,
            api_key,
        })
    }

    /// Episodes of one season, e.g. `/tv/1396/season/2`.
    #[instrument(skip(self))]
    pub async fn season(&self, tmdb_id: &str, season_number: i64) -> Result<Vec<TmdbEpisode>> {
        let path = format!(
            "/tv/{}/season/{}",
            urlencoding::encode(tmdb_id.trim()),
            season_number
        );
        let season: TmdbSeason = self.get_json(&path).await?;
        let episodes = season.episodes.ok_or_else(|| {
            ConsoleError::Validation(format!(
                "TMDB returned no episodes for show {tmdb_id} season {season_number}"
            ))
        })?;
        info!("TMDB returned {} episodes", episodes.len());
        Ok(episodes)
    }

    /// Show details with its season list.
    #[instrument(skip(self))]
    pub async fn show(&self, tmdb_id: &str) -> Result<TmdbShow> {
        let path = format!("/tv/{}", urlencoding::encode(tmdb_id.trim()));
        let show: TmdbShow = self.get_json(&path).await?;
        info!("TMDB returned {} seasons", show.seasons.len());
        Ok(show)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ConsoleError::Config(format!("bad TMDB url for {path}: {e}")))?;
        url.query_pairs_mut().append_pair("language", &self.language);

        let response = match &self.token {
            Some(token) => {
                let response = self.send(url.clone(), Some(token)).await?;
                if response.status() == StatusCode::UNAUTHORIZED {
                    warn!("TMDB rejected the bearer token, retrying with api_key");
                    self.send_legacy(&url).await?
                } else {
                    response
                }
            }
            None => self.send_legacy(&url).await?,
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ConsoleError::Unauthorized {
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ConsoleError::Status {
                status,
                url: url.to_string(),
                message: server_message(&String::from_utf8_lossy(&body)),
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_legacy(&self, url: &Url) -> Result<Response> {
        let key = self
            .api_key
            .as_ref()
            .or(self.token.as_ref())
            .map(String::as_str)
            .unwrap_or_default();
        let mut legacy = url.clone();
        legacy.query_pairs_mut().append_pair("api_key", key);
        self.send(legacy, None).await
    }

    async fn send(&self, url: Url, bearer: Option<&str>) -> Result<Response> {
        debug!("TMDB GET {} (bearer: {})", url.path(), bearer.is_some());
        let mut request = self
            .http
            .request(Method::GET, url.as_str())
            .header(ACCEPT, "application/json");
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }
}
