//! Shared HTTP plumbing for web-based chemical sources.

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::throttle::RequestThrottle;
use crate::ports::SourceError;

const USER_AGENT: &str = concat!("scanalyze/", env!("CARGO_PKG_VERSION"));

/// Connection settings for one HTTP source.
///
/// `timeout` bounds each request from the moment it leaves the throttle.
/// Requests to one source queue behind each other at `min_interval` plus
/// jitter, so a lookup that needs several requests while other lookups are
/// queued can wait far longer than `timeout` in total.
#[derive(Debug, Clone)]
pub struct HttpSourceSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub min_interval: Duration,
    pub jitter_min: Duration,
    pub jitter_max: Duration,
}

impl HttpSourceSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            min_interval: Duration::from_secs(1),
            jitter_min: Duration::from_millis(100),
            jitter_max: Duration::from_millis(300),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn with_jitter(mut self, min: Duration, max: Duration) -> Self {
        self.jitter_min = min;
        self.jitter_max = max;
        self
    }
}

/// Throttled HTTP client that maps transport failures to [`SourceError`].
#[derive(Debug)]
pub struct HttpSourceClient {
    client: Client,
    throttle: RequestThrottle,
    settings: HttpSourceSettings,
}

impl HttpSourceClient {
    pub fn new(settings: HttpSourceSettings) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SourceError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        let throttle =
            RequestThrottle::new(settings.min_interval, settings.jitter_min, settings.jitter_max);

        Ok(Self {
            client,
            throttle,
            settings,
        })
    }

    pub fn settings(&self) -> &HttpSourceSettings {
        &self.settings
    }

    /// Builds `<base_url>/<segments...>`, percent-encoding each segment.
    pub fn url(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = Url::parse(self.settings.base_url.trim_end_matches('/'))
            .map_err(|e| SourceError::Parse(format!("invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Parse("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GETs and decodes JSON. `Ok(None)` on 404.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, SourceError> {
        let Some(response) = self.get(url, query).await? else {
            return Ok(None);
        };
        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| SourceError::Parse(e.to_string()))
    }

    /// GETs a text body. `Ok(None)` on 404.
    pub async fn get_text(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<Option<String>, SourceError> {
        let Some(response) = self.get(url, query).await? else {
            return Ok(None);
        };
        response
            .text()
            .await
            .map(Some)
            .map_err(|e| self.map_transport_error(e))
    }

    async fn get(&self, url: Url, query: &[(&str, &str)]) -> Result<Option<Response>, SourceError> {
        self.throttle.acquire().await;

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http_error(status, &body));
        }
        Ok(Some(response))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout(self.settings.timeout)
        } else if e.is_connect() {
            SourceError::Unavailable(format!("connection failed: {}", e))
        } else if e.is_decode() {
            SourceError::Parse(e.to_string())
        } else {
            SourceError::Unavailable(e.to_string())
        }
    }
}

fn http_error(status: StatusCode, body: &str) -> SourceError {
    let message = body
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(200).collect::<String>())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
    SourceError::Http {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpSourceClient {
        HttpSourceClient::new(HttpSourceSettings::new(base)).unwrap()
    }

    #[test]
    fn url_encodes_segments() {
        let url = client("https://pubchem.ncbi.nlm.nih.gov/rest/pug/")
            .url(&["compound", "name", "sodium lauryl/sulfate", "cids", "JSON"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://pubchem.ncbi.nlm.nih.gov/rest/pug/compound/name/sodium%20lauryl%2Fsulfate/cids/JSON"
        );
    }

    #[test]
    fn invalid_base_url_is_parse_error() {
        let err = client("not a url").url(&["x"]).unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn http_error_uses_first_body_line() {
        let err = http_error(StatusCode::SERVICE_UNAVAILABLE, "\n  Service busy  \nretry later");
        assert_eq!(
            err,
            SourceError::Http {
                status: 503,
                message: "Service busy".to_string()
            }
        );

        let err = http_error(StatusCode::BAD_REQUEST, "");
        assert_eq!(
            err,
            SourceError::Http {
                status: 400,
                message: "Bad Request".to_string()
            }
        );
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_unavailable_or_timeout() {
        let settings = HttpSourceSettings::new("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2))
            .with_min_interval(Duration::ZERO);
        let client = HttpSourceClient::new(settings).unwrap();
        let url = client.url(&["anything"]).unwrap();

        let err = client.get_text(url, &[]).await.unwrap_err();
        assert!(
            matches!(err, SourceError::Unavailable(_) | SourceError::Timeout(_)),
            "got {:?}",
            err
        );
    }
}
