use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::app::ports::CatalogPort;
use crate::config::DiscogsConfig;
use crate::domain::ReleaseMetadata;
use crate::error::{LookupError, Result};

/// Discogs release lookup over HTTPS
pub struct DiscogsCatalog {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl DiscogsCatalog {
    pub fn new(config: &DiscogsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        })
    }

    fn release_url(&self, release_id: &str) -> String {
        format!("{}/releases/{}", self.base_url, urlencoding::encode(release_id))
    }
}

#[async_trait]
impl CatalogPort for DiscogsCatalog {
    async fn fetch_release(
        &self,
        release_id: &str,
        credential: &str,
    ) -> std::result::Result<ReleaseMetadata, LookupError> {
        let url = self.release_url(release_id);
        debug!(%url, "Fetching release");

        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Discogs token={}", credential))
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::RateLimited);
        }
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        parse_release(&body)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReleaseResponse {
    artists: Vec<Named>,
    title: Option<String>,
    labels: Vec<Named>,
    formats: Vec<Named>,
    community: Option<Community>,
    year: Option<i32>,
    genres: Vec<String>,
    images: Vec<Image>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Named {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Community {
    rating: Option<Rating>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Rating {
    average: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Image {
    uri: String,
}

/// Decode a release body; anything undecodable is a permanent failure
pub fn parse_release(body: &[u8]) -> std::result::Result<ReleaseMetadata, LookupError> {
    let data: ReleaseResponse =
        serde_json::from_slice(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

    Ok(ReleaseMetadata {
        artists: data.artists.into_iter().map(|a| a.name).collect(),
        title: data.title,
        labels: data.labels.into_iter().map(|l| l.name).collect(),
        formats: data.formats.into_iter().map(|f| f.name).collect(),
        rating: data.community.and_then(|c| c.rating).and_then(|r| r.average),
        year: data.year,
        genres: data.genres,
        images: data.images.into_iter().map(|i| i.uri).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_body() {
        let body = br#"{
            "id": 249504,
            "title": "Never Gonna Give You Up",
            "year": 1987,
            "artists": [{"name": "Rick Astley", "id": 72872}],
            "labels": [{"name": "RCA", "catno": "PB 41447"}],
            "formats": [{"name": "Vinyl", "qty": "1", "descriptions": ["7\""]}],
            "community": {"rating": {"count": 91, "average": 3.42}},
            "genres": ["Electronic", "Pop"],
            "images": [{"type": "primary", "uri": "https://i.discogs.com/a.jpg"}]
        }"#;

        let release = parse_release(body).unwrap();
        assert_eq!(release.artists, vec!["Rick Astley"]);
        assert_eq!(release.title.as_deref(), Some("Never Gonna Give You Up"));
        assert_eq!(release.labels, vec!["RCA"]);
        assert_eq!(release.formats, vec!["Vinyl"]);
        assert_eq!(release.rating, Some(3.42));
        assert_eq!(release.year, Some(1987));
        assert_eq!(release.genres, vec!["Electronic", "Pop"]);
        assert_eq!(release.images, vec!["https://i.discogs.com/a.jpg"]);
    }

    #[test]
    fn test_parse_sparse_release() {
        let release = parse_release(br#"{"title": "Untitled"}"#).unwrap();
        assert!(release.artists.is_empty());
        assert!(release.images.is_empty());
        assert_eq!(release.rating, None);
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            parse_release(b"<html>oops</html>"),
            Err(LookupError::Malformed(_))
        ));
    }

    #[test]
    fn test_release_url_trims_trailing_slash() {
        let catalog = DiscogsCatalog::new(&DiscogsConfig {
            base_url: "http://localhost:8080/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(catalog.release_url("42"), "http://localhost:8080/releases/42");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let catalog = DiscogsCatalog::new(&DiscogsConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_seconds: 2,
            ..Default::default()
        })
        .unwrap();
        let result = catalog.fetch_release("1", "token").await;
        assert!(matches!(result, Err(LookupError::Transport(_))));
    }
}
