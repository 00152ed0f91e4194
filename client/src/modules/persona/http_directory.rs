use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{PersonaDirectoryPort, PersonaError, PersonaListResponse};

/// HTTP 人格目录
pub struct HttpPersonaDirectory {
    client: Client,
    url: String,
}

impl HttpPersonaDirectory {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PersonaError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PersonaError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PersonaDirectoryPort for HttpPersonaDirectory {
    async fn fetch(&self) -> Result<PersonaListResponse, PersonaError> {
        debug!("[HttpPersonaDirectory] GET {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PersonaError::Transport(e.to_string()))?;

        response
            .json::<PersonaListResponse>()
            .await
            .map_err(|e| PersonaError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_http::serve_once;

    #[tokio::test]
    async fn test_fetch_personas() {
        let (url, server) = serve_once(
            "/api/personas",
            "200 OK",
            r#"{"status":"success","personas":[{"id":"warm_partner","name":"暖心伴侣（女友）","emoji":"💕"}]}"#,
        )
        .await;

        let directory = HttpPersonaDirectory::new(url, Duration::from_secs(5)).unwrap();
        let response = directory.fetch().await.unwrap();
        assert!(response.is_success());
        assert_eq!(response.personas[0].id, "warm_partner");

        assert!(server.await.unwrap().starts_with("GET /api/personas"));
    }

    #[tokio::test]
    async fn test_fetch_invalid_body() {
        let (url, _server) = serve_once("/api/personas", "200 OK", "not json").await;

        let directory = HttpPersonaDirectory::new(url, Duration::from_secs(5)).unwrap();
        assert!(matches!(
            directory.fetch().await,
            Err(PersonaError::Decode(_))
        ));
    }
}
