use async_trait::async_trait;
use tracing::debug;

use super::PicksSource;
use crate::error::{AppError, Result};

pub struct PicksPageClient {
    client: reqwest::Client,
    url: String,
}

impl PicksPageClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl PicksSource for PicksPageClient {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_page(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Scrape(format!(
                "picks page {} returned {status}",
                self.url
            )));
        }
        let body = response.text().await?;
        debug!(url = %self.url, bytes = body.len(), "Fetched picks page");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::Html, routing::get, Router};

    use super::*;
    use crate::testutil::spawn_stub;

    #[tokio::test]
    async fn returns_page_body() {
        let base = spawn_stub(Router::new().route(
            "/picks",
            get(|| async { Html("<div class=\"pick-card\"></div>") }),
        ))
        .await;
        let client = PicksPageClient::new(reqwest::Client::new(), format!("{base}/picks"));

        let body = client.fetch_page().await.unwrap();
        assert!(body.contains("pick-card"));
        assert!(client.url().ends_with("/picks"));
    }

    #[tokio::test]
    async fn error_status_is_scrape_error() {
        let base = spawn_stub(Router::new().route(
            "/picks",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;
        let client = PicksPageClient::new(reqwest::Client::new(), format!("{base}/picks"));

        assert!(matches!(client.fetch_page().await, Err(AppError::Scrape(_))));
    }
}
