use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::Serialize;

use crate::domain::diff::ChangeSummary;
use crate::error::{AppError, AppResult};
use crate::services::ExplanationService;

/// Posts change summaries to a self-hosted explanation endpoint and passes the
/// response body through untouched.
pub struct EndpointClient {
    http: Client,
    url: Option<String>,
}

impl EndpointClient {
    pub fn new(url: Option<String>) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }
}

#[derive(Serialize)]
struct ExplainRequest<'a> {
    changes: &'a [ChangeSummary],
}

#[async_trait]
impl ExplanationService for EndpointClient {
    async fn explain(&self, changes: &[ChangeSummary]) -> AppResult<String> {
        let url = self.url.as_deref().ok_or_else(|| {
            AppError::Configuration("explanation endpoint not configured".to_string())
        })?;

        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&ExplainRequest { changes })
            .send()
            .await
            .map_err(|err| AppError::ExplanationService(format!("failed to call {url}: {err}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            AppError::ExplanationService(format!("failed to read response from {url}: {err}"))
        })?;
        if !status.is_success() {
            return Err(AppError::ExplanationService(format!(
                "{url} responded with {status}: {body}"
            )));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::test_server::serve_once;

    #[tokio::test]
    async fn posts_changes_and_returns_raw_body() {
        let (url, server) = serve_once("200 OK", "not even json".to_string()).await;
        let client = EndpointClient::new(Some(format!("{url}/explain")));
        let changes = vec![ChangeSummary {
            file_name: "a.rs".to_string(),
            added: vec!["x".to_string()],
            removed: vec!["y".to_string()],
        }];

        let body = client.explain(&changes).await.expect("explanation");
        assert_eq!(body, "not even json");

        let request = server.await.expect("server");
        assert!(request.starts_with("POST /explain "));
        assert!(request.contains(r#"{"changes":[{"fileName":"a.rs","added":["x"],"removed":["y"]}]}"#));
    }

    #[tokio::test]
    async fn server_errors_surface_as_service_errors() {
        let (url, _server) = serve_once("500 Internal Server Error", "down".to_string()).await;
        let client = EndpointClient::new(Some(url));
        let err = client.explain(&[]).await.expect_err("should fail");
        assert!(err.to_string().contains("down"));
    }

    #[tokio::test]
    async fn requires_configured_url() {
        assert!(matches!(
            EndpointClient::new(None).explain(&[]).await,
            Err(AppError::Configuration(_))
        ));
    }
}
