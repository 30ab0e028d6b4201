use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::Value;
use tracing::error;

use crate::{config::Config, Error, Result};

pub mod posts_repo;

/// Client for the remote JSON document store. Documents live at
/// `{base}/{path}.json`; a missing key answers `null` rather than an HTTP
/// error. Every call is bounded by the configured timeout and is made
/// at most once — no retries.
#[derive(Clone)]
pub struct FirebaseStore {
    http: Client,
    base_url: String,
    auth_token: String,
}

impl FirebaseStore {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.store_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.store_url.trim_end_matches('/').to_string(),
            auth_token: config.store_auth.clone(),
        })
    }

    fn document_url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_start_matches('/'))
    }

    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let mut request = self.http.request(method, self.document_url(path));

        if !self.auth_token.is_empty() {
            request = request.query(&[("auth", self.auth_token.as_str())]);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let data: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if !status.is_success() {
            let detail = data
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string);
            if status.is_client_error() {
                error!("document store rejected {path}: {status} {detail:?}");
                return Err(Error::BadRequest(detail.unwrap_or_else(|| {
                    "The document store rejected the request.".to_string()
                })));
            }
            error!("document store failed for {path}: {status} {detail:?}");
            return Err(Error::UpstreamFailure(
                "The document store returned an error.".to_string(),
            ));
        }

        Ok(data)
    }

    pub async fn get_document(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    pub async fn put_document(&self, path: &str, document: &Value) -> Result<Value> {
        self.request(Method::PUT, path, Some(document)).await
    }

    pub async fn delete_document(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, None).await.map(|_| ())
    }
}
