use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Client;

use crate::config::{AppConfig, NOTION_API_KEY, NOTION_VERSION};
use crate::errors::CoreError;

use super::traits::{ApiRequest, ApiResponse, Method, NotionTransport};

/// `reqwest`-backed transport for the Notion REST API.
///
/// Authorization and version headers are set once on the client, so a
/// request only carries its method, path and JSON body.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &AppConfig) -> Result<Self, CoreError> {
        if config.notion_api_key.is_empty() {
            return Err(CoreError::Configuration(format!("{NOTION_API_KEY} is not set")));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.notion_api_key))
            .map_err(|_| {
                CoreError::Configuration(format!(
                    "{NOTION_API_KEY} contains characters that are not allowed in a header"
                ))
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoreError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl NotionTransport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, CoreError> {
        let url = format!("{}{}", self.base_url, request.path);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64);
        let body = response.text().await?;

        debug!("Notion {} {} -> HTTP {}", request.method, request.path, status);

        Ok(ApiResponse {
            status,
            body,
            retry_after,
        })
    }
}
