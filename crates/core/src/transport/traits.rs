use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::errors::CoreError;
use crate::schema::page::ErrorBody;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Patch => write!(f, "PATCH"),
        }
    }
}

/// One call against the store API, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path starting with '/', e.g. `/pages/{id}`.
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Patch,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Status and raw body of a store response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    /// Parsed `Retry-After` header, sent with 429 responses.
    pub retry_after: Option<Duration>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode a successful body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, CoreError> {
        serde_json::from_str(&self.body).map_err(|e| {
            CoreError::Deserialization(format!("Unexpected response body (HTTP {}): {e}", self.status))
        })
    }

    /// Decode the store's error envelope, falling back to a body preview.
    #[must_use]
    pub fn error_body(&self) -> ErrorBody {
        serde_json::from_str::<ErrorBody>(&self.body).unwrap_or_else(|_| ErrorBody {
            code: String::new(),
            message: self.body.chars().take(200).collect(),
        })
    }
}

/// Trait abstraction over the wire to the document store.
///
/// `HttpTransport` talks to the real API; tests plug in scripted doubles.
/// Implementations return `Ok` for every HTTP response, whatever its status,
/// and `Err(CoreError::Network)` only when no response arrived.
#[async_trait]
pub trait NotionTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, CoreError>;
}
