use thiserror::Error;

/// Unified error type for the entire portfolio-notion-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local ───────────────────────────────────────────────────────
    /// A record failed local validation. No remote call was made.
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// A required setting is missing or invalid. Raised before any data call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Operation cancelled")]
    Cancelled,

    // ── Remote ──────────────────────────────────────────────────────
    /// The store received the request and refused its content
    /// (malformed property, invalid select option, bad id, ...).
    #[error("Remote store rejected the request ({status} {code}): {message}")]
    RemoteRejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Record not found: {0}")]
    NotFound(String),

    /// The store could not be reached, or kept failing after all retries.
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// A single transport failure (timeout, connection reset). Retried.
    #[error("Network error: {0}")]
    Network(String),

    // ── Encoding ────────────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl CoreError {
    /// Shorthand for a field-level validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether a retry of the same request could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            CoreError::Network(_) | CoreError::RemoteUnavailable(_) => true,
            CoreError::RemoteRejected { status, .. } => is_transient_status(*status),
            _ => false,
        }
    }

    /// Message suitable for showing to the person using the dashboard.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Validation { field, message } => {
                format!("Please check '{field}': {message}")
            }
            CoreError::Configuration(msg) => format!("Notion is not configured: {msg}"),
            CoreError::NotFound(_) => {
                "This record no longer exists. Refresh the list and try again.".to_string()
            }
            CoreError::RemoteUnavailable(_) | CoreError::Network(_) => {
                "Notion is temporarily unavailable, try again.".to_string()
            }
            CoreError::RemoteRejected { message, .. } => format!("Notion rejected the change: {message}"),
            CoreError::Cancelled => "The operation was cancelled.".to_string(),
            CoreError::Serialization(_) | CoreError::Deserialization(_) => {
                "Notion returned data that could not be read.".to_string()
            }
        }
    }
}

/// HTTP statuses worth retrying: timeouts, rate limiting and server errors.
#[must_use]
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; keep query strings out of logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
