use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("session expired, log in again")]
    SessionExpired,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("token store: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid base url: {0}")]
    BaseUrl(String),
}

impl ClientError {
    /// Human readable message for API errors, taken from the `{"error","detail","field"}` body.
    pub fn api_message(&self) -> Option<String> {
        let ClientError::Api { body, .. } = self else { return None };
        let v: serde_json::Value = serde_json::from_str(body).ok()?;
        let error = v.get("error")?.as_str()?;
        let mut msg = match v.get("detail").and_then(|d| d.as_str()) {
            Some(detail) => format!("{error}: {detail}"),
            None => error.to_string(),
        };
        if let Some(field) = v.get("field").and_then(|f| f.as_str()) {
            msg.push_str(&format!(" (field: {field})"));
        }
        Some(msg)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
