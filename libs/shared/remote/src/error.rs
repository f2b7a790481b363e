use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RemoteError {
    /// Error text the CaafiCare API put in its `{"error": "..."}` body, if any.
    pub fn server_message(&self) -> Option<String> {
        match self {
            RemoteError::Api { body, .. } => serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .filter(|msg| !msg.trim().is_empty()),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Api { status, .. } => Some(*status),
            RemoteError::Transport(e) => e.status().map(|s| s.as_u16()),
            RemoteError::Decode(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_from_json_body() {
        let err = RemoteError::Api {
            status: 409,
            body: r#"{"success":false,"error":"Slot no longer available"}"#.to_string(),
        };
        assert_eq!(err.server_message().as_deref(), Some("Slot no longer available"));
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_server_message_absent_for_plain_text() {
        let err = RemoteError::Api {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(err.server_message(), None);
    }
}
