use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client, Method,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::error::RemoteError;

/// Most list endpoints wrap their payload as `{"data": ...}`; a few
/// (nursing services, provider lookups) return it bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}

#[derive(Clone)]
pub struct CaafiClient {
    client: Client,
    base_url: String,
}

impl CaafiClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(config.remote_timeout())
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.caaficare_api_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<&Value>) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url).headers(self.get_headers());

        if let Some(body_data) = body {
            req = req.json(body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("API error ({}): {}", status, text);
            return Err(RemoteError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str::<T>(&text)?)
    }

    /// GET and unwrap the `{"data": ...}` envelope when present.
    pub async fn get_data<T>(&self, path: &str) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
    {
        let envelope: Envelope<T> = self.request(Method::GET, path, None).await?;
        Ok(envelope.into_inner())
    }

    pub async fn post<T>(&self, path: &str, body: &Value) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
