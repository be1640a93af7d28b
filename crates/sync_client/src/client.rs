use api_types::sync::{SyncRequest, SyncResponse};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::error::{AppError, ClientError, Result};

/// Which sync endpoint a batch goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Finance,
    Content,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Finance => "admin/finance/sync",
            Self::Content => "admin/sync",
        }
    }
}

/// What the replayer needs from the server.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn send(
        &self,
        endpoint: Endpoint,
        request: &SyncRequest,
    ) -> std::result::Result<SyncResponse, ClientError>;

    /// True when the server answers its health probe.
    async fn probe(&self) -> bool;
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    username: String,
    password: String,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|err| AppError::BaseUrl(err.to_string()))?;
        Ok(Self {
            base_url,
            username: username.to_string(),
            password: password.to_string(),
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))
    }
}

#[async_trait]
impl SyncTransport for HttpTransport {
    async fn send(
        &self,
        endpoint: Endpoint,
        request: &SyncRequest,
    ) -> std::result::Result<SyncResponse, ClientError> {
        let url = self.endpoint(endpoint.path())?;
        let res = self
            .http
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .json(request)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res
                .json::<SyncResponse>()
                .await
                .map_err(ClientError::Transport);
        }

        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|err| err.error.or(err.message))
            .unwrap_or_else(|| "unknown error".to_string());

        let err = match status.as_u16() {
            401 => ClientError::Unauthorized,
            400 | 422 => ClientError::Rejected(body),
            _ => ClientError::Server(body),
        };
        Err(err)
    }

    async fn probe(&self) -> bool {
        let Ok(url) = self.endpoint("health") else {
            return false;
        };
        match self.http.get(url).send().await {
            Ok(res) => res.status().is_success(),
            Err(err) => {
                tracing::debug!("health probe failed: {err}");
                false
            }
        }
    }
}
