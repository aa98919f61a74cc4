use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Jar state as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JarSnapshot {
    pub amount: u64,
    pub history: Vec<String>,
}

/// Failure talking to the jar API.
#[derive(Debug)]
pub enum ClientError {
    Http(reqwest::Error),
    /// Non-2xx response with the server's `error` message.
    Status { status: StatusCode, message: String },
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Http(e) => write!(f, "HTTP error: {}", e),
            ClientError::Status { status, message } => {
                write!(f, "jar API returned {}: {}", status, message)
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct JarClient {
    client: Client,
    base_url: String,
}

impl JarClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Current amount and recent history.
    pub async fn state(&self) -> Result<JarSnapshot, ClientError> {
        let resp = self.client.get(self.jar_url()).send().await?;
        Self::decode(resp).await
    }

    /// Add $1 to the jar.
    pub async fn add(&self) -> Result<JarSnapshot, ClientError> {
        self.action("add").await
    }

    /// Reset the jar to $0.
    pub async fn reset(&self) -> Result<JarSnapshot, ClientError> {
        self.action("reset").await
    }

    /// Send an arbitrary action name, including ones the server rejects.
    pub async fn action(&self, action: &str) -> Result<JarSnapshot, ClientError> {
        let resp = self
            .client
            .post(self.jar_url())
            .json(&json!({ "action": action }))
            .send()
            .await?;
        Self::decode(resp).await
    }

    fn jar_url(&self) -> String {
        format!("{}/api/jar", self.base_url)
    }

    async fn decode(resp: reqwest::Response) -> Result<JarSnapshot, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await?;
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(ClientError::Status { status, message });
        }
        Ok(resp.json().await?)
    }
}
