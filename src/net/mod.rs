//! Tunnel backend HTTP API client

pub mod acquire;

pub use acquire::{acquire, AcquireError, AcquiredTunnel};

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Client for the tunnel backend's HTTP endpoints
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// Session registration request body
#[derive(Debug, Serialize)]
struct InitRequest<'a> {
    name: &'a str,
    complexity: u32,
}

/// Session registration response
#[derive(Debug, Deserialize)]
struct InitResponse {
    id: String,
}

/// Chunk retrieval response
#[derive(Debug, Deserialize)]
struct ChunkResponse {
    chunk: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Register a session; returns the opaque session identifier
    pub async fn register_session(
        &self,
        name: &str,
        complexity: u32,
    ) -> Result<String, ApiError> {
        let url = format!("{}/init", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&InitRequest { name, complexity })
            .send()
            .await
            .map_err(ApiError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let init: InitResponse = response.json().await.map_err(ApiError::Parse)?;
        Ok(init.id)
    }

    /// Retrieve one tunnel-descriptor chunk for a registered session
    pub async fn fetch_chunk(
        &self,
        session_id: &str,
        chunk_no: u32,
    ) -> Result<String, ApiError> {
        let url = format!("{}/token/{}?id={}", self.base_url, chunk_no, session_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chunk: ChunkResponse = response.json().await.map_err(ApiError::Parse)?;
        Ok(chunk.chunk)
    }
}

/// Backend API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(reqwest::Error),
}
