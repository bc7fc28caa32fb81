//! JSON transport to the password service and its typed facade.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{
    domain::GenerationOptions,
    error::ApiErrorBody,
    protocol::{
        endpoints, AnalysisResult, AnalyzeRequest, AnalyzeResponse, BulkGenerationRequest,
        BulkGenerationResponse, EntropyEstimate, GenerationRequest, GenerationResult, HealthStatus,
    },
};
use tracing::{debug, warn};

use crate::error::ServiceError;

/// Sole path to the remote service. Every controller goes through this.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
    ) -> Result<Value, ServiceError>;
}

pub struct HttpTransport {
    http: Client,
    api_root: String,
}

impl HttpTransport {
    pub fn new(api_root: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_root)
    }

    pub fn with_client(http: Client, api_root: impl Into<String>) -> Self {
        let api_root = api_root.into().trim_end_matches('/').to_string();
        Self { http, api_root }
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
    ) -> Result<Value, ServiceError> {
        let url = format!("{}{}", self.api_root, endpoint);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(endpoint, %method, error = %err, "password service unreachable");
                return Err(ServiceError::transport());
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(endpoint, status = status.as_u16(), error = %err, "failed to read response body");
                return Err(ServiceError::transport());
            }
        };
        let parsed = serde_json::from_slice::<Value>(&bytes);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|value| serde_json::from_value::<ApiErrorBody>(value).ok())
                .unwrap_or_default()
                .message_or_generic();
            warn!(endpoint, status = status.as_u16(), %message, "password service returned an error");
            return Err(ServiceError::status(status.as_u16(), message));
        }

        debug!(endpoint, status = status.as_u16(), "password service call succeeded");
        parsed.map_err(|err| {
            warn!(endpoint, error = %err, "password service returned a non-JSON body");
            ServiceError::malformed(format!("invalid response from {endpoint}"))
        })
    }
}

/// Typed view of the service contract on top of a [`Transport`].
#[derive(Clone)]
pub struct PasswordServiceApi {
    transport: Arc<dyn Transport>,
}

impl PasswordServiceApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn analyze(&self, password: &str) -> Result<AnalysisResult, ServiceError> {
        let body = AnalyzeRequest {
            password: password.to_string(),
        };
        let response: AnalyzeResponse = self.post(endpoints::ANALYZE, &body).await?;
        Ok(response.analysis)
    }

    pub async fn calculate_entropy(
        &self,
        length: u32,
        options: GenerationOptions,
    ) -> Result<EntropyEstimate, ServiceError> {
        self.post(
            endpoints::ENTROPY_CALCULATE,
            &GenerationRequest { length, options },
        )
        .await
    }

    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, ServiceError> {
        self.post(endpoints::GENERATE, &request).await
    }

    pub async fn generate_bulk(
        &self,
        request: BulkGenerationRequest,
    ) -> Result<Vec<String>, ServiceError> {
        let response: BulkGenerationResponse =
            self.post(endpoints::GENERATE_BULK, &request).await?;
        Ok(response.passwords)
    }

    pub async fn health(&self) -> Result<HealthStatus, ServiceError> {
        let value = self
            .transport
            .call(endpoints::HEALTH, Method::GET, None)
            .await?;
        decode(endpoints::HEALTH, value)
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)
            .map_err(|err| ServiceError::malformed(format!("failed to encode request: {err}")))?;
        let value = self.transport.call(endpoint, Method::POST, Some(body)).await?;
        decode(endpoint, value)
    }
}

fn decode<R: DeserializeOwned>(endpoint: &str, value: Value) -> Result<R, ServiceError> {
    serde_json::from_value(value).map_err(|err| {
        warn!(endpoint, error = %err, "unexpected response shape");
        ServiceError::malformed(format!("unexpected response from {endpoint}"))
    })
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
