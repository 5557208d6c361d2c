use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::errors::CoreError;
use crate::models::budget::{MonthSnapshot, PocketsSnapshot};
use crate::models::expense::{Expense, NewExpense};
use crate::models::income::{AdditionalIncome, NewIncome};
use crate::models::month::MonthKey;
use crate::models::transfer::{NewTransfer, Transfer};
use super::traits::LedgerBackend;

const BACKEND_NAME: &str = "HTTP ledger";

/// REST client for the ledger backend.
///
/// - Every request is bounded by `request_timeout_secs`; a timeout surfaces
///   as [`CoreError::Timeout`] and nothing is committed.
/// - Responses are normalized once here: both `{success, data, error}`
///   envelopes and bare payloads decode into the same `Result`.
/// - Writes carry a fresh `x-request-id` so server logs can be correlated.
pub struct HttpLedgerBackend {
    client: Client,
    base_url: String,
    timeout_secs: u64,
    auth_token: Option<String>,
}

impl HttpLedgerBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        let client = builder
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
            timeout_secs: config.request_timeout_secs,
            auth_token: config.auth_token.clone(),
        })
    }

    /// Full URL for an endpoint path such as `/budget/2025/3`.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn transport_error(&self, endpoint: &str, e: reqwest::Error) -> CoreError {
        if e.is_timeout() {
            CoreError::Timeout {
                endpoint: endpoint.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            CoreError::from(e)
        }
    }

    async fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<String, CoreError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        if status == StatusCode::NOT_FOUND {
            return Err(CoreError::NotFound(endpoint.to_string()));
        }
        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });
            warn!(endpoint, status = status.as_u16(), %message, "backend rejected request");
            return Err(CoreError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CoreError> {
        let request = self.client.get(self.endpoint_url(path));
        let body = self.send(request, path).await?;
        decode_envelope(path, &body)
    }

    async fn write_json<B, T>(
        &self,
        method: reqwest::Method,
        path: &str,
        payload: &B,
    ) -> Result<T, CoreError>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(payload)
            .map_err(|e| CoreError::Serialization(format!("{path}: {e}")))?;
        let request_id = Uuid::new_v4();
        debug!(%method, path, %request_id, "sending write");
        let request = self
            .client
            .request(method, self.endpoint_url(path))
            .header("x-request-id", request_id.to_string())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload);
        let body = self.send(request, path).await?;
        decode_envelope(path, &body)
    }

    async fn delete(&self, path: &str) -> Result<(), CoreError> {
        let request_id = Uuid::new_v4();
        debug!(path, %request_id, "sending delete");
        let request = self
            .client
            .delete(self.endpoint_url(path))
            .header("x-request-id", request_id.to_string());
        let body = self.send(request, path).await?;
        check_ack(path, &body)
    }
}

// ── Response normalization ──────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiEnvelope<T> {
    Wrapped {
        success: bool,
        data: Option<T>,
        error: Option<String>,
    },
    Bare(T),
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Decode a success body, accepting both the wrapped and the bare shape.
pub fn decode_envelope<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, CoreError> {
    let envelope: ApiEnvelope<T> = serde_json::from_str(body).map_err(|e| CoreError::Api {
        endpoint: endpoint.to_string(),
        message: format!("Failed to parse response: {e}"),
    })?;

    match envelope {
        ApiEnvelope::Bare(data) => Ok(data),
        ApiEnvelope::Wrapped {
            success: true,
            data: Some(data),
            ..
        } => Ok(data),
        ApiEnvelope::Wrapped {
            success: true,
            data: None,
            ..
        } => Err(CoreError::Api {
            endpoint: endpoint.to_string(),
            message: "Response marked successful but carried no data".into(),
        }),
        ApiEnvelope::Wrapped {
            success: false,
            error,
            ..
        } => Err(CoreError::Api {
            endpoint: endpoint.to_string(),
            message: error.unwrap_or_else(|| "Request was not successful".into()),
        }),
    }
}

/// Check a body that only acknowledges success (deletes, archival).
/// An empty body counts as success.
pub fn check_ack(endpoint: &str, body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) if value.get("success").and_then(|s| s.as_bool()) == Some(false) => {
            Err(CoreError::Api {
                endpoint: endpoint.to_string(),
                message: error_message(body)
                    .unwrap_or_else(|| "Request was not successful".into()),
            })
        }
        _ => Ok(()),
    }
}

fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.error.or(parsed.message)
}

fn month_path(resource: &str, month: MonthKey) -> String {
    format!("/{resource}/{}/{}", month.year(), month.month())
}

fn entry_path(resource: &str, month: MonthKey, id: &str) -> String {
    format!("{}/{id}", month_path(resource, month))
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl LedgerBackend for HttpLedgerBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    #[instrument(skip_all, fields(month = %month))]
    async fn fetch_budget(&self, month: MonthKey) -> Result<MonthSnapshot, CoreError> {
        self.get_json(&month_path("budget", month)).await
    }

    #[instrument(skip_all, fields(month = %month))]
    async fn fetch_pockets(&self, month: MonthKey) -> Result<PocketsSnapshot, CoreError> {
        self.get_json(&month_path("pockets", month)).await
    }

    async fn create_expense(
        &self,
        month: MonthKey,
        expense: &NewExpense,
    ) -> Result<Expense, CoreError> {
        self.write_json(reqwest::Method::POST, &month_path("expenses", month), expense)
            .await
    }

    async fn update_expense(
        &self,
        month: MonthKey,
        id: &str,
        expense: &NewExpense,
    ) -> Result<Expense, CoreError> {
        self.write_json(reqwest::Method::PUT, &entry_path("expenses", month, id), expense)
            .await
    }

    async fn delete_expense(&self, month: MonthKey, id: &str) -> Result<(), CoreError> {
        self.delete(&entry_path("expenses", month, id)).await
    }

    async fn create_income(
        &self,
        month: MonthKey,
        income: &NewIncome,
    ) -> Result<AdditionalIncome, CoreError> {
        self.write_json(
            reqwest::Method::POST,
            &month_path("additional-income", month),
            income,
        )
        .await
    }

    async fn update_income(
        &self,
        month: MonthKey,
        id: &str,
        income: &NewIncome,
    ) -> Result<AdditionalIncome, CoreError> {
        self.write_json(
            reqwest::Method::PUT,
            &entry_path("additional-income", month, id),
            income,
        )
        .await
    }

    async fn delete_income(&self, month: MonthKey, id: &str) -> Result<(), CoreError> {
        self.delete(&entry_path("additional-income", month, id)).await
    }

    async fn create_transfer(
        &self,
        month: MonthKey,
        transfer: &NewTransfer,
    ) -> Result<Transfer, CoreError> {
        self.write_json(reqwest::Method::POST, &month_path("transfers", month), transfer)
            .await
    }

    async fn archive_pocket(&self, pocket_id: &str) -> Result<(), CoreError> {
        let path = format!("/pockets/{pocket_id}/archive");
        let request_id = Uuid::new_v4();
        debug!(path = %path, %request_id, "archiving pocket");
        let request = self
            .client
            .post(self.endpoint_url(&path))
            .header("x-request-id", request_id.to_string());
        let body = self.send(request, &path).await?;
        check_ack(&path, &body)
    }
}
