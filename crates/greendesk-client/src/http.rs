//! HTTP client for the compliance backend.
//!
//! Every call is single-shot: no retry, no backoff. Non-2xx responses come
//! back as [`ClientError::Server`] with the body text so the caller can show it.

use std::time::Duration;

use greendesk_core::{NewQuota, QuotaRecord, ViewMode};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::ClientConfig;
use crate::resources::{
    AuditLogEntry, Backup, BillingQuery, BillingRecord, ComplianceReport, Establishment,
    EstablishmentInput, EstablishmentQuery, Page, QueryParams, QuotaQuery, SystemConfig,
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status for server-side failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Typed client for the backend's REST endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ClientError::Config("api token is not a valid header value".into()))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Quotas ──

    /// `GET /api/quotas`
    pub async fn list_quotas(&self, query: &QuotaQuery) -> Result<Vec<QuotaRecord>, ClientError> {
        let records: Vec<QuotaRecord> = self.get("/api/quotas", &query.params()).await?;
        info!(count = records.len(), "fetched quota records");
        Ok(records)
    }

    /// `POST /api/quotas/bulk` with `[{law, year, month, quarter, target}, ...]`.
    pub async fn create_quotas(&self, quotas: &[NewQuota]) -> Result<Vec<QuotaRecord>, ClientError> {
        let created: Vec<QuotaRecord> = self
            .send(Method::POST, "/api/quotas/bulk", quotas)
            .await?;
        info!(requested = quotas.len(), created = created.len(), "created quotas");
        Ok(created)
    }

    /// `PUT /api/quotas/{id}`
    pub async fn update_quota(&self, id: u64, quota: &NewQuota) -> Result<QuotaRecord, ClientError> {
        self.send(Method::PUT, &format!("/api/quotas/{id}"), quota)
            .await
    }

    // ── Establishments ──

    /// `GET /api/establishments`
    pub async fn list_establishments(
        &self,
        query: &EstablishmentQuery,
    ) -> Result<Page<Establishment>, ClientError> {
        self.get("/api/establishments", &query.params()).await
    }

    /// `GET /api/establishments/{id}`
    pub async fn get_establishment(&self, id: u64) -> Result<Establishment, ClientError> {
        self.get(&format!("/api/establishments/{id}"), &[]).await
    }

    /// `POST /api/establishments`
    pub async fn create_establishment(
        &self,
        input: &EstablishmentInput,
    ) -> Result<Establishment, ClientError> {
        self.send(Method::POST, "/api/establishments", input).await
    }

    /// `PUT /api/establishments/{id}`
    pub async fn update_establishment(
        &self,
        id: u64,
        input: &EstablishmentInput,
    ) -> Result<Establishment, ClientError> {
        self.send(Method::PUT, &format!("/api/establishments/{id}"), input)
            .await
    }

    // ── Billing, audit, reports ──

    /// `GET /api/billing`
    pub async fn list_billing(&self, query: &BillingQuery) -> Result<Vec<BillingRecord>, ClientError> {
        self.get("/api/billing", &query.params()).await
    }

    /// `GET /api/audit-logs`
    pub async fn list_audit_logs(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Page<AuditLogEntry>, ClientError> {
        let params: QueryParams = vec![
            ("page", page.max(1).to_string()),
            ("pageSize", page_size.max(1).to_string()),
        ];
        self.get("/api/audit-logs", &params).await
    }

    /// `GET /api/reports/compliance`
    pub async fn compliance_report(
        &self,
        year: i32,
        view_mode: ViewMode,
    ) -> Result<ComplianceReport, ClientError> {
        let params: QueryParams = vec![
            ("year", year.to_string()),
            ("viewMode", view_mode.as_str().to_string()),
        ];
        self.get("/api/reports/compliance", &params).await
    }

    // ── Backups ──

    /// `GET /api/backups`
    pub async fn list_backups(&self) -> Result<Vec<Backup>, ClientError> {
        self.get("/api/backups", &[]).await
    }

    /// `POST /api/backups`
    pub async fn create_backup(&self) -> Result<Backup, ClientError> {
        self.send(Method::POST, "/api/backups", &serde_json::json!({}))
            .await
    }

    // ── System configuration ──

    /// `GET /api/system-config`
    pub async fn get_system_config(&self) -> Result<SystemConfig, ClientError> {
        self.get("/api/system-config", &[]).await
    }

    /// `PUT /api/system-config`
    pub async fn update_system_config(
        &self,
        config: &SystemConfig,
    ) -> Result<SystemConfig, ClientError> {
        self.send(Method::PUT, "/api/system-config", config).await
    }

    // ── Plumbing ──

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, params = ?params, "GET");
        let resp = self.client.get(&url).query(params).send().await?;
        Self::decode(resp).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, method = %method, "sending");
        let resp = self.client.request(method, &url).json(body).send().await?;
        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                status: status.as_u16(),
                body,
            });
        }
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
