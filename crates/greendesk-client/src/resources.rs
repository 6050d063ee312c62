//! Wire types for the backend's non-quota resources, and the query builders
//! for list endpoints.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use greendesk_core::{Law, Month, Pagination, Quarter, ViewMode};
use serde::{Deserialize, Serialize};

/// Query string pairs for a list request.
pub type QueryParams = Vec<(&'static str, String)>;

// ── Envelope ──

/// Paged list envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(alias = "results", alias = "data")]
    pub items: Vec<T>,
    #[serde(alias = "count")]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn first_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

impl<T> Page<T> {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size, self.total)
    }
}

// ── Quotas ──

/// Filters for `GET /api/quotas`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaQuery {
    pub year: Option<i32>,
    pub month: Option<Month>,
    pub quarter: Option<Quarter>,
    pub law: Option<Law>,
}

impl QuotaQuery {
    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn params(&self) -> QueryParams {
        let mut q = QueryParams::new();
        if let Some(y) = self.year {
            q.push(("year", y.to_string()));
        }
        if let Some(m) = self.month {
            q.push(("month", m.number().to_string()));
        }
        if let Some(qt) = self.quarter {
            q.push(("quarter", qt.number().to_string()));
        }
        if let Some(l) = self.law {
            q.push(("law", l.code().to_string()));
        }
        q
    }
}

// ── Establishments ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Establishment {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub proponent: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub laws: Vec<Law>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body for creating or updating an establishment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstablishmentInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proponent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    pub laws: Vec<Law>,
}

/// Filters for `GET /api/establishments`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EstablishmentQuery {
    pub search: Option<String>,
    pub law: Option<Law>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl EstablishmentQuery {
    pub fn params(&self) -> QueryParams {
        let mut q = QueryParams::new();
        if let Some(s) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            q.push(("search", s.to_string()));
        }
        if let Some(l) = self.law {
            q.push(("law", l.code().to_string()));
        }
        if let Some(p) = self.page {
            q.push(("page", p.to_string()));
        }
        if let Some(s) = self.page_size {
            q.push(("pageSize", s.to_string()));
        }
        q
    }
}

// ── Billing ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingStatus {
    Paid,
    Unpaid,
    Partial,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingRecord {
    pub id: u64,
    pub establishment_id: u64,
    #[serde(default)]
    pub establishment_name: Option<String>,
    pub law: Law,
    pub year: i32,
    pub month: Month,
    pub amount: f64,
    pub status: BillingStatus,
}

impl BillingRecord {
    pub fn quarter(&self) -> Quarter {
        self.month.quarter()
    }
}

/// Filters for `GET /api/billing`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BillingQuery {
    pub year: Option<i32>,
    pub quarter: Option<Quarter>,
    pub month: Option<Month>,
    pub law: Option<Law>,
    pub view_mode: Option<ViewMode>,
}

impl BillingQuery {
    pub fn params(&self) -> QueryParams {
        let mut q = QuotaQuery {
            year: self.year,
            month: self.month,
            quarter: self.quarter,
            law: self.law,
        }
        .params();
        if let Some(v) = self.view_mode {
            q.push(("viewMode", v.as_str().to_string()));
        }
        q
    }
}

// ── Audit log ──

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

// ── Reports ──

/// One law's target and accomplishment for a period.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRow {
    pub law: Law,
    /// Month number in monthly view, quarter number in quarterly view.
    pub period: u8,
    pub target: u32,
    pub accomplished: u32,
}

impl ComplianceRow {
    /// Accomplished over target; `None` when no target was set.
    pub fn ratio(&self) -> Option<f64> {
        (self.target > 0).then(|| self.accomplished as f64 / self.target as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub year: i32,
    pub view_mode: ViewMode,
    #[serde(default)]
    pub rows: Vec<ComplianceRow>,
}

impl ComplianceReport {
    /// (target, accomplished) totals per law.
    pub fn totals_by_law(&self) -> BTreeMap<Law, (u64, u64)> {
        let mut totals: BTreeMap<Law, (u64, u64)> = BTreeMap::new();
        for row in &self.rows {
            let entry = totals.entry(row.law).or_default();
            entry.0 += row.target as u64;
            entry.1 += row.accomplished as u64;
        }
        totals
    }
}

// ── Backups ──

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub id: u64,
    pub file_name: String,
    #[serde(default)]
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

// ── System configuration ──

/// Key/value system settings.
pub type SystemConfig = BTreeMap<String, serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_query_params() {
        let q = QuotaQuery {
            year: Some(2025),
            month: None,
            quarter: Some(Quarter::Q2),
            law: Some(Law::Ra9275),
        };
        assert_eq!(
            q.params(),
            vec![
                ("year", "2025".to_string()),
                ("quarter", "2".to_string()),
                ("law", "RA-9275".to_string()),
            ]
        );
    }

    #[test]
    fn billing_query_adds_view_mode() {
        let q = BillingQuery {
            year: Some(2025),
            view_mode: Some(ViewMode::Quarterly),
            ..Default::default()
        };
        assert_eq!(
            q.params(),
            vec![
                ("year", "2025".to_string()),
                ("viewMode", "quarterly".to_string()),
            ]
        );
    }

    #[test]
    fn blank_search_omitted() {
        let q = EstablishmentQuery {
            search: Some("   ".into()),
            page: Some(2),
            ..Default::default()
        };
        assert_eq!(q.params(), vec![("page", "2".to_string())]);
    }

    #[test]
    fn page_accepts_aliases() {
        let json = r#"{"results": [{"id": 1, "name": "Acme Rendering"}], "count": 41}"#;
        let page: Page<Establishment> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.items[0].laws.is_empty());
        assert_eq!(page.pagination().total_pages(), 3);
    }

    #[test]
    fn billing_unknown_status() {
        let json = r#"{
            "id": 3, "establishmentId": 9, "law": "RA-8749", "year": 2025,
            "month": 5, "amount": 1500.0, "status": "waived"
        }"#;
        let rec: BillingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.status, BillingStatus::Unknown);
        assert_eq!(rec.quarter(), Quarter::Q2);
    }

    #[test]
    fn compliance_totals_and_ratio() {
        let report = ComplianceReport {
            year: 2025,
            view_mode: ViewMode::Quarterly,
            rows: vec![
                ComplianceRow { law: Law::Pd1586, period: 1, target: 10, accomplished: 5 },
                ComplianceRow { law: Law::Pd1586, period: 2, target: 10, accomplished: 12 },
                ComplianceRow { law: Law::Ra6969, period: 1, target: 0, accomplished: 2 },
            ],
        };
        assert_eq!(report.totals_by_law()[&Law::Pd1586], (20, 17));
        assert_eq!(report.rows[0].ratio(), Some(0.5));
        assert_eq!(report.rows[2].ratio(), None);
    }
}
