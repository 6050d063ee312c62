//! Quota records as stored by the backend, and the write payloads sent to it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Law, Month, Quarter};

/// An inspection target for one law in one month. Unique per (law, year, month).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "QuotaRecordWire")]
pub struct QuotaRecord {
    pub id: u64,
    pub law: Law,
    pub year: i32,
    pub month: Month,
    pub target: u32,
    pub auto_adjusted: bool,
}

impl QuotaRecord {
    pub fn quarter(&self) -> Quarter {
        self.month.quarter()
    }
}

/// Backend shape of a quota record. Some endpoints still send the redundant
/// `quarter` column; it is checked against the month and then dropped.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuotaRecordWire {
    id: u64,
    law: Law,
    year: i32,
    month: Month,
    #[serde(default)]
    quarter: Option<u8>,
    target: u32,
    #[serde(default, alias = "auto_adjusted")]
    auto_adjusted: bool,
}

impl From<QuotaRecordWire> for QuotaRecord {
    fn from(w: QuotaRecordWire) -> Self {
        if let Some(q) = w.quarter
            && q != w.month.quarter().number()
        {
            warn!(
                id = w.id,
                month = w.month.number(),
                quarter = q,
                "quota record quarter disagrees with month; using month"
            );
        }
        Self {
            id: w.id,
            law: w.law,
            year: w.year,
            month: w.month,
            target: w.target,
            auto_adjusted: w.auto_adjusted,
        }
    }
}

/// A quota to create or update. Serialises as [`QuotaPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "QuotaPayload")]
pub struct NewQuota {
    pub law: Law,
    pub year: i32,
    pub month: Month,
    pub target: u32,
}

/// Wire body for quota writes: `{law, year, month, quarter, target}`.
///
/// `quarter` is always computed from `month`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPayload {
    pub law: Law,
    pub year: i32,
    pub month: Month,
    pub quarter: Quarter,
    pub target: u32,
}

impl From<NewQuota> for QuotaPayload {
    fn from(q: NewQuota) -> Self {
        Self {
            law: q.law,
            year: q.year,
            month: q.month,
            quarter: q.month.quarter(),
            target: q.target,
        }
    }
}
