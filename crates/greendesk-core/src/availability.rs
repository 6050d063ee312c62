//! Quota period availability.
//!
//! Classifies each month and quarter of a year as past, fully set, partially
//! set, or open, given the quota records already on file. An [`Availability`]
//! is an immutable snapshot of (year, today, records): the record index is
//! built once at construction and every classification is derived from it on
//! demand. New data means a new snapshot.
//!
//! Until records have loaded the snapshot is *pending* and nothing is
//! selectable, so a slow or failed fetch never offers a period that might
//! already be set.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{Law, Month, Quarter, QuotaRecord, YearMonth};

/// Classification of a single month, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonthState {
    /// Before the current month. Never selectable.
    Past,
    /// Records not loaded yet. Not selectable.
    Pending,
    /// All five laws have a quota. Not selectable.
    FullySet,
    /// Some but not all laws have a quota. Selectable so gaps can be filled.
    PartiallySet,
    /// No quotas yet.
    Open,
}

impl MonthState {
    pub fn is_selectable(self) -> bool {
        matches!(self, MonthState::PartiallySet | MonthState::Open)
    }

    pub fn label(self) -> &'static str {
        match self {
            MonthState::Past => "past",
            MonthState::Pending => "pending",
            MonthState::FullySet => "fully set",
            MonthState::PartiallySet => "partial",
            MonthState::Open => "open",
        }
    }
}

/// Derived status of one quarter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterStatus {
    pub quarter: Quarter,
    pub past: bool,
    /// Every month in the quarter has all five laws.
    pub fully_set: bool,
    /// Months that can still be selected (not past, not fully set).
    pub open_months: Vec<Month>,
}

impl QuarterStatus {
    /// Hidden from the quarter picker.
    pub fn is_hidden(&self) -> bool {
        self.past || self.fully_set
    }
}

/// Availability snapshot for one year.
#[derive(Debug, Clone)]
pub struct Availability {
    year: i32,
    today: YearMonth,
    index: Option<BTreeMap<Month, BTreeMap<Law, QuotaRecord>>>,
}

impl Availability {
    /// Snapshot for a year whose records have not loaded.
    pub fn pending(year: i32, today: YearMonth) -> Self {
        Self {
            year,
            today,
            index: None,
        }
    }

    /// Snapshot built from the records on file. Records for other years are ignored.
    pub fn from_records(year: i32, today: YearMonth, records: &[QuotaRecord]) -> Self {
        let mut index: BTreeMap<Month, BTreeMap<Law, QuotaRecord>> = BTreeMap::new();
        let mut skipped = 0usize;
        for rec in records {
            if rec.year != year {
                skipped += 1;
                continue;
            }
            if let Some(prev) = index
                .entry(rec.month)
                .or_default()
                .insert(rec.law, rec.clone())
            {
                debug!(
                    law = %rec.law,
                    month = rec.month.number(),
                    replaced = prev.id,
                    "duplicate quota record; keeping the later one"
                );
            }
        }
        if skipped > 0 {
            debug!(year, skipped, "ignored quota records from other years");
        }
        Self {
            year,
            today,
            index: Some(index),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn today(&self) -> YearMonth {
        self.today
    }

    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    pub fn is_quarter_past(&self, quarter: Quarter) -> bool {
        self.today.is_quarter_past(self.year, quarter)
    }

    pub fn is_month_past(&self, month: Month) -> bool {
        self.today.is_month_past(self.year, month)
    }

    /// Laws that already have a quota in `month`, in display order.
    pub fn recorded_laws(&self, month: Month) -> Vec<Law> {
        self.month_records(month)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_month_fully_set(&self, month: Month) -> bool {
        self.month_records(month)
            .is_some_and(|m| Law::ALL.iter().all(|law| m.contains_key(law)))
    }

    pub fn is_month_partially_set(&self, month: Month) -> bool {
        self.month_records(month)
            .is_some_and(|m| !m.is_empty() && m.len() < Law::COUNT)
    }

    pub fn month_state(&self, month: Month) -> MonthState {
        if self.is_month_past(month) {
            return MonthState::Past;
        }
        if !self.is_loaded() {
            return MonthState::Pending;
        }
        if self.is_month_fully_set(month) {
            MonthState::FullySet
        } else if self.is_month_partially_set(month) {
            MonthState::PartiallySet
        } else {
            MonthState::Open
        }
    }

    pub fn is_month_selectable(&self, month: Month) -> bool {
        self.month_state(month).is_selectable()
    }

    pub fn quarter_status(&self, quarter: Quarter) -> QuarterStatus {
        let months = quarter.months();
        QuarterStatus {
            quarter,
            past: self.is_quarter_past(quarter),
            fully_set: self.is_loaded() && months.iter().all(|m| self.is_month_fully_set(*m)),
            open_months: months
                .into_iter()
                .filter(|m| self.is_month_selectable(*m))
                .collect(),
        }
    }

    pub fn is_quarter_hidden(&self, quarter: Quarter) -> bool {
        self.quarter_status(quarter).is_hidden()
    }

    /// Quarters offered in the picker: loaded, not hidden, with at least one open month.
    pub fn selectable_quarters(&self) -> Vec<Quarter> {
        Quarter::ALL
            .into_iter()
            .filter(|q| {
                let status = self.quarter_status(*q);
                !status.is_hidden() && !status.open_months.is_empty()
            })
            .collect()
    }

    pub fn existing_record(&self, month: Month, law: Law) -> Option<&QuotaRecord> {
        self.month_records(month)?.get(&law)
    }

    pub fn existing_target(&self, month: Month, law: Law) -> Option<u32> {
        self.existing_record(month, law).map(|r| r.target)
    }

    fn month_records(&self, month: Month) -> Option<&BTreeMap<Law, QuotaRecord>> {
        self.index.as_ref()?.get(&month)
    }
}
