//! Quota form state: selected quarter, months and laws, the per-(month, law)
//! target inputs, and validation.
//!
//! Targets are held as the raw text the operator entered so that a blank field
//! stays blank rather than turning into zero. Selecting a month or law seeds
//! each new (month, law) field from the quota already on file, if any.
//! Deselecting a law clears its targets across every selected month, and
//! deselecting a month clears all of its targets.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::{Availability, Law, Month, NewQuota, Quarter};

/// Rejected form operations. Validation problems are reported separately
/// through [`ValidationErrors`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("quota records for {0} have not loaded yet")]
    Pending(i32),

    #[error("{0} is not available for new quotas")]
    QuarterUnavailable(Quarter),

    #[error("select a quarter first")]
    NoQuarter,

    #[error("{month} is not in {quarter}")]
    MonthOutsideQuarter { month: Month, quarter: Quarter },

    #[error("{month} is not available for new quotas ({state})")]
    MonthUnavailable { month: Month, state: &'static str },

    #[error("{law} for {month} is not selected")]
    NotSelected { month: Month, law: Law },

    #[error("records are for {actual}, but the form is for {expected}")]
    YearMismatch { expected: i32, actual: i32 },
}

/// Field path -> message. Paths are `months`, `laws`, and `targets.<month>.<law>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.insert(path.into(), message.into());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, msg) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{path}: {msg}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validation field path for one target input.
pub fn target_path(month: Month, law: Law) -> String {
    format!("targets.{}.{}", month.number(), law.code())
}

/// An existing quota whose target changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaUpdate {
    pub id: u64,
    pub quota: NewQuota,
}

/// What a valid form turns into: new quotas to bulk-create and existing ones to update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub creates: Vec<NewQuota>,
    pub updates: Vec<QuotaUpdate>,
    /// Selected combinations whose target matches the record on file.
    pub unchanged: usize,
}

impl Submission {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty()
    }
}

/// State of one quota form session.
#[derive(Debug, Clone)]
pub struct QuotaForm {
    availability: Availability,
    quarter: Option<Quarter>,
    months: BTreeSet<Month>,
    laws: BTreeSet<Law>,
    targets: BTreeMap<Month, BTreeMap<Law, String>>,
}

impl QuotaForm {
    pub fn new(availability: Availability) -> Self {
        Self {
            availability,
            quarter: None,
            months: BTreeSet::new(),
            laws: BTreeSet::new(),
            targets: BTreeMap::new(),
        }
    }

    pub fn year(&self) -> i32 {
        self.availability.year()
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    pub fn quarter(&self) -> Option<Quarter> {
        self.quarter
    }

    pub fn selected_months(&self) -> impl Iterator<Item = Month> + '_ {
        self.months.iter().copied()
    }

    pub fn selected_laws(&self) -> impl Iterator<Item = Law> + '_ {
        self.laws.iter().copied()
    }

    pub fn is_month_selected(&self, month: Month) -> bool {
        self.months.contains(&month)
    }

    pub fn is_law_selected(&self, law: Law) -> bool {
        self.laws.contains(&law)
    }

    pub fn target_input(&self, month: Month, law: Law) -> Option<&str> {
        self.targets.get(&month)?.get(&law).map(String::as_str)
    }

    /// Pick the quarter to work in. Clears selected months and their targets.
    pub fn select_quarter(&mut self, quarter: Quarter) -> Result<(), FormError> {
        if !self.availability.is_loaded() {
            return Err(FormError::Pending(self.year()));
        }
        let status = self.availability.quarter_status(quarter);
        if status.is_hidden() || status.open_months.is_empty() {
            return Err(FormError::QuarterUnavailable(quarter));
        }
        if self.quarter != Some(quarter) {
            self.months.clear();
            self.targets.clear();
            self.quarter = Some(quarter);
        }
        Ok(())
    }

    /// Toggle a month. Returns whether it is selected afterwards.
    pub fn toggle_month(&mut self, month: Month) -> Result<bool, FormError> {
        if self.months.remove(&month) {
            self.targets.remove(&month);
            return Ok(false);
        }

        let quarter = self.quarter.ok_or(FormError::NoQuarter)?;
        if !quarter.contains(month) {
            return Err(FormError::MonthOutsideQuarter { month, quarter });
        }
        let state = self.availability.month_state(month);
        if !state.is_selectable() {
            return Err(FormError::MonthUnavailable {
                month,
                state: state.label(),
            });
        }

        self.months.insert(month);
        let laws: Vec<Law> = self.laws.iter().copied().collect();
        for law in laws {
            self.seed(month, law);
        }
        Ok(true)
    }

    /// Toggle a law. Returns whether it is selected afterwards.
    pub fn toggle_law(&mut self, law: Law) -> bool {
        if self.laws.remove(&law) {
            for fields in self.targets.values_mut() {
                fields.remove(&law);
            }
            return false;
        }

        self.laws.insert(law);
        let months: Vec<Month> = self.months.iter().copied().collect();
        for month in months {
            self.seed(month, law);
        }
        true
    }

    /// Set the raw input for one target field.
    pub fn set_target(
        &mut self,
        month: Month,
        law: Law,
        input: impl Into<String>,
    ) -> Result<(), FormError> {
        if !self.months.contains(&month) || !self.laws.contains(&law) {
            return Err(FormError::NotSelected { month, law });
        }
        self.targets
            .entry(month)
            .or_default()
            .insert(law, input.into());
        Ok(())
    }

    /// Swap in a fresh availability snapshot for the same year.
    ///
    /// If the selected quarter is no longer available the selection is cleared
    /// entirely. Otherwise months that are no longer selectable are dropped
    /// with their targets. Blank targets of the remaining selection are seeded from the new
    /// records; anything the operator typed is kept.
    pub fn replace_availability(&mut self, availability: Availability) -> Result<(), FormError> {
        if availability.year() != self.year() {
            return Err(FormError::YearMismatch {
                expected: self.year(),
                actual: availability.year(),
            });
        }
        self.availability = availability;

        if let Some(quarter) = self.quarter {
            let status = self.availability.quarter_status(quarter);
            if status.is_hidden() || status.open_months.is_empty() {
                debug!(%quarter, "selected quarter is no longer available");
                self.quarter = None;
                self.months.clear();
                self.targets.clear();
                return Ok(());
            }
        }

        let dropped: Vec<Month> = self
            .months
            .iter()
            .copied()
            .filter(|m| !self.availability.is_month_selectable(*m))
            .collect();
        for month in &dropped {
            self.months.remove(month);
            self.targets.remove(month);
        }
        if !dropped.is_empty() {
            debug!(count = dropped.len(), "dropped months that are no longer selectable");
        }

        let pairs: Vec<(Month, Law)> = self
            .months
            .iter()
            .flat_map(|m| self.laws.iter().map(move |l| (*m, *l)))
            .collect();
        for (month, law) in pairs {
            let blank = self
                .target_input(month, law)
                .is_none_or(|s| s.trim().is_empty());
            if blank {
                self.seed(month, law);
            }
        }
        Ok(())
    }

    /// Every problem that would block submission.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        if self.months.is_empty() {
            errors.insert("months", "Select at least one month");
        }
        if self.laws.is_empty() {
            errors.insert("laws", "Select at least one law");
        }
        for month in &self.months {
            for law in &self.laws {
                if let Err(msg) = parse_target(self.target_input(*month, *law).unwrap_or("")) {
                    errors.insert(target_path(*month, *law), msg);
                }
            }
        }
        errors
    }

    /// Plan the writes for a valid form.
    pub fn submission(&self) -> Result<Submission, ValidationErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut plan = Submission::default();
        for month in &self.months {
            for law in &self.laws {
                let target = parse_target(self.target_input(*month, *law).unwrap_or(""))
                    .map_err(|msg| {
                        let mut e = ValidationErrors::default();
                        e.insert(target_path(*month, *law), msg);
                        e
                    })?;
                let quota = NewQuota {
                    law: *law,
                    year: self.year(),
                    month: *month,
                    target,
                };
                match self.availability.existing_record(*month, *law) {
                    None => plan.creates.push(quota),
                    Some(rec) if rec.target != target => plan.updates.push(QuotaUpdate {
                        id: rec.id,
                        quota,
                    }),
                    Some(_) => plan.unchanged += 1,
                }
            }
        }
        Ok(plan)
    }

    fn seed(&mut self, month: Month, law: Law) {
        let value = self
            .availability
            .existing_target(month, law)
            .map(|t| t.to_string())
            .unwrap_or_default();
        self.targets.entry(month).or_default().insert(law, value);
    }
}

fn parse_target(input: &str) -> Result<u32, &'static str> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Target is required");
    }
    let n: i64 = input.parse().map_err(|_| "Target must be a whole number")?;
    if n <= 0 {
        return Err("Target must be greater than zero");
    }
    u32::try_from(n).map_err(|_| "Target is too large")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{QuotaRecord, YearMonth};

    fn m(n: u8) -> Month {
        Month::new(n).unwrap()
    }

    fn rec(id: u64, law: Law, month: u8, target: u32) -> QuotaRecord {
        QuotaRecord {
            id,
            law,
            year: 2025,
            month: m(month),
            target,
            auto_adjusted: false,
        }
    }

    fn form_with(records: &[QuotaRecord]) -> QuotaForm {
        let today = YearMonth::new(2025, m(1));
        QuotaForm::new(Availability::from_records(2025, today, records))
    }

    #[test]
    fn empty_target_blocks_submission() {
        let mut form = form_with(&[]);
        form.select_quarter(Quarter::Q1).unwrap();
        form.toggle_month(m(2)).unwrap();
        form.toggle_law(Law::Ra9275);

        let errors = form.submission().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("targets.2.RA-9275"), Some("Target is required"));
    }

    #[test]
    fn non_positive_and_garbage_targets_rejected() {
        let mut form = form_with(&[]);
        form.select_quarter(Quarter::Q1).unwrap();
        form.toggle_month(m(1)).unwrap();
        form.toggle_law(Law::Pd1586);
        form.toggle_law(Law::Ra6969);
        form.set_target(m(1), Law::Pd1586, "0").unwrap();
        form.set_target(m(1), Law::Ra6969, "ten").unwrap();

        let errors = form.validate();
        assert_eq!(
            errors.get("targets.1.PD-1586"),
            Some("Target must be greater than zero")
        );
        assert_eq!(
            errors.get("targets.1.RA-6969"),
            Some("Target must be a whole number")
        );
    }

    #[test]
    fn nothing_selected_reports_months_and_laws() {
        let form = form_with(&[]);
        let errors = form.validate();
        assert!(errors.get("months").is_some());
        assert!(errors.get("laws").is_some());
    }

    #[test]
    fn toggling_law_seeds_from_existing_records() {
        let mut form = form_with(&[rec(1, Law::Pd1586, 1, 8)]);
        form.select_quarter(Quarter::Q1).unwrap();
        form.toggle_month(m(1)).unwrap();
        form.toggle_month(m(2)).unwrap();
        form.toggle_law(Law::Pd1586);

        assert_eq!(form.target_input(m(1), Law::Pd1586), Some("8"));
        assert_eq!(form.target_input(m(2), Law::Pd1586), Some(""));
    }

    #[test]
    fn law_off_and_on_restores_saved_target() {
        let mut form = form_with(&[rec(1, Law::Ra8749, 3, 6)]);
        form.select_quarter(Quarter::Q1).unwrap();
        form.toggle_month(m(3)).unwrap();
        form.toggle_law(Law::Ra8749);
        form.set_target(m(3), Law::Ra8749, "11").unwrap();

        assert!(!form.toggle_law(Law::Ra8749));
        assert_eq!(form.target_input(m(3), Law::Ra8749), None);
        assert!(form.toggle_law(Law::Ra8749));
        assert_eq!(form.target_input(m(3), Law::Ra8749), Some("6"));
    }

    #[test]
    fn deselecting_month_clears_its_targets() {
        let mut form = form_with(&[]);
        form.select_quarter(Quarter::Q2).unwrap();
        form.toggle_law(Law::Ra9003);
        form.toggle_month(m(4)).unwrap();
        form.set_target(m(4), Law::Ra9003, "2").unwrap();

        assert_eq!(form.toggle_month(m(4)), Ok(false));
        assert_eq!(form.target_input(m(4), Law::Ra9003), None);
        assert_eq!(form.toggle_month(m(4)), Ok(true));
        assert_eq!(form.target_input(m(4), Law::Ra9003), Some(""));
    }

    #[test]
    fn month_rules_enforced() {
        let full: Vec<QuotaRecord> = Law::ALL
            .iter()
            .enumerate()
            .map(|(i, law)| rec(i as u64 + 1, *law, 5, 3))
            .collect();
        let mut form = form_with(&full);

        assert_eq!(form.toggle_month(m(4)), Err(FormError::NoQuarter));
        form.select_quarter(Quarter::Q2).unwrap();
        assert_eq!(
            form.toggle_month(m(7)),
            Err(FormError::MonthOutsideQuarter {
                month: m(7),
                quarter: Quarter::Q2
            })
        );
        assert_eq!(
            form.toggle_month(m(5)),
            Err(FormError::MonthUnavailable {
                month: m(5),
                state: "fully set"
            })
        );
    }

    #[test]
    fn past_quarter_cannot_be_selected() {
        let today = YearMonth::new(2025, m(7));
        let mut form = QuotaForm::new(Availability::from_records(2025, today, &[]));
        assert_eq!(
            form.select_quarter(Quarter::Q1),
            Err(FormError::QuarterUnavailable(Quarter::Q1))
        );
    }

    #[test]
    fn pending_form_rejects_selection() {
        let today = YearMonth::new(2025, m(1));
        let mut form = QuotaForm::new(Availability::pending(2025, today));
        assert_eq!(form.select_quarter(Quarter::Q1), Err(FormError::Pending(2025)));
    }

    #[test]
    fn changing_quarter_clears_months() {
        let mut form = form_with(&[]);
        form.select_quarter(Quarter::Q1).unwrap();
        form.toggle_law(Law::Pd1586);
        form.toggle_month(m(1)).unwrap();
        form.select_quarter(Quarter::Q3).unwrap();
        assert_eq!(form.selected_months().count(), 0);
        assert_eq!(form.target_input(m(1), Law::Pd1586), None);
        assert!(form.is_law_selected(Law::Pd1586));
    }

    #[test]
    fn submission_splits_creates_updates_and_unchanged() {
        let mut form = form_with(&[rec(41, Law::Pd1586, 1, 5), rec(42, Law::Ra6969, 1, 7)]);
        form.select_quarter(Quarter::Q1).unwrap();
        form.toggle_month(m(1)).unwrap();
        form.toggle_law(Law::Pd1586);
        form.toggle_law(Law::Ra6969);
        form.toggle_law(Law::Ra9275);
        form.set_target(m(1), Law::Pd1586, "9").unwrap();
        form.set_target(m(1), Law::Ra9275, " 4 ").unwrap();

        let plan = form.submission().unwrap();
        assert_eq!(
            plan.creates,
            vec![NewQuota {
                law: Law::Ra9275,
                year: 2025,
                month: m(1),
                target: 4
            }]
        );
        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].id, 41);
        assert_eq!(plan.updates[0].quota.target, 9);
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn set_target_requires_selection() {
        let mut form = form_with(&[]);
        assert_eq!(
            form.set_target(m(1), Law::Pd1586, "3"),
            Err(FormError::NotSelected {
                month: m(1),
                law: Law::Pd1586
            })
        );
    }

    #[test]
    fn replace_availability_seeds_blanks_and_keeps_input() {
        let today = YearMonth::new(2025, m(1));
        let mut form = QuotaForm::new(Availability::from_records(2025, today, &[]));
        form.select_quarter(Quarter::Q1).unwrap();
        form.toggle_month(m(2)).unwrap();
        form.toggle_law(Law::Pd1586);
        form.toggle_law(Law::Ra6969);
        form.set_target(m(2), Law::Ra6969, "12").unwrap();

        let fresh = Availability::from_records(
            2025,
            today,
            &[rec(5, Law::Pd1586, 2, 3), rec(6, Law::Ra6969, 2, 8)],
        );
        form.replace_availability(fresh).unwrap();
        assert_eq!(form.target_input(m(2), Law::Pd1586), Some("3"));
        assert_eq!(form.target_input(m(2), Law::Ra6969), Some("12"));
    }

    #[test]
    fn replace_availability_drops_months_that_filled_up() {
        let today = YearMonth::new(2025, m(1));
        let mut form = QuotaForm::new(Availability::from_records(2025, today, &[]));
        form.select_quarter(Quarter::Q1).unwrap();
        form.toggle_month(m(1)).unwrap();
        form.toggle_month(m(2)).unwrap();

        let full: Vec<QuotaRecord> = Law::ALL
            .iter()
            .enumerate()
            .map(|(i, law)| rec(i as u64 + 1, *law, 2, 3))
            .collect();
        form.replace_availability(Availability::from_records(2025, today, &full))
            .unwrap();
        assert_eq!(form.selected_months().collect::<Vec<_>>(), vec![m(1)]);
    }

    #[test]
    fn replace_availability_clears_quarter_that_became_past() {
        let mut form = QuotaForm::new(Availability::from_records(
            2025,
            YearMonth::new(2025, m(1)),
            &[],
        ));
        form.select_quarter(Quarter::Q1).unwrap();
        form.toggle_month(m(3)).unwrap();
        form.toggle_law(Law::Ra9003);
        form.set_target(m(3), Law::Ra9003, "2").unwrap();

        let later = YearMonth::new(2025, m(4));
        form.replace_availability(Availability::from_records(2025, later, &[]))
            .unwrap();
        assert_eq!(form.quarter(), None);
        assert_eq!(form.selected_months().count(), 0);
        assert_eq!(form.target_input(m(3), Law::Ra9003), None);
        assert!(form.is_law_selected(Law::Ra9003));
        assert_eq!(form.toggle_month(m(3)), Err(FormError::NoQuarter));
    }

    #[test]
    fn replace_availability_clears_quarter_that_filled_up() {
        let today = YearMonth::new(2025, m(1));
        let mut form = QuotaForm::new(Availability::from_records(2025, today, &[]));
        form.select_quarter(Quarter::Q2).unwrap();
        form.toggle_month(m(5)).unwrap();

        let full: Vec<QuotaRecord> = Quarter::Q2
            .months()
            .into_iter()
            .flat_map(|month| Law::ALL.into_iter().map(move |law| (month, law)))
            .enumerate()
            .map(|(i, (month, law))| rec(i as u64 + 1, law, month.number(), 4))
            .collect();
        form.replace_availability(Availability::from_records(2025, today, &full))
            .unwrap();
        assert_eq!(form.quarter(), None);
        assert_eq!(form.selected_months().count(), 0);
    }

    #[test]
    fn replace_availability_rejects_other_year() {
        let today = YearMonth::new(2025, m(1));
        let mut form = QuotaForm::new(Availability::pending(2025, today));
        let err = form
            .replace_availability(Availability::from_records(2026, today, &[]))
            .unwrap_err();
        assert_eq!(
            err,
            FormError::YearMismatch {
                expected: 2025,
                actual: 2026
            }
        );
    }

    #[test]
    fn validation_errors_display() {
        let form = form_with(&[]);
        let text = form.validate().to_string();
        assert!(text.contains("laws: Select at least one law"));
        assert!(text.contains("months: Select at least one month"));
    }
}
