//! Quota commands: availability, listing, and setting targets through the form.

use std::str::FromStr;

use anyhow::{Context, bail};
use greendesk_client::resources::QuotaQuery;
use greendesk_client::{ApiClient, Fetched, Notifier, QuotaLoader};
use greendesk_core::{Availability, Law, Month, Quarter, QuotaForm, YearMonth};
use tracing::info;

use crate::display;

/// One `--target MONTH:LAW=N` argument. `N` is kept raw so the form can
/// report blank or non-numeric input the same way it would for typed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetArg {
    pub month: Month,
    pub law: Law,
    pub value: String,
}

impl FromStr for TargetArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected MONTH:LAW=N, got {s:?}"))?;
        let (month, law) = key
            .split_once(':')
            .ok_or_else(|| format!("expected MONTH:LAW=N, got {s:?}"))?;
        Ok(Self {
            month: month.parse().map_err(|e| format!("{e}"))?,
            law: law.parse().map_err(|e| format!("{e}"))?,
            value: value.to_string(),
        })
    }
}

pub struct SetRequest {
    pub year: i32,
    pub quarter: Quarter,
    pub months: Vec<Month>,
    pub laws: Vec<Law>,
    pub targets: Vec<TargetArg>,
    pub dry_run: bool,
}

/// Load a year's availability, failing if the load was superseded or errored.
async fn load_availability(client: &ApiClient, year: i32) -> anyhow::Result<Availability> {
    let loader = QuotaLoader::new(client.clone());
    info!(year, "loading quota records");
    match loader
        .load(year, YearMonth::now())
        .await
        .with_context(|| format!("loading quota records for {year}"))?
    {
        Fetched::Current(avail) => Ok(avail),
        Fetched::Stale => bail!("quota load for {year} was superseded"),
    }
}

pub async fn run_status(
    client: &ApiClient,
    notifier: &Notifier,
    year: i32,
    quarter: Option<Quarter>,
) -> anyhow::Result<()> {
    let avail = match load_availability(client, year).await {
        Ok(a) => a,
        Err(e) => {
            notifier.error(format!("Could not load quotas: {e:#}"));
            // Render the pending grid so nothing is shown as open.
            display::print_availability(&Availability::pending(year, YearMonth::now()), quarter);
            return Err(e);
        }
    };
    display::print_availability(&avail, quarter);
    Ok(())
}

pub async fn run_list(
    client: &ApiClient,
    notifier: &Notifier,
    query: QuotaQuery,
) -> anyhow::Result<()> {
    match client.list_quotas(&query).await {
        Ok(records) => {
            display::print_quotas(&records);
            Ok(())
        }
        Err(e) => {
            notifier.error(format!("Could not list quotas: {e}"));
            Err(e.into())
        }
    }
}

/// Fill a form from arguments, validate, and submit the resulting plan.
pub async fn run_set(
    client: &ApiClient,
    notifier: &Notifier,
    req: SetRequest,
) -> anyhow::Result<()> {
    let avail = load_availability(client, req.year)
        .await
        .inspect_err(|e| {
            notifier.error(format!("Could not load quotas: {e:#}"));
        })?;
    let form = build_form(avail, &req).inspect_err(|e| {
        notifier.error(format!("{e}"));
    })?;
    display::print_form(&form);

    let plan = match form.submission() {
        Ok(plan) => plan,
        Err(errors) => {
            display::print_validation(&errors);
            notifier.error("Quota form has errors");
            bail!("quota form has {} error(s)", errors.len());
        }
    };

    if plan.is_empty() {
        notifier.info("No quota changes to save");
        return Ok(());
    }
    display::print_plan(&plan);
    if req.dry_run {
        notifier.info("Dry run: nothing saved");
        return Ok(());
    }

    if !plan.creates.is_empty() {
        match client.create_quotas(&plan.creates).await {
            Ok(created) => {
                notifier.success(format!("Created {} quota(s)", created.len()));
            }
            Err(e) => {
                notifier.error(format!("Could not create quotas: {e}"));
                return Err(e.into());
            }
        }
    }
    for update in &plan.updates {
        if let Err(e) = client.update_quota(update.id, &update.quota).await {
            notifier.error(format!("Could not update quota #{}: {e}", update.id));
            return Err(e.into());
        }
    }
    if !plan.updates.is_empty() {
        notifier.success(format!("Updated {} quota(s)", plan.updates.len()));
    }
    Ok(())
}

fn build_form(avail: Availability, req: &SetRequest) -> anyhow::Result<QuotaForm> {
    let mut form = QuotaForm::new(avail);
    form.select_quarter(req.quarter)?;
    for month in &req.months {
        if !form.is_month_selected(*month) {
            form.toggle_month(*month)?;
        }
    }
    for law in &req.laws {
        if !form.is_law_selected(*law) {
            form.toggle_law(*law);
        }
    }
    for t in &req.targets {
        form.set_target(t.month, t.law, t.value.clone())?;
    }
    Ok(form)
}
