//! Plain-text rendering for CLI output.
//!
//! Tables go to stdout; notifications and logs go to stderr.

use greendesk_client::resources::{
    AuditLogEntry, Backup, BillingRecord, BillingStatus, ComplianceReport, Establishment, Page,
    SystemConfig,
};
use greendesk_core::{
    Availability, Law, MonthState, Quarter, QuotaForm, QuotaRecord, Submission, ValidationErrors,
};

const MAX_NAME: usize = 36;

// ── Quotas ──

/// Quarter-by-quarter availability grid with one column per law.
/// With `only`, just that quarter's rows are shown.
pub fn print_availability(avail: &Availability, only: Option<Quarter>) {
    match only {
        Some(q) => println!("=== Quota availability {} {} ===", avail.year(), q),
        None => println!("=== Quota availability {} ===", avail.year()),
    }
    if !avail.is_loaded() {
        println!("(records not loaded; nothing is selectable)");
    }
    println!();

    print!("  {:<8} {:<10}", "month", "state");
    for law in Law::ALL {
        print!(" {:>8}", law.code());
    }
    println!();

    for quarter in quarters_shown(only) {
        let status = avail.quarter_status(quarter);
        let tag = if status.past {
            "past"
        } else if status.fully_set {
            "fully set"
        } else if status.open_months.is_empty() {
            "closed"
        } else {
            "open"
        };
        println!("{}  [{}]", quarter.label(), tag);

        for month in quarter.months() {
            let state = avail.month_state(month);
            print!("  {:<8} {:<10}", month.abbr(), state.label());
            for law in Law::ALL {
                let cell = match avail.existing_record(month, law) {
                    Some(rec) if rec.auto_adjusted => format!("{}*", rec.target),
                    Some(rec) => rec.target.to_string(),
                    None if state == MonthState::Pending => "?".to_string(),
                    None => "-".to_string(),
                };
                print!(" {:>8}", cell);
            }
            println!();
        }
    }
    println!();

    let selectable = avail.selectable_quarters();
    if selectable.is_empty() {
        println!("No quarter is open for new quotas.");
    } else {
        let labels: Vec<String> = selectable.iter().map(|q| q.to_string()).collect();
        println!("Open for new quotas: {}", labels.join(", "));
    }
    println!("(* = auto-adjusted)");
}

fn quarters_shown(only: Option<Quarter>) -> Vec<Quarter> {
    match only {
        Some(q) => vec![q],
        None => Quarter::ALL.to_vec(),
    }
}

pub fn print_quotas(records: &[QuotaRecord]) {
    if records.is_empty() {
        println!("No quota records.");
        return;
    }
    println!(
        "  {:>6}  {:<8} {:>4}  {:<3} {:<4} {:>6}  {}",
        "id", "law", "year", "mon", "qtr", "target", "auto"
    );
    for r in records {
        println!(
            "  {:>6}  {:<8} {:>4}  {:<3} {:<4} {:>6}  {}",
            r.id,
            r.law.code(),
            r.year,
            r.month.abbr(),
            r.quarter(),
            r.target,
            if r.auto_adjusted { "yes" } else { "" }
        );
    }
    println!("{} record(s)", records.len());
}

/// Current selection and target inputs of a form.
pub fn print_form(form: &QuotaForm) {
    let quarter = form
        .quarter()
        .map(|q| q.label().to_string())
        .unwrap_or_else(|| "-".into());
    println!("Quota form {}  {}", form.year(), quarter);
    for month in form.selected_months() {
        print!("  {:<4}", month.abbr());
        for law in form.selected_laws() {
            let input = form.target_input(month, law).unwrap_or("");
            let shown = if input.trim().is_empty() { "_" } else { input.trim() };
            print!("  {}={}", law.code(), shown);
        }
        println!();
    }
}

pub fn print_validation(errors: &ValidationErrors) {
    eprintln!("Cannot submit: {} problem(s)", errors.len());
    for (path, msg) in errors.iter() {
        eprintln!("  {:<24} {}", path, msg);
    }
}

pub fn print_plan(plan: &Submission) {
    for q in &plan.creates {
        println!(
            "  create  {:<8} {} {:<3} target {}",
            q.law.code(),
            q.year,
            q.month.abbr(),
            q.target
        );
    }
    for u in &plan.updates {
        println!(
            "  update  {:<8} {} {:<3} target {}  (#{})",
            u.quota.law.code(),
            u.quota.year,
            u.quota.month.abbr(),
            u.quota.target,
            u.id
        );
    }
    if plan.unchanged > 0 {
        println!("  {} unchanged", plan.unchanged);
    }
}

// ── Establishments ──

pub fn print_establishments(page: &Page<Establishment>) {
    if page.items.is_empty() {
        println!("No establishments.");
        return;
    }
    println!(
        "  {:>6}  {:<width$}  {:<16}  {}",
        "id",
        "name",
        "municipality",
        "laws",
        width = MAX_NAME
    );
    for e in &page.items {
        println!(
            "  {:>6}  {:<width$}  {:<16}  {}",
            e.id,
            truncate(&e.name, MAX_NAME),
            e.municipality.as_deref().unwrap_or("-"),
            join_laws(&e.laws),
            width = MAX_NAME
        );
    }
    let p = page.pagination();
    let pages: Vec<String> = p
        .window(5)
        .into_iter()
        .map(|n| if n == p.page { format!("[{n}]") } else { n.to_string() })
        .collect();
    println!(
        "page {} of {} ({} total)  {}",
        p.page,
        p.total_pages(),
        p.total,
        pages.join(" ")
    );
}

pub fn print_establishment_card(e: &Establishment) {
    println!("=== {} ===", e.name);
    println!("  {:<14} {}", "id", e.id);
    if let Some(v) = &e.proponent {
        println!("  {:<14} {}", "proponent", v);
    }
    if let Some(v) = &e.address {
        println!("  {:<14} {}", "address", v);
    }
    if let Some(v) = &e.municipality {
        println!("  {:<14} {}", "municipality", v);
    }
    if let Some(v) = &e.status {
        println!("  {:<14} {}", "status", v);
    }
    println!("  {:<14} {}", "laws", join_laws(&e.laws));
    for law in &e.laws {
        println!("    {:<8} {}", law.code(), law.title());
    }
}

// ── Billing, audit, reports ──

pub fn print_billing(rows: &[BillingRecord]) {
    if rows.is_empty() {
        println!("No billing records.");
        return;
    }
    let mut outstanding = 0.0;
    for r in rows {
        let status = match r.status {
            BillingStatus::Paid => "paid",
            BillingStatus::Unpaid => "unpaid",
            BillingStatus::Partial => "partial",
            BillingStatus::Unknown => "?",
        };
        if r.status != BillingStatus::Paid {
            outstanding += r.amount;
        }
        let name = r
            .establishment_name
            .clone()
            .unwrap_or_else(|| format!("#{}", r.establishment_id));
        println!(
            "  {:>6}  {:<width$}  {:<8} {} {:<3} {:>12.2}  {}",
            r.id,
            truncate(&name, MAX_NAME),
            r.law.code(),
            r.year,
            r.month.abbr(),
            r.amount,
            status,
            width = MAX_NAME
        );
    }
    println!("{} record(s), outstanding {:.2}", rows.len(), outstanding);
}

pub fn print_audit(page: &Page<AuditLogEntry>) {
    for e in &page.items {
        println!(
            "  {}  {:<16} {:<20} {}",
            e.timestamp.format("%Y-%m-%d %H:%M"),
            truncate(&e.actor, 16),
            e.action,
            e.resource.as_deref().unwrap_or("")
        );
        if let Some(d) = &e.detail {
            println!("      {}", d);
        }
    }
    let p = page.pagination();
    println!("page {} of {}", p.page, p.total_pages());
}

pub fn print_report(report: &ComplianceReport, quotas: &[QuotaRecord]) {
    println!("=== Compliance {} ({}) ===", report.year, report.view_mode);
    for row in &report.rows {
        let ratio = row
            .ratio()
            .map(|r| format!("{:>5.0}%", r * 100.0))
            .unwrap_or_else(|| "     -".into());
        println!(
            "  {:<8} {:>3}  {:>5} / {:<5} {}",
            row.law.code(),
            row.period,
            row.accomplished,
            row.target,
            ratio
        );
    }
    println!();
    println!("Totals");
    let totals = report.totals_by_law();
    for law in Law::ALL {
        let (target, done) = totals.get(&law).copied().unwrap_or_default();
        let auto = quotas
            .iter()
            .filter(|q| q.law == law && q.auto_adjusted)
            .count();
        println!(
            "  {:<8} {:>6} / {:<6}  auto-adjusted quotas: {}",
            law.code(),
            done,
            target,
            auto
        );
    }
}

// ── Backups and config ──

pub fn print_backups(backups: &[Backup]) {
    if backups.is_empty() {
        println!("No backups.");
        return;
    }
    for b in backups {
        println!(
            "  {:>4}  {}  {:>10}  {}",
            b.id,
            b.created_at.format("%Y-%m-%d %H:%M"),
            human_bytes(b.size_bytes),
            b.file_name
        );
    }
}

pub fn print_config(config: &SystemConfig) {
    for (key, value) in config {
        let shown = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        println!("  {:<28} {}", key, shown);
    }
}

// ── Helpers ──

fn join_laws(laws: &[Law]) -> String {
    if laws.is_empty() {
        return "-".into();
    }
    laws.iter().map(|l| l.code()).collect::<Vec<_>>().join(", ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

fn human_bytes(n: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
